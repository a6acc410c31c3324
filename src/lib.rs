//! Core library for the payroll-recon command line application.
//!
//! The library cross-checks a client's payroll spreadsheet against the
//! persisted monthly payroll ledger and reports every discrepancy before
//! payroll is finalised. Spreadsheet and ledger adapters live under
//! [`payroll::recon::io`], data representations inside [`payroll::recon::model`],
//! and each pipeline stage has its own module: [`header`] resolves columns,
//! [`extract`] turns rows into employees, [`snapshot`] reads the ledger,
//! [`matcher`] pairs identities, [`compare`] classifies values and [`report`]
//! collates the result. [`reconcile`] strings the stages together.

pub mod payroll;

pub use payroll::recon::{
    ErrorKind, ReconError, Result, compare, error, extract, fields, header, io, matcher, model,
    reconcile, report, snapshot,
};
