pub mod compare;
pub mod error;
pub mod extract;
pub mod fields;
pub mod header;
pub mod io;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod snapshot;

pub use error::{ErrorKind, ReconError, Result};
