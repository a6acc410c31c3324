use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use payroll_recon::io::excel_write;
use payroll_recon::io::settings::Settings;
use payroll_recon::io::store::JsonFileStore;
use payroll_recon::matcher::MatchPolicy;
use payroll_recon::model::{CheckStatus, Period};
use payroll_recon::reconcile::{self, ReconcileRequest};
use payroll_recon::{ReconError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ReconError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Reconcile(args) => execute_reconcile(args),
        Command::Columns(args) => execute_columns(args),
    }
}

fn execute_reconcile(args: ReconcileArgs) -> Result<()> {
    let period: Period = args.period.parse()?;
    let settings = load_settings(args.settings.as_deref())?;
    let store = JsonFileStore::open(&args.ledger);

    let policy = if args.exclusive_matching {
        MatchPolicy::Exclusive
    } else {
        MatchPolicy::Shared
    };
    let request = ReconcileRequest::new(args.company.clone(), period)
        .with_settings(settings.company(&args.company))
        .with_match_policy(policy);

    let report = reconcile::reconcile_file(&args.input, &request, &store, &settings.alias_table())?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }
    if let Some(path) = &args.export {
        excel_write::write_report(path, &report)?;
    }

    let summary = report.summary();
    eprintln!(
        "{} employee(s): {} ok, {} mismatch, {} changed, {} no data; {} missing from spreadsheet, {} new in spreadsheet",
        summary.employees,
        summary.count(CheckStatus::Ok),
        summary.count(CheckStatus::Mismatch),
        summary.count(CheckStatus::Changed),
        summary.count(CheckStatus::NoData),
        summary.missing_from_spreadsheet,
        summary.new_in_spreadsheet,
    );
    Ok(())
}

fn execute_columns(args: ColumnsArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let company = args
        .company
        .as_deref()
        .map(|name| settings.company(name))
        .unwrap_or_default();
    let mapping = reconcile::inspect_columns(&args.input, &company)?;
    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) if !path.exists() => Err(ReconError::MissingInput(path.to_path_buf())),
        Some(path) => Settings::from_file(path),
        None => Ok(Settings::default()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Cross-check a payroll spreadsheet against the monthly payroll ledger."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile a spreadsheet against the ledger and print the report.
    Reconcile(ReconcileArgs),
    /// Show which spreadsheet column each field resolves to.
    Columns(ColumnsArgs),
}

#[derive(clap::Args)]
struct ReconcileArgs {
    /// Payroll spreadsheet exported by the company.
    #[arg(long)]
    input: PathBuf,

    /// Display name of the company.
    #[arg(long)]
    company: String,

    /// Payroll month to reconcile, as YYYY-MM.
    #[arg(long)]
    period: String,

    /// Ledger export: a JSON array of payroll records.
    #[arg(long)]
    ledger: PathBuf,

    /// Company aliases, allowance names and saved column hints.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the report as an xlsx workbook.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Let each ledger employee match at most one spreadsheet row.
    #[arg(long)]
    exclusive_matching: bool,
}

#[derive(clap::Args)]
struct ColumnsArgs {
    /// Payroll spreadsheet to inspect.
    #[arg(long)]
    input: PathBuf,

    /// Company whose saved hints and allowance names apply.
    #[arg(long)]
    company: Option<String>,

    /// Company aliases, allowance names and saved column hints.
    #[arg(long)]
    settings: Option<PathBuf>,
}
