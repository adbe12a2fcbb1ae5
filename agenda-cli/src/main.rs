mod commands;
mod render;
mod utils;

use agenda_core::error_log::ErrorKind;
use agenda_core::filter::{AcademicYear, FilterSpec, FlagFilter, TimeRange};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agenda")]
#[command(about = "Department calendar built from CSV sources, mirrored to a remote calendar")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw the filtered events as month grids
    Show {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// List the filtered events, grouped by day
    Events {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Mirror on-site events to the configured remote
    Sync {
        /// Show what would change without touching the remote
        #[arg(long)]
        dry_run: bool,
    },
    /// Sync whenever a source file changes
    Watch,
    /// Delete every tracked event from the remote
    Purge {
        /// Skip the confirmation and delete
        #[arg(long)]
        yes: bool,
    },
    /// Show the error log
    Errors {
        /// Remove every record of this kind (DATA, SYNC or PARSE)
        #[arg(long, value_name = "KIND")]
        clear: Option<ErrorKind>,
    },
    /// List departments found in the sources
    Departments,
}

#[derive(Args)]
struct FilterArgs {
    /// Academic year, e.g. "2025-2026" (defaults to the current one)
    #[arg(short, long)]
    year: Option<String>,

    /// "all", "current" or a month name
    #[arg(short, long)]
    range: Option<String>,

    /// Only this department ("all" for every department)
    #[arg(short, long)]
    department: Option<String>,

    /// Filter on the on-calendar flag: yes, no or any
    #[arg(long, default_value = "yes")]
    on_calendar: String,

    /// Filter on the on-site flag: yes, no or any
    #[arg(long, default_value = "any")]
    on_site: String,

    /// Case- and accent-insensitive text search in titles and services
    #[arg(short, long)]
    search: Option<String>,
}

impl FilterArgs {
    fn into_spec(self, today: NaiveDate) -> FilterSpec {
        let mut spec = FilterSpec::defaults(today);

        if let Some(year) = &self.year {
            spec.academic_year = AcademicYear::parse_or_current(year, today);
        }
        if let Some(range) = &self.range {
            spec.time_range = TimeRange::parse(range);
        }
        spec.on_external_calendar = FlagFilter::parse(&self.on_calendar);
        spec.on_site = FlagFilter::parse(&self.on_site);
        spec.free_text = self.search.unwrap_or_default();

        match &self.department {
            Some(department) => spec.with_department(department),
            None => spec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Show { filter } => commands::show::run(filter.into_spec(today), today),
        Commands::Events { filter } => commands::events::run(filter.into_spec(today), today),
        Commands::Sync { dry_run } => commands::sync::run(dry_run).await,
        Commands::Watch => commands::watch::run().await,
        Commands::Purge { yes } => commands::purge::run(yes).await,
        Commands::Errors { clear } => commands::errors::run(clear),
        Commands::Departments => commands::departments::run(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "agenda_core=debug,agenda_cli=debug"
    } else {
        "agenda_core=warn,agenda_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
