//! These structs provide the CLI interface for the bibliopay CLI.

use crate::export::ReportFormat;
use crate::filter::{Filter, Selection};
use crate::model::{Amount, Category};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// bibliopay: income tracking for a university library network.
///
/// Operators record the cash a branch takes in (fines, printing, room rentals, donations and so
/// on), look at totals per day, category and branch, export filtered reports as spreadsheets or
/// PDF documents and can ask a text-generation service for a short analysis.
///
/// Start with `bibliopay init`, then `bibliopay login`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and write a default config.json.
    ///
    /// The branch list, timezone and insight service settings can be edited in config.json
    /// afterwards.
    Init,
    /// Start a session.
    Login(LoginArgs),
    /// End the session.
    Logout,
    /// Record a new transaction.
    Add(Box<AddArgs>),
    /// List transactions, newest first, optionally filtered.
    List(FilterArgs),
    /// Show the dashboard figures and the totals per category and per branch.
    Summary(SummaryArgs),
    /// Export the filtered transactions as a spreadsheet or a PDF document.
    Export(ExportArgs),
    /// Ask the text-generation service for an analysis of all transactions.
    Insights,
    /// List the known branches.
    Branches,
    /// Save the receipt attached to a transaction to a file.
    Receipt(ReceiptArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where bibliopay data and configuration is held. Defaults to ~/bibliopay
    #[arg(long, env = "BIBLIOPAY_HOME", default_value_t = default_bibliopay_home())]
    bibliopay_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, bibliopay_home: PathBuf) -> Self {
        Self {
            log_level,
            bibliopay_home: bibliopay_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn bibliopay_home(&self) -> &DisplayPath {
        &self.bibliopay_home
    }
}

/// (Not shown): Args for the `bibliopay login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long, env = "BIBLIOPAY_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// (Not shown): Args for the `bibliopay add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount received, e.g. 15.50. A leading $ and thousands separators are accepted.
    #[arg(long)]
    pub amount: Amount,

    /// The category, either its label (e.g. "Multas") or a short key: fines, printing,
    /// card-replacement, space-rental, merchandise-sale, donation, other
    #[arg(long)]
    pub category: Category,

    /// The branch where the income was received.
    #[arg(long)]
    pub branch: String,

    /// The date the income was received, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub description: Option<String>,

    /// The number printed on the physical receipt.
    #[arg(long)]
    pub reference: Option<String>,

    /// An image or PDF of the receipt to attach.
    #[arg(long)]
    pub receipt: Option<PathBuf>,
}

/// (Not shown): The filter controls shared by `list` and `export`.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text matched against description, branch and reference number.
    #[arg(long)]
    pub search: Option<String>,

    /// A category label or key, or "all".
    #[arg(long, default_value = "all")]
    pub category: Selection<Category>,

    /// An exact branch name, or "all".
    #[arg(long, default_value = "all")]
    pub branch: Selection<String>,
}

impl FilterArgs {
    pub fn filter(&self) -> Filter {
        Filter {
            search: self.search.clone().unwrap_or_default(),
            category: self.category.clone(),
            branch: self.branch.clone(),
        }
    }
}

/// (Not shown): Args for the `bibliopay summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// The day to report as "today", YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

/// (Not shown): Args for the `bibliopay export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// The artifact format.
    #[arg(value_enum)]
    pub format: ReportFormat,

    #[clap(flatten)]
    pub filter: FilterArgs,

    /// Where to write the file. Defaults to the exports directory from config.json.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// (Not shown): Args for the `bibliopay receipt` command.
#[derive(Debug, Parser, Clone)]
pub struct ReceiptArgs {
    /// The transaction id.
    #[arg(long)]
    pub id: String,

    /// The file to write. If it has no extension, one is added from the receipt's type.
    #[arg(long)]
    pub out: PathBuf,
}

fn default_bibliopay_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("bibliopay"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --bibliopay-home or BIBLIOPAY_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("bibliopay")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
