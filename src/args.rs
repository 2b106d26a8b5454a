//! These structs provide the CLI interface for the expenses CLI.

use crate::chart::ChartKind;
use crate::filter::{CategoryFilter, MonthFilter};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for keeping track of personal spending.
///
/// Record expenses with an amount, category, date and optional notes. List them with category,
/// month and text filters, see totals for everything and for the current month, draw simple
/// charts by category or by month, and export the whole collection to CSV.
///
/// Everything is kept in a single directory, ~/expenses by default. Run `expenses init` first.
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
    /// Create the expenses directory and initialize the configuration file.
    ///
    /// Decide what directory you want to keep your data in and pass this as --expenses-home. By
    /// default, it will be $HOME/expenses. Running this against an existing directory keeps its
    /// configuration and data.
    Init,
    /// Record a new expense.
    Add(AddArgs),
    /// Change an existing expense. Only the values you pass are changed.
    Update(UpdateArgs),
    /// Delete an expense.
    Delete(DeleteArgs),
    /// List expenses, optionally narrowed down by category, month and search text.
    List(ListArgs),
    /// Show the total, the current month's total, the number of entries and the top category.
    Summary,
    /// Draw spending by category (pie) or by month (bar).
    Chart(ChartArgs),
    /// Write all expenses to a CSV file.
    Export(ExportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber EnvFilter docs.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where expenses and configuration are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount spent, e.g. 12.50
    amount: String,

    /// The category, e.g. Food
    category: String,

    /// The date in YYYY-MM-DD format, e.g. 2024-03-05
    date: String,

    /// Free-text notes
    #[arg(long, default_value = "")]
    notes: String,
}

impl AddArgs {
    pub fn new(
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
            notes: notes.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// Picks a single expense either by id (or a unique id prefix) or by its position in the list.
#[derive(Debug, Parser, Clone, PartialEq, Eq)]
pub struct Selector {
    /// The id of the expense, or enough of its beginning to be unique. `expenses list` shows the
    /// first eight characters.
    #[arg(required_unless_present = "at", conflicts_with = "at")]
    id: Option<String>,

    /// The zero-based position of the expense, as shown in the first column of `expenses list`.
    #[arg(long)]
    at: Option<usize>,
}

/// How a `Selector` refers to an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<'a> {
    Id(&'a str),
    Position(usize),
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            at: None,
        }
    }

    pub fn at(index: usize) -> Self {
        Self {
            id: None,
            at: Some(index),
        }
    }

    /// Clap guarantees exactly one of the two is set. A position wins if both somehow are.
    pub fn target(&self) -> Target<'_> {
        match (self.at, self.id.as_deref()) {
            (Some(index), _) => Target::Position(index),
            (None, Some(id)) => Target::Id(id),
            (None, None) => Target::Id(""),
        }
    }
}

/// Args for the `expenses update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[clap(flatten)]
    selector: Selector,

    /// The new amount
    #[arg(long)]
    amount: Option<String>,

    /// The new category
    #[arg(long)]
    category: Option<String>,

    /// The new date in YYYY-MM-DD format
    #[arg(long)]
    date: Option<String>,

    /// The new notes. Pass an empty string to clear them.
    #[arg(long)]
    notes: Option<String>,
}

impl UpdateArgs {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            amount: None,
            category: None,
            date: None,
            notes: None,
        }
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// Args for the `expenses delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[clap(flatten)]
    selector: Selector,
}

impl DeleteArgs {
    pub fn new(selector: Selector) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// The layout used by `expenses list`.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListFormat {
    /// An aligned table for reading
    #[default]
    Table,
    /// The matching records as a JSON array
    Json,
}

serde_plain::derive_display_from_serialize!(ListFormat);
serde_plain::derive_fromstr_from_deserialize!(ListFormat);

/// Args for the `expenses list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    /// Only show this category, or `all`
    #[arg(long, default_value_t = CategoryFilter::All)]
    category: CategoryFilter,

    /// Only show this month (1 to 12, in any year), or `all`
    #[arg(long, default_value_t = MonthFilter::All)]
    month: MonthFilter,

    /// Only show expenses whose notes or category contain this text, ignoring case
    #[arg(long, default_value = "")]
    query: String,

    /// Either `table` or `json`
    #[arg(long, default_value_t = ListFormat::Table)]
    format: ListFormat,
}

impl ListArgs {
    pub fn new(category: CategoryFilter, month: MonthFilter, query: impl Into<String>) -> Self {
        Self {
            category,
            month,
            query: query.into(),
            format: ListFormat::Table,
        }
    }

    pub fn with_format(mut self, format: ListFormat) -> Self {
        self.format = format;
        self
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn month(&self) -> MonthFilter {
        self.month
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn format(&self) -> ListFormat {
        self.format
    }
}

/// Args for the `expenses chart` command.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    /// Either `pie` (spending by category) or `bar` (spending by month)
    kind: ChartKind,

    /// The year shown by the bar chart. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

impl ChartArgs {
    pub fn new(kind: ChartKind, year: Option<i32>) -> Self {
        Self { kind, year }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Args for the `expenses export` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ExportArgs {
    /// Where to write the CSV file. Defaults to `exports/expenses_YYYY-MM-DD.csv` in the expenses
    /// home directory.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, \
                you may have problems!",
            );
            PathBuf::from("expenses")
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
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut all = vec!["expenses", "--expenses-home", "/tmp/expenses"];
        all.extend_from_slice(args);
        Args::try_parse_from(all).unwrap()
    }

    #[test]
    fn test_add_args() {
        let args = parse(&["add", "12.50", "Food", "2024-03-05", "--notes", "lunch"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.amount(), "12.50");
        assert_eq!(add.category(), "Food");
        assert_eq!(add.date(), "2024-03-05");
        assert_eq!(add.notes(), "lunch");
        assert_eq!(args.common().expenses_home().path(), Path::new("/tmp/expenses"));
    }

    #[test]
    fn test_selector_by_id_or_position() {
        let args = parse(&["delete", "3f2a"]);
        let Command::Delete(delete) = args.command() else {
            panic!("expected delete");
        };
        assert_eq!(delete.selector().target(), Target::Id("3f2a"));

        let args = parse(&["delete", "--at", "2"]);
        let Command::Delete(delete) = args.command() else {
            panic!("expected delete");
        };
        assert_eq!(delete.selector().target(), Target::Position(2));
    }

    #[test]
    fn test_selector_conflicts() {
        let result = Args::try_parse_from(["expenses", "delete", "3f2a", "--at", "2"]);
        assert!(result.is_err());
        let result = Args::try_parse_from(["expenses", "delete"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_update_args_partial() {
        let args = parse(&["update", "--at", "0", "--notes", ""]);
        let Command::Update(update) = args.command() else {
            panic!("expected update");
        };
        assert_eq!(update.amount(), None);
        assert_eq!(update.notes(), Some(""));
    }

    #[test]
    fn test_list_args() {
        let args = parse(&["list", "--month", "03", "--category", "Food", "--format", "json"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.month(), MonthFilter::Month(3));
        assert_eq!(list.category(), &CategoryFilter::Only("Food".to_string()));
        assert_eq!(list.format(), ListFormat::Json);
        assert_eq!(list.query(), "");
    }

    #[test]
    fn test_list_args_bad_month() {
        let result = Args::try_parse_from(["expenses", "list", "--month", "13"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_chart_args() {
        let args = parse(&["chart", "bar", "--year", "2024"]);
        let Command::Chart(chart) = args.command() else {
            panic!("expected chart");
        };
        assert_eq!(chart.kind(), ChartKind::Bar);
        assert_eq!(chart.year(), Some(2024));
    }

    #[test]
    fn test_log_level() {
        let args = parse(&["--log-level", "debug", "summary"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
    }
}
