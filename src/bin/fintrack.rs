//! CLI for the FinTrack personal-finance backend.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use fintrack_rs::aggregate;
use fintrack_rs::client::FinTrackClient;
use fintrack_rs::error::FintrackError;
use fintrack_rs::file::SelectedFile;
use fintrack_rs::models::{
    Account, DashboardResponse, DateRange, ImportSummary, NaiveDate, ReportId, ReportMonth,
    ReportRecord, TransactionRecord, WeekBucket, WeeklySummary,
};
use fintrack_rs::present;
use fintrack_rs::sniff::{ContentSniffer, SniffedHeader};
use fintrack_rs::upload::{Progress, UploadController};
use fintrack_rs::validation::FileValidator;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Weeks shown by `weekly` when not overridden.
const DEFAULT_WEEKS: u32 = 8;

/// Shown under tables whose amounts were never converted.
const UNCONVERTED_NOTE: &str = "Amounts in account currencies, not converted";

/// FinTrack CLI: import bank statements and browse your finances.
#[derive(Debug, Parser)]
#[command(name = "fintrack", version, about)]
struct Cli {
    /// Backend base URL.
    #[arg(
        long,
        global = true,
        env = "FINTRACK_BASE_URL",
        default_value = "http://localhost:8000"
    )]
    base_url: String,
    /// Session cookie from a logged-in browser, e.g. `session=...`.
    #[arg(long, global = true, env = "FINTRACK_SESSION", hide_env_values = true)]
    session: Option<String>,
    /// Currency totals are converted to.
    #[arg(long, global = true, env = "FINTRACK_CURRENCY", default_value = "USD")]
    currency: String,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Check a CSV statement locally without uploading it.
    Check {
        /// Path to the CSV file.
        file: PathBuf,
    },
    /// Check and upload a CSV statement.
    Import {
        /// Path to the CSV file.
        file: PathBuf,
    },
    /// Show weekly income and expenses.
    Weekly {
        /// Number of weeks, ending with the current one.
        #[arg(long, default_value_t = DEFAULT_WEEKS)]
        weeks: u32,
        /// Aggregate from raw transactions instead of the backend's series.
        #[arg(long)]
        local: bool,
    },
    /// Show converted balances and recent transactions.
    Dashboard,
    /// List accounts.
    Accounts,
    /// List the most recent transactions.
    Transactions {
        /// Maximum number of rows.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Manage monthly PDF reports.
    #[command(subcommand)]
    Reports(ReportCommand),
}

/// Subcommands of `reports`.
#[derive(Debug, Subcommand)]
enum ReportCommand {
    /// List generated reports with totals.
    List,
    /// Generate (or regenerate) the report for a month.
    Generate {
        /// Month as YYYY-MM (default: current month).
        #[arg(long, value_parser = parse_month)]
        month: Option<ReportMonth>,
    },
    /// Download a report PDF.
    Download {
        /// Month as YYYY-MM.
        #[arg(long, value_parser = parse_month)]
        month: ReportMonth,
        /// Output path (default: financial_report_YYYY-MM.pdf).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Delete a report.
    Delete {
        /// Report ID as shown by `reports list`.
        id: i64,
    },
}

/// Parses a month string in `YYYY-MM` format for clap.
fn parse_month(s: &str) -> Result<ReportMonth, String> {
    s.parse::<ReportMonth>().map_err(|err| format!("{err}"))
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut builder = FinTrackClient::builder().base_url(cli.base_url);
    if let Some(cookie) = cli.session {
        builder = builder.session_cookie(cookie);
    }
    let client = match builder.build() {
        Ok(client) => client,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&client, cli.command, &cli.currency))
}

/// Dispatches to the appropriate subcommand handler.
async fn dispatch(
    client: &FinTrackClient,
    command: Command,
    currency: &str,
) -> io::Result<ExitCode> {
    match command {
        Command::Check { file } => cmd_check(&file),
        Command::Import { file } => cmd_import(client, &file).await,
        Command::Weekly { weeks, local } => cmd_weekly(client, weeks, local, currency).await,
        Command::Dashboard => cmd_dashboard(client, currency).await,
        Command::Accounts => cmd_accounts(client).await,
        Command::Transactions { limit } => cmd_transactions(client, limit).await,
        Command::Reports(sub) => cmd_reports(client, sub).await,
    }
}

/// Prints `error: {context}: {err}` and returns a failure code.
fn report_error(context: &str, err: &FintrackError) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Executes the `check` subcommand: validates a file without sending it.
fn cmd_check(path: &Path) -> io::Result<ExitCode> {
    let file = match SelectedFile::from_path(path) {
        Ok(file) => file,
        Err(err) => return report_error("cannot open file", &err),
    };
    let checked = FileValidator::default()
        .validate(&file)
        .into_result()
        .and_then(|()| ContentSniffer::default().sniff_file(&file));
    match checked {
        Ok(header) => {
            print_check_result(&file, &header)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} {}: {err}",
                "rejected:".red().bold(),
                file.name()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes the `import` subcommand: validates, uploads and reports.
async fn cmd_import(client: &FinTrackClient, path: &Path) -> io::Result<ExitCode> {
    let file = match SelectedFile::from_path(path) {
        Ok(file) => file,
        Err(err) => return report_error("cannot open file", &err),
    };
    let controller = UploadController::new(client);
    if let Err(err) = controller.select_file(file) {
        return report_error("file rejected", &err);
    }

    let bar = make_progress_bar();
    let mut progress = controller.subscribe_progress();
    let task_bar = bar.clone();
    let watcher = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let reading = *progress.borrow_and_update();
            show_progress(&task_bar, reading);
        }
    });

    let result = controller.submit().await;
    watcher.abort();
    bar.finish_and_clear();

    match result {
        Ok(summary) => {
            print_import_summary(&summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} {}",
                "import failed:".red().bold(),
                err.user_message()
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// A weekly series ready for display.
#[derive(Debug)]
struct WeeklySeries {
    /// Buckets, oldest first.
    buckets: Vec<WeekBucket>,
    /// Totals.
    summary: WeeklySummary,
    /// Window covered, when known.
    range: Option<DateRange>,
    /// Currency the amounts were converted to; `None` for raw amounts in
    /// each account's own currency.
    currency: Option<String>,
}

/// Fetches the backend's converted weekly series.
async fn load_backend_weeks(
    client: &FinTrackClient,
    weeks: u32,
    currency: &str,
) -> fintrack_rs::error::Result<WeeklySeries> {
    let chart = client.weekly_chart(weeks, currency).await?;
    let summary = chart
        .summary
        .unwrap_or_else(|| aggregate::summarize(&chart.weekly_data));
    Ok(WeeklySeries {
        buckets: chart.weekly_data,
        summary,
        range: chart.date_range,
        currency: Some(chart.base_currency.unwrap_or_else(|| currency.to_owned())),
    })
}

/// Fetches raw transactions and buckets them locally. Amounts stay in
/// their account currencies; nothing is converted.
async fn load_local_weeks(
    client: &FinTrackClient,
    weeks: u32,
) -> fintrack_rs::error::Result<WeeklySeries> {
    let transactions = client.transactions().await?;
    let today = Local::now().date_naive();
    let buckets = aggregate::aggregate(&transactions, weeks, today);
    Ok(WeeklySeries {
        summary: aggregate::summarize(&buckets),
        range: aggregate::date_range(today, weeks),
        buckets,
        currency: None,
    })
}

/// Executes the `weekly` subcommand.
async fn cmd_weekly(
    client: &FinTrackClient,
    weeks: u32,
    local: bool,
    currency: &str,
) -> io::Result<ExitCode> {
    let spinner = make_spinner("Loading weekly data...");
    let loaded = if local {
        load_local_weeks(client, weeks).await
    } else {
        load_backend_weeks(client, weeks, currency).await
    };
    spinner.finish_and_clear();

    match loaded {
        Ok(series) => {
            print_weekly_table(&series, Local::now().date_naive())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to load weekly data", &err),
    }
}

/// Executes the `dashboard` subcommand.
async fn cmd_dashboard(client: &FinTrackClient, currency: &str) -> io::Result<ExitCode> {
    let spinner = make_spinner("Converting balances...");
    let loaded = client.dashboard(currency).await;
    spinner.finish_and_clear();

    match loaded {
        Ok(dashboard) => {
            print_dashboard(&dashboard, Local::now().date_naive())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to load dashboard", &err),
    }
}

/// Executes the `accounts` subcommand.
async fn cmd_accounts(client: &FinTrackClient) -> io::Result<ExitCode> {
    match client.accounts().await {
        Ok(accounts) => {
            print_accounts_table(&accounts)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to read accounts", &err),
    }
}

/// Executes the `transactions` subcommand. Amounts are listed as stored.
async fn cmd_transactions(client: &FinTrackClient, limit: usize) -> io::Result<ExitCode> {
    match client.transactions().await {
        Ok(mut transactions) => {
            transactions.truncate(limit);
            print_transactions_table(&transactions, None, Local::now().date_naive())?;
            let mut out = io::stdout().lock();
            writeln!(out, "{}", UNCONVERTED_NOTE.dimmed())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error("failed to read transactions", &err),
    }
}

/// Executes a `reports` subcommand.
async fn cmd_reports(client: &FinTrackClient, command: ReportCommand) -> io::Result<ExitCode> {
    match command {
        ReportCommand::List => match client.reports().await {
            Ok(reports) => {
                print_reports(&reports, Local::now().date_naive())?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => report_error("failed to list reports", &err),
        },
        ReportCommand::Generate { month } => {
            let target = month.unwrap_or_else(|| ReportMonth::of(Local::now().date_naive()));
            let label = present::format_month(&target.to_string());
            let spinner = make_spinner(&format!("Generating report for {label}..."));
            let generated = client.generate_report(target).await;
            spinner.finish_and_clear();
            match generated {
                Ok(_) => {
                    writeln!(
                        io::stdout().lock(),
                        "{} {label}",
                        "Report generated:".green().bold()
                    )?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => report_error("failed to generate report", &err),
            }
        }
        ReportCommand::Download { month, output } => {
            let bytes = match client.download_report(month).await {
                Ok(bytes) => bytes,
                Err(err) => return report_error("failed to download report", &err),
            };
            let target = output.unwrap_or_else(|| PathBuf::from(month.download_file_name()));
            if let Err(err) = std::fs::write(&target, &bytes) {
                return report_error("failed to save report", &FintrackError::Io(err));
            }
            writeln!(
                io::stdout().lock(),
                "{} {} {}",
                "Saved".green().bold(),
                target.display(),
                format_args!("({})", present::format_file_size(u64::try_from(bytes.len()).unwrap_or(u64::MAX))).dimmed()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        ReportCommand::Delete { id } => match client.delete_report(ReportId::new(id)).await {
            Ok(_) => {
                writeln!(io::stdout().lock(), "{} {id}", "Deleted report".green().bold())?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => report_error("failed to delete report", &err),
        },
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints the result of a successful local check.
fn print_check_result(file: &SelectedFile, header: &SniffedHeader) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {} {}",
        "\u{2713}".green().bold(),
        file.name().bold(),
        format_args!("({})", file.display_size()).dimmed()
    )?;
    writeln!(out, "  {} {}", "Columns:".bold(), header.columns.join(", "))?;
    writeln!(out, "  {} {}", "Rows sampled:".bold(), header.data_rows)?;
    Ok(())
}

/// Prints the backend's import summary.
fn print_import_summary(summary: &ImportSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Import complete!".green().bold())?;
    if let Some(message) = summary.message.as_deref() {
        writeln!(out, "{}", message.dimmed())?;
    }
    writeln!(out)?;

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Result").fg(Color::Cyan),
        Cell::new("Rows").fg(Color::Cyan),
    ]);
    let rows: &[(&str, u64, Color)] = &[
        ("Imported", summary.imported, Color::Green),
        ("Duplicates skipped", summary.duplicates, Color::Yellow),
        ("Total", summary.total, Color::Reset),
    ];
    for &(name, count, color) in rows {
        let count_cell = if count > 0 {
            Cell::new(count).fg(color)
        } else {
            Cell::new(count).fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![Cell::new(name), count_cell]);
    }

    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints a weekly income/expense table with totals.
fn print_weekly_table(series: &WeeklySeries, today: NaiveDate) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if series.buckets.is_empty() {
        writeln!(out, "{}", "No transactions in this period.".dimmed())?;
        return Ok(());
    }

    let currency = series.currency.as_deref();
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Week of").fg(Color::Cyan),
        Cell::new("Income").fg(Color::Cyan),
        Cell::new("Expenses").fg(Color::Cyan),
        Cell::new("Net").fg(Color::Cyan),
    ]);

    for bucket in &series.buckets {
        _ = table.add_row(vec![
            Cell::new(present::format_date(bucket.week_start, today)),
            Cell::new(amount_text(bucket.income, currency)).fg(Color::Green),
            Cell::new(amount_text(bucket.expenses, currency)).fg(Color::Red),
            net_cell(bucket.net(), currency),
        ]);
    }
    _ = table.add_row(vec![
        Cell::new("Total"),
        Cell::new(amount_text(series.summary.total_income, currency)),
        Cell::new(amount_text(series.summary.total_expenses, currency)),
        net_cell(series.summary.total_net, currency),
    ]);

    writeln!(
        out,
        "{} {}",
        "Weekly Income & Expenses".green().bold(),
        format_args!("({} weeks)", series.buckets.len()).dimmed()
    )?;
    if let Some(range) = series.range {
        writeln!(
            out,
            "{}",
            format_args!("{} to {}", range.start, range.end).dimmed()
        )?;
    }
    if currency.is_none() {
        writeln!(out, "{}", UNCONVERTED_NOTE.dimmed())?;
    }
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// A net amount coloured by sign.
fn net_cell(net: f64, currency: Option<&str>) -> Cell {
    let color = if net < 0.0_f64 { Color::Red } else { Color::Green };
    Cell::new(signed_text(net, currency)).fg(color)
}

/// Formats an amount in `currency`, or as a bare number when the amount
/// was never converted.
fn amount_text(amount: f64, currency: Option<&str>) -> String {
    currency.map_or_else(
        || present::format_number(amount),
        |code| present::format_currency(amount, code),
    )
}

/// Like [`amount_text`] with an explicit `+` on non-negative amounts.
fn signed_text(amount: f64, currency: Option<&str>) -> String {
    match currency {
        Some(code) => present::format_signed_amount(amount, code),
        None => {
            let number = present::format_number(amount);
            if number.starts_with('-') {
                number
            } else {
                format!("+{number}")
            }
        }
    }
}

/// Prints the dashboard: headline total, converted accounts and recent
/// transactions.
fn print_dashboard(dashboard: &DashboardResponse, today: NaiveDate) -> io::Result<()> {
    let currency = dashboard.base_currency.as_str();
    {
        let mut out = io::stdout().lock();
        writeln!(
            out,
            "{} {} {}",
            "Total balance:".bold(),
            present::format_currency(dashboard.statistics.total_balance, currency).green(),
            format_args!("({} accounts)", dashboard.statistics.account_count).dimmed()
        )?;
        if let Some(note) = dashboard.conversion_note() {
            writeln!(out, "{}", note.dimmed())?;
        }
        writeln!(out)?;

        if !dashboard.accounts.is_empty() {
            let mut table = Table::new();
            _ = table.load_preset(UTF8_FULL);
            _ = table.set_header(vec![
                Cell::new("Account").fg(Color::Cyan),
                Cell::new("Currency").fg(Color::Cyan),
                Cell::new(format!("Balance ({currency})")).fg(Color::Cyan),
            ]);
            for account in &dashboard.accounts {
                let balance = account.converted_balance.map_or_else(
                    || "\u{2014}".to_owned(),
                    |value| present::format_currency(value, currency),
                );
                _ = table.add_row(vec![
                    Cell::new(account.account_name.as_deref().unwrap_or("\u{2014}")),
                    Cell::new(&account.original_currency),
                    Cell::new(balance),
                ]);
            }
            writeln!(out, "{table}")?;
            writeln!(out)?;
        }
    }
    print_transactions_table(&dashboard.recent_transactions, Some(currency), today)
}

/// Prints accounts in a table.
fn print_accounts_table(accounts: &[Account]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if accounts.is_empty() {
        writeln!(out, "{}", "No accounts found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Platform").fg(Color::Cyan),
        Cell::new("Balance").fg(Color::Cyan),
    ]);

    for account in accounts {
        _ = table.add_row(vec![
            Cell::new(account.account_id),
            Cell::new(&account.account_name),
            Cell::new(&account.account_type),
            Cell::new(account.platform_name.as_deref().unwrap_or("\u{2014}")),
            Cell::new(present::format_currency(account.account_balance, &account.currency)),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Accounts".green().bold(),
        format_args!("({})", accounts.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints transactions in a table.
fn print_transactions_table(
    transactions: &[TransactionRecord],
    currency: Option<&str>,
    today: NaiveDate,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if transactions.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Description").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
    ]);

    for tx in transactions {
        let color = if tx.is_income() { Color::Green } else { Color::Red };
        _ = table.add_row(vec![
            Cell::new(present::format_date(tx.transaction_date, today)),
            Cell::new(&tx.name),
            Cell::new(tx.description.as_deref().unwrap_or("")),
            Cell::new(signed_text(tx.amount, currency)).fg(color),
        ]);
    }

    writeln!(
        out,
        "{} {}",
        "Transactions".green().bold(),
        format_args!("({})", transactions.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints report statistics and the report list.
fn print_reports(reports: &[ReportRecord], today: NaiveDate) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if reports.is_empty() {
        writeln!(out, "{}", "No reports found.".dimmed())?;
        return Ok(());
    }

    let stats = present::aggregate_statistics(reports);
    writeln!(
        out,
        "{} {}",
        "Reports".green().bold(),
        format_args!("({})", stats.report_count).dimmed()
    )?;
    writeln!(
        out,
        "  {} {}",
        "Total spending:".bold(),
        present::format_number(stats.total_spending)
    )?;
    writeln!(
        out,
        "  {} {} {}",
        "Transactions:".bold(),
        stats.total_transactions,
        format_args!("(avg {} per report)", stats.average_transactions).dimmed()
    )?;
    if let Some(latest) = stats.latest_month {
        writeln!(
            out,
            "  {} {}",
            "Latest:".bold(),
            present::format_month(&latest.to_string())
        )?;
    }
    writeln!(out)?;

    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("ID").fg(Color::Cyan),
        Cell::new("Month").fg(Color::Cyan),
        Cell::new("Spending").fg(Color::Cyan),
        Cell::new("Transactions").fg(Color::Cyan),
        Cell::new("Generated").fg(Color::Cyan),
    ]);
    for report in reports {
        _ = table.add_row(vec![
            Cell::new(report.report_id),
            Cell::new(present::format_month(&report.report_month.to_string())),
            Cell::new(present::format_number(report.total_spending)),
            Cell::new(report.transaction_count),
            Cell::new(present::format_date_full(report.generated_at, today)),
        ]);
    }
    writeln!(out, "{table}")?;
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Creates the bar that mirrors the simulated upload progress.
fn make_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Moves the bar to a progress reading.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "readings are clamped to 0..=100"
)]
fn show_progress(bar: &ProgressBar, reading: Progress) {
    bar.set_position(reading.percent.round() as u64);
    bar.set_message(reading.phase.label());
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use fintrack_rs::models::{AccountId, DashboardAccount, DashboardStatistics, TransactionId};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GOOD_CSV: &[u8] = b"Value Date;Text;Amount\n2024-01-01;Salary;1000\n2024-01-02;Coffee;-3.5\n";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_transaction(id: i64, on: NaiveDate, amount: f64) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(id),
            user_id: None,
            name: format!("Payee {id}"),
            amount,
            description: Some("note".to_owned()),
            transaction_date: on,
            category_id: None,
        }
    }

    fn test_account(id: i64, name: &str) -> Account {
        Account {
            account_id: AccountId::new(id),
            account_name: name.to_owned(),
            account_type: "checking".to_owned(),
            account_balance: 1520.5,
            currency: "SEK".to_owned(),
            platform_name: None,
        }
    }

    fn test_report(id: i64, month: &str) -> ReportRecord {
        ReportRecord {
            report_id: ReportId::new(id),
            report_month: month.parse().unwrap(),
            total_spending: 1234.5,
            transaction_count: 12,
            generated_at: date(2024, 2, 1).and_hms_opt(9, 30, 0).unwrap(),
        }
    }

    fn client_for(server: &MockServer) -> FinTrackClient {
        FinTrackClient::builder().base_url(server.uri()).build().unwrap()
    }

    fn offline_client() -> FinTrackClient {
        FinTrackClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap()
    }

    // ── argument parsing ─────────────────────────────────────────────

    #[test]
    fn parse_month_valid() {
        assert_eq!(parse_month("2024-03").unwrap(), ReportMonth::new(2024, 3).unwrap());
    }

    #[test]
    fn parse_month_invalid() {
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("March").is_err());
    }

    #[test]
    fn cli_parses_weekly_defaults() {
        let cli = Cli::try_parse_from(["fintrack", "weekly"]).unwrap();
        let Command::Weekly { weeks, local } = cli.command else {
            panic!("expected the weekly command");
        };
        assert_eq!(weeks, DEFAULT_WEEKS);
        assert!(!local);
    }

    #[test]
    fn cli_parses_report_download() {
        let cli = Cli::try_parse_from([
            "fintrack", "reports", "download", "--month", "2024-01", "-o", "out.pdf",
        ])
        .unwrap();
        let Command::Reports(ReportCommand::Download { month, output }) = cli.command else {
            panic!("expected reports download");
        };
        assert_eq!(month, ReportMonth::new(2024, 1).unwrap());
        assert_eq!(output, Some(PathBuf::from("out.pdf")));
    }

    // ── check ────────────────────────────────────────────────────────

    #[test]
    fn cmd_check_accepts_valid_csv() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.csv");
        std::fs::write(&file, GOOD_CSV).unwrap();
        assert_eq!(cmd_check(&file).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn cmd_check_rejects_wrong_columns() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.csv");
        std::fs::write(&file, b"Date;Description;Total\n2024-01-01;a;1\n").unwrap();
        assert_eq!(cmd_check(&file).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn cmd_check_rejects_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.txt");
        std::fs::write(&file, GOOD_CSV).unwrap();
        assert_eq!(cmd_check(&file).unwrap(), ExitCode::FAILURE);
    }

    #[test]
    fn cmd_check_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cmd_check(&dir.path().join("nope.csv")).unwrap(), ExitCode::FAILURE);
    }

    // ── output formatting ────────────────────────────────────────────

    #[test]
    fn print_accounts_table_empty() {
        assert!(print_accounts_table(&[]).is_ok());
    }

    #[test]
    fn print_accounts_table_with_data() {
        assert!(print_accounts_table(&[test_account(1, "Everyday")]).is_ok());
    }

    #[test]
    fn print_transactions_table_with_data() {
        let txs = [
            test_transaction(1, date(2024, 1, 10), 100.0),
            test_transaction(2, date(2024, 1, 9), -4.5),
        ];
        assert!(print_transactions_table(&txs, Some("USD"), date(2024, 1, 10)).is_ok());
        assert!(print_transactions_table(&txs, None, date(2024, 1, 10)).is_ok());
        assert!(print_transactions_table(&[], Some("USD"), date(2024, 1, 10)).is_ok());
    }

    #[test]
    fn print_weekly_table_with_data() {
        let buckets = vec![WeekBucket {
            week_start: date(2024, 1, 1),
            income: 100.0,
            expenses: 40.0,
        }];
        let series = WeeklySeries {
            summary: aggregate::summarize(&buckets),
            range: aggregate::date_range(date(2024, 1, 4), 1),
            buckets,
            currency: Some("SEK".to_owned()),
        };
        assert!(print_weekly_table(&series, date(2024, 1, 4)).is_ok());
    }

    #[test]
    fn print_weekly_table_empty() {
        let series = WeeklySeries {
            buckets: Vec::new(),
            summary: WeeklySummary::default(),
            range: None,
            currency: None,
        };
        assert!(print_weekly_table(&series, date(2024, 1, 4)).is_ok());
    }

    #[test]
    fn unconverted_amounts_carry_no_currency_symbol() {
        assert_eq!(amount_text(1234.5, None), "1,234.50");
        assert_eq!(amount_text(1234.5, Some("USD")), "$1234.50");
        assert_eq!(signed_text(12.0, None), "+12.00");
        assert_eq!(signed_text(-3.5, None), "-3.50");
        assert_eq!(signed_text(-3.5, Some("USD")), "-$3.50");
    }

    #[test]
    fn print_dashboard_works() {
        let dashboard = DashboardResponse {
            success: true,
            base_currency: "SEK".to_owned(),
            statistics: DashboardStatistics {
                total_balance: 2500.0,
                account_count: 2,
            },
            recent_transactions: vec![test_transaction(1, date(2024, 1, 10), -3.5)],
            accounts: vec![
                DashboardAccount {
                    account_name: Some("Everyday".to_owned()),
                    original_currency: "SEK".to_owned(),
                    converted_balance: Some(1500.0),
                },
                DashboardAccount {
                    account_name: None,
                    original_currency: "EUR".to_owned(),
                    converted_balance: None,
                },
            ],
        };
        assert!(print_dashboard(&dashboard, date(2024, 1, 10)).is_ok());
    }

    #[test]
    fn print_reports_works() {
        let reports = [test_report(2, "2024-02"), test_report(1, "2024-01")];
        assert!(print_reports(&reports, date(2024, 2, 1)).is_ok());
        assert!(print_reports(&[], date(2024, 2, 1)).is_ok());
    }

    #[test]
    fn print_import_summary_works() {
        let summary = ImportSummary {
            imported: 10,
            duplicates: 0,
            total: 10,
            message: Some("Imported 10 transactions".to_owned()),
        };
        assert!(print_import_summary(&summary).is_ok());
    }

    #[test]
    fn progress_bar_follows_readings() {
        let bar = make_progress_bar();
        show_progress(&bar, Progress::at(42.4));
        assert_eq!(bar.position(), 42);
        show_progress(&bar, Progress::complete());
        assert_eq!(bar.position(), 100);
        bar.finish_and_clear();
    }

    #[test]
    fn make_spinner_creates_spinner() {
        let spinner = make_spinner("Testing...");
        spinner.finish_and_clear();
    }

    // ── remote commands ──────────────────────────────────────────────

    #[tokio::test]
    async fn dispatch_accounts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let code = dispatch(&client, Command::Accounts, "USD").await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn dispatch_accounts_offline_fails() {
        let code = dispatch(&offline_client(), Command::Accounts, "USD").await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn weekly_local_aggregates_transactions() {
        let server = MockServer::start().await;
        let today = Local::now().date_naive().to_string();
        Mock::given(method("GET"))
            .and(path("/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"transaction_id": 1, "name": "Salary", "amount": 100.0, "transaction_date": today},
                {"transaction_id": 2, "name": "Rent", "amount": -40.0, "transaction_date": today}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let series = load_local_weeks(&client, 4).await.unwrap();
        assert_eq!(series.currency, None);
        assert_eq!(series.buckets.len(), 1);
        assert!((series.summary.total_net - 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn weekly_backend_falls_back_to_local_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weekly-chart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "weekly_data": [
                    {"date": "2024-01-01", "income": 100.0, "expenses": 40.0},
                    {"date": "2024-01-08", "income": 0.0, "expenses": 10.0}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let series = load_backend_weeks(&client, 8, "EUR").await.unwrap();
        assert_eq!(series.currency.as_deref(), Some("EUR"));
        assert!((series.summary.total_expenses - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn import_uploads_checked_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/import-csv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"imported": 2, "duplicates": 0, "total": 2}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.csv");
        std::fs::write(&file, GOOD_CSV).unwrap();

        let client = client_for(&server);
        assert_eq!(cmd_import(&client, &file).await.unwrap(), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn import_reports_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/import-csv"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"detail": "Invalid date in row 3"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.csv");
        std::fs::write(&file, GOOD_CSV).unwrap();

        let client = client_for(&server);
        assert_eq!(cmd_import(&client, &file).await.unwrap(), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn report_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/reports/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.pdf");
        let client = client_for(&server);
        let code = cmd_reports(
            &client,
            ReportCommand::Download {
                month: ReportMonth::new(2024, 1).unwrap(),
                output: Some(output.clone()),
            },
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.4");
    }
}
