//! Display formatting for amounts, dates, months and report statistics.
//!
//! All functions are pure. Functions that render relative dates take
//! `today` explicitly so callers decide which clock applies.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::models::{ReportMonth, ReportRecord};

/// Currencies whose symbol follows the amount, separated by a space.
const SUFFIX_CURRENCIES: &[&str] = &["SEK", "NOK", "DKK", "CZK", "PLN"];

/// Returns the display symbol for an ISO 4217 code, if one is known.
#[inline]
#[must_use]
pub fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "\u{20ac}",
        "GBP" => "\u{a3}",
        "JPY" => "\u{a5}",
        "SEK" | "NOK" | "DKK" => "kr",
        "INR" => "\u{20b9}",
        "AUD" => "A$",
        "CAD" => "C$",
        "CZK" => "K\u{10d}",
        "PLN" => "z\u{142}",
        _ => return None,
    };
    Some(symbol)
}

/// Formats `amount` with two decimals and the currency's symbol.
///
/// Unknown codes are used verbatim as the symbol. Negative amounts carry a
/// leading `-` in front of the whole string: `-$40.00`, `-40.00 kr`.
#[inline]
#[must_use]
pub fn format_currency(amount: f64, code: &str) -> String {
    let digits = format!("{:.2}", amount.abs());
    let sign = if is_negative_cents(amount) { "-" } else { "" };
    let upper = code.to_ascii_uppercase();
    let symbol = currency_symbol(&upper).unwrap_or(code);
    if SUFFIX_CURRENCIES.contains(&upper.as_str()) {
        format!("{sign}{digits} {symbol}")
    } else {
        format!("{sign}{symbol}{digits}")
    }
}

/// Formats a transaction amount with an explicit direction sign:
/// `+$12.00` for income, `-$4.50` for expenses.
#[inline]
#[must_use]
pub fn format_signed_amount(amount: f64, code: &str) -> String {
    if is_negative_cents(amount) {
        format_currency(amount, code)
    } else {
        format!("+{}", format_currency(amount, code))
    }
}

/// Returns `true` if `amount` is still negative once rounded to cents.
fn is_negative_cents(amount: f64) -> bool {
    amount < 0.0_f64
        && format!("{:.2}", amount.abs())
            .bytes()
            .any(|b| matches!(b, b'1'..=b'9'))
}

/// Formats a number with `,` thousands separators and two to three
/// decimals: `1,234.50`, `1,234.568`.
#[inline]
#[must_use]
pub fn format_number(value: f64) -> String {
    let padded = format!("{:.3}", value.abs());
    let fixed = padded.strip_suffix('0').unwrap_or(&padded);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed, "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0_f64 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{dec_part}")
}

/// Formats a `YYYY-MM` month as `January 2024`.
///
/// Input that is not a valid month is returned unchanged.
#[inline]
#[must_use]
pub fn format_month(raw: &str) -> String {
    raw.parse::<ReportMonth>()
        .ok()
        .and_then(ReportMonth::first_day)
        .map_or_else(|| raw.to_owned(), |first| first.format("%B %Y").to_string())
}

/// Formats a date relative to `today`: `Today`, `Yesterday`, or
/// `Mon, Jan 1`.
#[inline]
#[must_use]
pub fn format_date(date: NaiveDate, today: NaiveDate) -> String {
    relative_day(date, today).map_or_else(
        || date.format("%a, %b %-d").to_string(),
        ToOwned::to_owned,
    )
}

/// Formats a timestamp relative to `today`: `Today 14:05`,
/// `Yesterday 09:30`, or `2024-01-05 14:05`.
#[inline]
#[must_use]
pub fn format_date_full(timestamp: NaiveDateTime, today: NaiveDate) -> String {
    let time = timestamp.format("%H:%M");
    match relative_day(timestamp.date(), today) {
        Some(label) => format!("{label} {time}"),
        None => timestamp.format("%Y-%m-%d %H:%M").to_string(),
    }
}

/// Returns `Today` or `Yesterday` when `date` is one of those days.
fn relative_day(date: NaiveDate, today: NaiveDate) -> Option<&'static str> {
    if date == today {
        Some("Today")
    } else if today.checked_sub_days(Days::new(1)) == Some(date) {
        Some("Yesterday")
    } else {
        None
    }
}

/// Formats a byte count with binary units: `0 Bytes`, `512 Bytes`,
/// `1.5 KB`, `5 MB`.
#[inline]
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    reason = "display rounding to two decimals hides any precision loss"
)]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = "Bytes";
    for &next in UNITS.iter().skip(1) {
        if value < 1024.0_f64 {
            break;
        }
        value /= 1024.0_f64;
        unit = next;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {unit}")
}

/// Aggregate numbers shown above the report list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportStatistics {
    /// Number of reports.
    pub report_count: usize,
    /// Sum of `total_spending` across reports.
    pub total_spending: f64,
    /// Sum of `transaction_count` across reports.
    pub total_transactions: u64,
    /// Transactions per report, rounded half up. Zero when there are no
    /// reports.
    pub average_transactions: u64,
    /// Month of the first report, which callers keep newest-first.
    pub latest_month: Option<ReportMonth>,
}

/// Computes [`ReportStatistics`] for a newest-first report list.
#[inline]
#[must_use]
pub fn aggregate_statistics(reports: &[ReportRecord]) -> ReportStatistics {
    let total_spending: f64 = reports.iter().map(|report| report.total_spending).sum();
    let total_transactions: u64 = reports.iter().map(|report| report.transaction_count).sum();
    let count = reports.len() as u64;
    let average_transactions = total_transactions
        .saturating_mul(2)
        .saturating_add(count)
        .checked_div(count.saturating_mul(2))
        .unwrap_or(0);
    ReportStatistics {
        report_count: reports.len(),
        total_spending,
        total_transactions,
        average_transactions,
        latest_month: reports.first().map(|report| report.report_month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report(id: i64, month: &str, spending: f64, count: u64) -> ReportRecord {
        ReportRecord {
            report_id: ReportId::new(id),
            report_month: month.parse().unwrap(),
            total_spending: spending,
            transaction_count: count,
            generated_at: date(2024, 2, 1).and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn currency_prefix_and_suffix() {
        assert_eq!(format_currency(1234.5, "SEK"), "1234.50 kr");
        assert_eq!(format_currency(1234.5, "USD"), "$1234.50");
        assert_eq!(format_currency(10.0, "EUR"), "\u{20ac}10.00");
        assert_eq!(format_currency(3.0, "PLN"), "3.00 z\u{142}");
        assert_eq!(format_currency(3.0, "CZK"), "3.00 K\u{10d}");
    }

    #[test]
    fn currency_code_is_case_insensitive() {
        assert_eq!(format_currency(1.0, "sek"), "1.00 kr");
        assert_eq!(format_currency(1.0, "usd"), "$1.00");
    }

    #[test]
    fn unknown_currency_uses_code() {
        assert_eq!(format_currency(5.0, "CHF"), "CHF5.00");
        assert_eq!(currency_symbol("CHF"), None);
    }

    #[test]
    fn negative_currency_has_leading_minus() {
        assert_eq!(format_currency(-40.0, "USD"), "-$40.00");
        assert_eq!(format_currency(-40.0, "NOK"), "-40.00 kr");
    }

    #[test]
    fn negative_rounding_to_zero_has_no_minus() {
        assert_eq!(format_currency(-0.001, "USD"), "$0.00");
        assert_eq!(format_currency(-0.004, "SEK"), "0.00 kr");
        assert_eq!(format_currency(-0.005_1, "USD"), "-$0.01");
        assert_eq!(format_signed_amount(-0.001, "USD"), "+$0.00");
    }

    #[test]
    fn signed_amounts() {
        assert_eq!(format_signed_amount(12.0, "USD"), "+$12.00");
        assert_eq!(format_signed_amount(-4.5, "USD"), "-$4.50");
        assert_eq!(format_signed_amount(0.0, "DKK"), "+0.00 kr");
    }

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(1234.5), "1,234.50");
        assert_eq!(format_number(0.0), "0.00");
        assert_eq!(format_number(1_000_000.0), "1,000,000.00");
        assert_eq!(format_number(999.0), "999.00");
        assert_eq!(format_number(-1520.75), "-1,520.75");
        assert_eq!(format_number(1234.567), "1,234.567");
    }

    #[test]
    fn months_render_long_form() {
        assert_eq!(format_month("2024-01"), "January 2024");
        assert_eq!(format_month("2023-12"), "December 2023");
        assert_eq!(format_month("garbage"), "garbage");
    }

    #[test]
    fn relative_dates() {
        let today = date(2024, 1, 10);
        assert_eq!(format_date(today, today), "Today");
        assert_eq!(format_date(date(2024, 1, 9), today), "Yesterday");
        assert_eq!(format_date(date(2024, 1, 1), today), "Mon, Jan 1");
        assert_eq!(format_date(date(2024, 1, 11), today), "Thu, Jan 11");
    }

    #[test]
    fn relative_timestamps() {
        let today = date(2024, 1, 10);
        let at = |d: NaiveDate| d.and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(format_date_full(at(today), today), "Today 14:05");
        assert_eq!(format_date_full(at(date(2024, 1, 9)), today), "Yesterday 14:05");
        assert_eq!(format_date_full(at(date(2024, 1, 5)), today), "2024-01-05 14:05");
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(1024), "1 KB");
    }

    #[test]
    fn statistics_for_reports() {
        let reports = [
            report(3, "2024-03", 900.0, 30),
            report(2, "2024-02", 1100.5, 25),
            report(1, "2024-01", 500.0, 10),
        ];
        let stats = aggregate_statistics(&reports);
        assert_eq!(stats.report_count, 3);
        assert!((stats.total_spending - 2500.5).abs() < 1e-9);
        assert_eq!(stats.total_transactions, 65);
        // 65 / 3 = 21.67
        assert_eq!(stats.average_transactions, 22);
        assert_eq!(stats.latest_month, Some(ReportMonth::new(2024, 3).unwrap()));
    }

    #[test]
    fn average_rounds_half_up() {
        let reports = [report(1, "2024-01", 0.0, 1), report(2, "2024-02", 0.0, 2)];
        assert_eq!(aggregate_statistics(&reports).average_transactions, 2);
    }

    #[test]
    fn statistics_for_no_reports() {
        let stats = aggregate_statistics(&[]);
        assert_eq!(stats.report_count, 0);
        assert_eq!(stats.average_transactions, 0);
        assert_eq!(stats.latest_month, None);
    }
}
