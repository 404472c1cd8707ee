//! Monthly report models.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ReportId;

/// A calendar month in `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportMonth {
    /// Four-digit year.
    year: i32,
    /// Month number, 1 through 12.
    month: u32,
}

/// Error returned when a string is not a valid `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month {0:?}, expected YYYY-MM")]
pub struct ParseMonthError(String);

impl ReportMonth {
    /// Creates a month, returning `None` if `month` is not in `1..=12`.
    #[inline]
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Returns the month containing `date`.
    #[inline]
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Returns the year.
    #[inline]
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Returns the month number (1 through 12).
    #[inline]
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Returns the first day of the month.
    #[inline]
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// File name the backend suggests for the downloaded PDF.
    #[inline]
    #[must_use]
    pub fn download_file_name(self) -> String {
        format!("financial_report_{self}.pdf")
    }
}

impl core::fmt::Display for ReportMonth {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl core::str::FromStr for ReportMonth {
    type Err = ParseMonthError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .split_once('-')
            .filter(|&(year, month)| {
                year.len() == 4
                    && month.len() == 2
                    && year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit())
            })
            .and_then(|(year, month)| Self::new(year.parse().ok()?, month.parse().ok()?))
            .ok_or_else(|| ParseMonthError(s.to_owned()))
    }
}

impl Serialize for ReportMonth {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportMonth {
    #[inline]
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A generated monthly report as listed by `GET /api/reports`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Unique identifier.
    pub report_id: ReportId,
    /// Month covered by the report.
    pub report_month: ReportMonth,
    /// Sum of expenses in the month.
    pub total_spending: f64,
    /// Number of transactions in the month.
    pub transaction_count: u64,
    /// When the report was generated (server local time).
    pub generated_at: NaiveDateTime,
}

/// Body of `GET /api/reports`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportList {
    /// Reports, newest first.
    #[serde(default)]
    pub reports: Vec<ReportRecord>,
}

/// Body of `POST /api/reports/generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    /// Month to generate.
    pub month: ReportMonth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_month() {
        let month: ReportMonth = "2024-01".parse().unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 1);
        assert_eq!(month.to_string(), "2024-01");
    }

    #[test]
    fn rejects_malformed_months() {
        for raw in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "", "abcd-ef"] {
            assert!(raw.parse::<ReportMonth>().is_err(), "{raw}");
        }
    }

    #[test]
    fn month_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        let month = ReportMonth::of(date);
        assert_eq!(month.to_string(), "2024-11");
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2024, 11, 1));
    }

    #[test]
    fn download_name() {
        let month = ReportMonth::new(2024, 3).unwrap();
        assert_eq!(month.download_file_name(), "financial_report_2024-03.pdf");
    }

    #[test]
    fn deserialize_report_list() {
        let json = r#"{"reports": [{
            "report_id": 5,
            "report_month": "2024-01",
            "total_spending": 1520.75,
            "transaction_count": 42,
            "generated_at": "2024-02-01T09:30:00"
        }]}"#;
        let list: ReportList = serde_json::from_str(json).unwrap();
        let report = list.reports.first().unwrap();
        assert_eq!(report.report_id, ReportId::new(5));
        assert_eq!(report.report_month, ReportMonth::new(2024, 1).unwrap());
        assert_eq!(report.transaction_count, 42);
    }

    #[test]
    fn missing_reports_key_is_empty() {
        let list: ReportList = serde_json::from_str("{}").unwrap();
        assert!(list.reports.is_empty());
    }

    #[test]
    fn generate_request_body() {
        let body = GenerateReportRequest {
            month: ReportMonth::new(2024, 5).unwrap(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"month":"2024-05"}"#);
    }
}
