//! Weekly income/expense series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Income and expenses for one Monday-aligned week.
///
/// Both totals are non-negative; expenses are stored as magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeekBucket {
    /// Monday the week starts on.
    #[serde(rename = "date")]
    pub week_start: NaiveDate,
    /// Sum of positive amounts.
    pub income: f64,
    /// Sum of the magnitudes of negative amounts.
    pub expenses: f64,
}

impl WeekBucket {
    /// Creates an empty bucket for the week starting on `week_start`.
    #[inline]
    #[must_use]
    pub const fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            income: 0.0,
            expenses: 0.0,
        }
    }

    /// Returns income minus expenses.
    #[inline]
    #[must_use]
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Totals across a weekly series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Sum of weekly income.
    pub total_income: f64,
    /// Sum of weekly expenses.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub total_net: f64,
}

/// Inclusive date window covered by a weekly series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the window (a Monday).
    pub start: NaiveDate,
    /// Last day of the window.
    pub end: NaiveDate,
}

/// Body of `GET /api/weekly-chart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyChartResponse {
    /// Whether the backend produced data.
    #[serde(default)]
    pub success: bool,
    /// Weekly buckets, oldest first.
    #[serde(default)]
    pub weekly_data: Vec<WeekBucket>,
    /// Totals, when the backend computed them.
    #[serde(default)]
    pub summary: Option<WeeklySummary>,
    /// Window covered, when reported.
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// Currency the amounts are expressed in.
    #[serde(default)]
    pub base_currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_wire_format_uses_date_key() {
        let bucket = WeekBucket {
            week_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            income: 100.0,
            expenses: 40.0,
        };
        let value = serde_json::to_value(bucket).unwrap();
        assert_eq!(value["date"], "2024-01-01");
        assert!((bucket.net() - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialize_chart_response() {
        let json = r#"{
            "success": true,
            "weekly_data": [
                {"date": "2024-01-01", "income": 100.0, "expenses": 40.0},
                {"date": "2024-01-08", "income": 0, "expenses": 12.5}
            ],
            "summary": {"total_income": 100.0, "total_expenses": 52.5, "total_net": 47.5},
            "date_range": {"start": "2024-01-01", "end": "2024-01-14"}
        }"#;
        let response: WeeklyChartResponse = serde_json::from_str(json).unwrap();
        assert!(response.success);
        assert_eq!(response.weekly_data.len(), 2);
        let summary = response.summary.unwrap();
        assert!((summary.total_net - 47.5).abs() < f64::EPSILON);
        assert_eq!(
            response.date_range.unwrap().end,
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
    }

    #[test]
    fn empty_response_defaults() {
        let response: WeeklyChartResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(response.weekly_data.is_empty());
        assert!(response.summary.is_none());
    }
}
