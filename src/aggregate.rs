//! Weekly income/expense aggregation.
//!
//! Transactions are grouped into Monday-aligned weeks within a trailing
//! window that ends with the current week. Weeks without transactions are
//! omitted, so the resulting series may have gaps.

use std::collections::BTreeMap;

use chrono::{Datelike as _, Days, Local, NaiveDate};

use crate::models::{DateRange, TransactionRecord, WeekBucket, WeeklySummary};

/// Returns the Monday of the week containing `date`.
#[inline]
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Returns the first day of a window of `trailing_weeks` weeks ending with
/// the week containing `today`, or `None` for an empty window.
#[inline]
#[must_use]
pub fn window_start(today: NaiveDate, trailing_weeks: u32) -> Option<NaiveDate> {
    let earlier_weeks = u64::from(trailing_weeks.checked_sub(1)?);
    week_start(today).checked_sub_days(Days::new(earlier_weeks * 7))
}

/// Returns the window covered by [`aggregate`] for the same arguments.
#[inline]
#[must_use]
pub fn date_range(today: NaiveDate, trailing_weeks: u32) -> Option<DateRange> {
    window_start(today, trailing_weeks).map(|start| DateRange { start, end: today })
}

/// Buckets transactions by week over a trailing window.
///
/// Each transaction dated on or after the window start adds the magnitude
/// of its amount to its own week's income (amount >= 0) or expenses
/// (amount < 0). Older transactions are ignored. The result is sorted by
/// week and contains only weeks with at least one transaction.
#[inline]
#[must_use]
#[tracing::instrument(skip(transactions), fields(count = transactions.len()))]
pub fn aggregate(
    transactions: &[TransactionRecord],
    trailing_weeks: u32,
    today: NaiveDate,
) -> Vec<WeekBucket> {
    let Some(start) = window_start(today, trailing_weeks) else {
        return Vec::new();
    };

    let mut weeks: BTreeMap<NaiveDate, WeekBucket> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.transaction_date >= start)
    {
        let monday = week_start(tx.transaction_date);
        let bucket = weeks
            .entry(monday)
            .or_insert_with(|| WeekBucket::empty(monday));
        if tx.is_income() {
            bucket.income += tx.amount;
        } else {
            bucket.expenses += tx.amount.abs();
        }
    }

    tracing::debug!(weeks = weeks.len(), %start, "aggregated weekly buckets");
    weeks.into_values().collect()
}

/// [`aggregate`] using the local calendar date as `today`.
#[inline]
#[must_use]
pub fn aggregate_current(transactions: &[TransactionRecord], trailing_weeks: u32) -> Vec<WeekBucket> {
    aggregate(transactions, trailing_weeks, Local::now().date_naive())
}

/// Totals a weekly series.
#[inline]
#[must_use]
pub fn summarize(buckets: &[WeekBucket]) -> WeeklySummary {
    let (total_income, total_expenses) = buckets
        .iter()
        .fold((0.0_f64, 0.0_f64), |(income, expenses), bucket| {
            (income + bucket.income, expenses + bucket.expenses)
        });
    WeeklySummary {
        total_income,
        total_expenses,
        total_net: total_income - total_expenses,
    }
}
