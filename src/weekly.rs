//! Trailing 7-day aggregation: one sub-query per calendar day.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::client::{RecordStore, RemoteError};
use crate::date_window::{self, CalendarDate, DateRange};
use crate::error::AggregationError;
use crate::filter::Filter;

/// Days in the trailing window, today included.
pub const WEEK_LENGTH: i64 = 7;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAggregate {
    pub total: u64,
    /// Oldest to newest.
    pub by_day: BTreeMap<CalendarDate, u64>,
    /// Days whose sub-query failed and were counted as 0.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded_days: Vec<CalendarDate>,
}

impl WeeklyAggregate {
    /// Merge per-day outcomes. A failed day contributes 0; the total saturates
    /// at `u64::MAX`.
    pub fn merge<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (CalendarDate, Result<u64, RemoteError>)>,
    {
        let mut aggregate = Self::default();
        for (day, outcome) in outcomes {
            let count = match outcome {
                Ok(count) => count,
                Err(e) => {
                    warn!(%day, kind = e.kind(), error = %e, "daily sub-query failed, counting 0");
                    aggregate.degraded_days.push(day);
                    0
                }
            };
            aggregate.by_day.insert(day, count);
        }
        aggregate.degraded_days.sort_unstable();
        aggregate.total = aggregate
            .by_day
            .values()
            .fold(0u64, |total, count| total.saturating_add(*count));
        aggregate
    }
}

/// The seven single-day windows ending with `today`, oldest first.
pub fn trailing_days(today: CalendarDate) -> Option<Vec<DateRange>> {
    (0..WEEK_LENGTH)
        .rev()
        .map(|back| date_window::add_days(today, -back).and_then(DateRange::single_day))
        .collect()
}

#[derive(Clone, Copy, Debug)]
pub struct WeeklyAggregator {
    per_query_timeout: Duration,
    concurrency: usize,
}

impl WeeklyAggregator {
    /// `concurrency` of 1 runs the days strictly one after another.
    pub fn new(per_query_timeout: Duration, concurrency: usize) -> Self {
        Self {
            per_query_timeout,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run<S: RecordStore>(
        &self,
        store: &S,
        filter: &Filter,
        today: CalendarDate,
    ) -> Result<WeeklyAggregate, AggregationError> {
        let windows = trailing_days(today).ok_or_else(|| {
            AggregationError::Internal(format!("cannot build a 7-day window ending {today}"))
        })?;
        debug!(stage = %filter.stage, status = %filter.status, %today, "aggregating week");

        let limit = self.per_query_timeout;
        let outcomes: Vec<(CalendarDate, Result<u64, RemoteError>)> = stream::iter(windows)
            .map(|range| async move {
                let query = store.query(&filter.stage, &filter.status, range);
                let outcome = match timeout(limit, query).await {
                    Ok(result) => result.map(|totals| totals.total),
                    Err(_) => Err(RemoteError::Timeout(limit)),
                };
                (range.start(), outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        Ok(WeeklyAggregate::merge(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trailing_days_cover_a_leap_february() {
        let days: Vec<CalendarDate> = trailing_days(date(2024, 3, 2))
            .unwrap()
            .iter()
            .map(DateRange::start)
            .collect();
        assert_eq!(
            days,
            vec![
                date(2024, 2, 25),
                date(2024, 2, 26),
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2),
            ]
        );
    }

    #[test]
    fn every_window_is_one_day_wide() {
        for window in trailing_days(date(2025, 1, 3)).unwrap() {
            assert_eq!(date_window::add_days(window.start(), 1), Some(window.end()));
        }
    }

    #[test]
    fn merge_orders_by_date_regardless_of_arrival() {
        let outcomes = vec![
            (date(2024, 1, 3), Ok(4)),
            (date(2024, 1, 1), Ok(1)),
            (date(2024, 1, 2), Err(RemoteError::UpstreamStatus { status: 502 })),
        ];
        let aggregate = WeeklyAggregate::merge(outcomes);

        let keys: Vec<_> = aggregate.by_day.keys().copied().collect();
        assert_eq!(keys, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
        assert_eq!(aggregate.by_day[&date(2024, 1, 2)], 0);
        assert_eq!(aggregate.total, 5);
        assert_eq!(aggregate.degraded_days, vec![date(2024, 1, 2)]);
    }

    #[test]
    fn merge_total_saturates() {
        let outcomes = vec![(date(2024, 1, 1), Ok(u64::MAX)), (date(2024, 1, 2), Ok(1))];
        let aggregate = WeeklyAggregate::merge(outcomes);
        assert_eq!(aggregate.total, u64::MAX);
        assert_eq!(aggregate.by_day[&date(2024, 1, 2)], 1);
    }

    #[test]
    fn serializes_dates_as_keys() {
        let aggregate = WeeklyAggregate::merge(vec![(date(2024, 1, 1), Ok(2))]);
        let value = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(value, serde_json::json!({ "total": 2, "byDay": { "2024-01-01": 2 } }));
    }
}
