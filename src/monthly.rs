//! Trailing one-month aggregation: a single sub-query, totals passed through.

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::client::{RecordStore, RemoteError};
use crate::date_window::{self, CalendarDate, DateRange};
use crate::error::AggregationError;
use crate::filter::Filter;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// `[today - 1 month, today)`, see [`date_window::subtract_one_month`].
pub fn trailing_month(today: CalendarDate) -> Option<DateRange> {
    DateRange::new(date_window::subtract_one_month(today)?, today)
}

#[derive(Clone, Copy, Debug)]
pub struct MonthlyAggregator {
    per_query_timeout: Duration,
}

impl MonthlyAggregator {
    pub fn new(per_query_timeout: Duration) -> Self {
        Self { per_query_timeout }
    }

    /// Fails as a whole if the one sub-query fails.
    pub async fn run<S: RecordStore>(
        &self,
        store: &S,
        filter: &Filter,
        today: CalendarDate,
    ) -> Result<MonthlyAggregate, AggregationError> {
        let range = trailing_month(today).ok_or_else(|| {
            AggregationError::Internal(format!("cannot build a one-month window ending {today}"))
        })?;
        debug!(
            stage = %filter.stage,
            status = %filter.status,
            window = %range,
            "aggregating month"
        );

        let outcome = match timeout(
            self.per_query_timeout,
            store.query(&filter.stage, &filter.status, range),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.per_query_timeout)),
        };

        match outcome {
            Ok(totals) => Ok(MonthlyAggregate {
                total: totals.total,
                value: totals.value,
            }),
            Err(e) => {
                error!(window = %range, kind = e.kind(), error = %e, "monthly query failed");
                Err(e.into())
            }
        }
    }
}
