//! Request validation and dispatch to the weekly or monthly aggregator.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::client::RecordStore;
use crate::date_window::{self, Clock, SystemClock};
use crate::error::AggregationError;
use crate::filter::Filter;
use crate::monthly::{MonthlyAggregate, MonthlyAggregator};
use crate::weekly::{WeeklyAggregate, WeeklyAggregator};

pub const DEFAULT_SUBQUERY_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_WEEK_CONCURRENCY: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
}

impl FromStr for Period {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "semana" => Ok(Self::Week),
            "month" | "mes" | "mês" => Ok(Self::Month),
            _ => Err(AggregationError::BadRequest(format!(
                "invalid period {s:?}, use \"semana\" or \"mes\""
            ))),
        }
    }
}

/// Raw path parameters as supplied by the caller.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct RawParams {
    #[validate(length(min = 1, message = "stage is required"))]
    pub stage: String,
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
    #[validate(length(min = 1, message = "period is required"))]
    pub period: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationRequest {
    pub stage: String,
    pub status: String,
    pub period: Period,
}

impl AggregationRequest {
    pub fn parse(stage: &str, status: &str, period: &str) -> Result<Self, AggregationError> {
        Self::try_from(RawParams {
            stage: stage.to_owned(),
            status: status.to_owned(),
            period: period.to_owned(),
        })
    }

    /// Stage and status in the store's canonical form.
    pub fn filter(&self) -> Filter {
        Filter::normalized(&self.stage, &self.status)
    }
}

impl TryFrom<RawParams> for AggregationRequest {
    type Error = AggregationError;

    fn try_from(raw: RawParams) -> Result<Self, Self::Error> {
        let trimmed = RawParams {
            stage: raw.stage.trim().to_owned(),
            status: raw.status.trim().to_owned(),
            period: raw.period.trim().to_owned(),
        };
        trimmed.validate().map_err(|e| {
            AggregationError::BadRequest(format!(
                "invalid parameters, use /:stage/:status/:period ({e})"
            ))
        })?;

        Ok(Self {
            period: trimmed.period.parse()?,
            stage: trimmed.stage,
            status: trimmed.status,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Aggregate {
    Week(WeeklyAggregate),
    Month(MonthlyAggregate),
}

/// Fan-out knobs shared by both aggregators.
#[derive(Clone, Copy, Debug)]
pub struct QuerySettings {
    pub per_query_timeout: Duration,
    pub week_concurrency: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            per_query_timeout: DEFAULT_SUBQUERY_TIMEOUT,
            week_concurrency: DEFAULT_WEEK_CONCURRENCY,
        }
    }
}

pub struct PipelineService<S, C = SystemClock> {
    store: S,
    clock: C,
    weekly: WeeklyAggregator,
    monthly: MonthlyAggregator,
}

impl<S: RecordStore, C: Clock> PipelineService<S, C> {
    pub fn new(store: S, clock: C, settings: QuerySettings) -> Self {
        Self {
            store,
            clock,
            weekly: WeeklyAggregator::new(settings.per_query_timeout, settings.week_concurrency),
            monthly: MonthlyAggregator::new(settings.per_query_timeout),
        }
    }

    pub async fn aggregate(
        &self,
        request: &AggregationRequest,
    ) -> Result<Aggregate, AggregationError> {
        let filter = request.filter();
        let today = date_window::today(&self.clock);
        info!(
            stage = %filter.stage,
            status = %filter.status,
            period = ?request.period,
            %today,
            "aggregating"
        );

        match request.period {
            Period::Week => self
                .weekly
                .run(&self.store, &filter, today)
                .await
                .map(Aggregate::Week),
            Period::Month => self
                .monthly
                .run(&self.store, &filter, today)
                .await
                .map(Aggregate::Month),
        }
    }

    /// Validate raw parameters and aggregate. Bad input never reaches the store.
    pub async fn handle(&self, raw: RawParams) -> Result<Aggregate, AggregationError> {
        let request = AggregationRequest::try_from(raw)?;
        self.aggregate(&request).await
    }
}
