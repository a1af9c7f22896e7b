//! Trailing-window deal aggregation over the Vista CRM listing API.
//!
//! A request names a stage, a status and a period. Week mode issues one
//! sub-query per calendar day and tolerates individual failures; month mode
//! issues a single sub-query and passes the remote totals through.

pub mod argument_parsing;
pub mod client;
pub mod config;
pub mod date_window;
pub mod error;
pub mod filter;
pub mod monthly;
pub mod query;
pub mod routes;
pub mod service;
pub mod weekly;

pub use client::{RecordStore, RemoteError, RemoteTotals, VistaClient};
pub use date_window::{CalendarDate, Clock, DateRange, FixedClock, SystemClock};
pub use error::{AggregationError, StartupError};
pub use service::{Aggregate, AggregationRequest, Period, PipelineService, QuerySettings};
