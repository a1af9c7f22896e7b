//! Shared fixtures for the integration tests.
//!
//! `ScriptedStore` stands in for the remote record store with per-day
//! outcomes and a call log. `spawn_app` serves any router on an ephemeral
//! local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use chrono::{NaiveDate, TimeZone, Utc};
use deal_pulse::{CalendarDate, DateRange, FixedClock, RecordStore, RemoteError, RemoteTotals};

pub fn date(y: i32, m: u32, d: u32) -> CalendarDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn clock_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
}

pub fn totals(total: u64) -> RemoteTotals {
    RemoteTotals { total, value: None }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub stage: String,
    pub status: String,
    pub range: DateRange,
}

/// Fake store answering by the first day of the queried window.
#[derive(Clone)]
pub struct ScriptedStore {
    outcomes: HashMap<CalendarDate, Result<RemoteTotals, RemoteError>>,
    fallback: Result<RemoteTotals, RemoteError>,
    stalled: Vec<CalendarDate>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self {
            outcomes: HashMap::new(),
            fallback: Ok(RemoteTotals::default()),
            stalled: Vec::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, start: CalendarDate, outcome: Result<RemoteTotals, RemoteError>) -> Self {
        self.outcomes.insert(start, outcome);
        self
    }

    pub fn otherwise(mut self, outcome: Result<RemoteTotals, RemoteError>) -> Self {
        self.fallback = outcome;
        self
    }

    /// Never answer for windows starting on `start`.
    pub fn stall(mut self, start: CalendarDate) -> Self {
        self.stalled.push(start);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl RecordStore for ScriptedStore {
    async fn query(
        &self,
        stage: &str,
        status: &str,
        range: DateRange,
    ) -> Result<RemoteTotals, RemoteError> {
        self.calls.lock().unwrap().push(Call {
            stage: stage.to_owned(),
            status: status.to_owned(),
            range,
        });
        if self.stalled.contains(&range.start()) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.outcomes
            .get(&range.start())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Serve `router` on 127.0.0.1 with an OS-assigned port.
pub async fn spawn_app(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
