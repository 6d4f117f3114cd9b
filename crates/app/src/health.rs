//! Connection and health bookkeeping.
//!
//! These counters are observational only — nothing gates behavior on them.
//! They are serialized into the periodic health publication so a dashboard
//! can tell a flaky link from a dead one.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Live connectivity state of the bridge, owned by the bridge task.
#[derive(Debug, Clone)]
pub struct ConnectionHealth {
    started_at: Instant,
    api_connected: bool,
    socket_connected: bool,
    reconnect_count: u64,
    last_error: Option<String>,
    last_error_at: Option<DateTime<Utc>>,
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            api_connected: false,
            socket_connected: false,
            reconnect_count: 0,
            last_error: None,
            last_error_at: None,
        }
    }
}

impl ConnectionHealth {
    #[must_use]
    pub fn api_connected(&self) -> bool {
        self.api_connected
    }

    #[must_use]
    pub fn socket_connected(&self) -> bool {
        self.socket_connected
    }

    #[must_use]
    pub fn reconnect_count(&self) -> u64 {
        self.reconnect_count
    }

    pub fn api_up(&mut self) {
        self.api_connected = true;
    }

    pub fn api_down(&mut self) {
        self.api_connected = false;
    }

    pub fn socket_up(&mut self) {
        self.socket_connected = true;
    }

    pub fn socket_down(&mut self) {
        self.socket_connected = false;
    }

    /// Record a failed reconnect attempt with its error.
    pub fn record_reconnect_failure(&mut self, error: &str) {
        self.socket_connected = false;
        self.reconnect_count += 1;
        self.last_error = Some(error.to_string());
        self.last_error_at = Some(Utc::now());
    }

    /// Snapshot the current health into a publishable report.
    #[must_use]
    pub fn report(&self) -> HealthReport {
        HealthReport {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            reconnect_count: self.reconnect_count,
            last_error: self.last_error.clone(),
            last_error_time: self.last_error_at.map(|at| at.to_rfc3339()),
            api_connected: self.api_connected,
            socket_connected: self.socket_connected,
        }
    }
}

/// The health document published to `<slug>/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub uptime_seconds: u64,
    pub reconnect_count: u64,
    pub last_error: Option<String>,
    pub last_error_time: Option<String>,
    pub api_connected: bool,
    pub socket_connected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_start_disconnected_with_clean_counters() {
        let health = ConnectionHealth::default();
        assert!(!health.api_connected());
        assert!(!health.socket_connected());
        assert_eq!(health.reconnect_count(), 0);
        let report = health.report();
        assert_eq!(report.last_error, None);
        assert_eq!(report.last_error_time, None);
    }

    #[test]
    fn should_track_connectivity_transitions() {
        let mut health = ConnectionHealth::default();
        health.api_up();
        health.socket_up();
        assert!(health.api_connected());
        assert!(health.socket_connected());
        health.socket_down();
        assert!(!health.socket_connected());
        assert!(health.api_connected());
    }

    #[test]
    fn should_count_reconnect_failures_and_keep_last_error() {
        let mut health = ConnectionHealth::default();
        health.record_reconnect_failure("connection refused");
        health.record_reconnect_failure("timed out");
        assert_eq!(health.reconnect_count(), 2);
        let report = health.report();
        assert_eq!(report.last_error.as_deref(), Some("timed out"));
        assert!(report.last_error_time.is_some());
    }

    #[test]
    fn should_serialize_report_with_all_fields() {
        let mut health = ConnectionHealth::default();
        health.api_up();
        let json = serde_json::to_value(health.report()).unwrap();
        assert_eq!(json["api_connected"], true);
        assert_eq!(json["socket_connected"], false);
        assert_eq!(json["reconnect_count"], 0);
        assert!(json["uptime_seconds"].is_u64());
        assert!(json.get("last_error").is_some());
    }
}
