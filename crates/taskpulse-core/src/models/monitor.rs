use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default window for uptime queries
pub const DEFAULT_UPTIME_HOURS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorStatus {
    Up,
    Down,
    Degraded,
    Paused,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for MonitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MonitorStatus::Up => "up",
            MonitorStatus::Down => "down",
            MonitorStatus::Degraded => "degraded",
            MonitorStatus::Paused => "paused",
            MonitorStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Monitor {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Check interval in seconds
    pub interval: u32,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub status: MonitorStatus,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub created_at: Option<NaiveDateTime>,
    pub last_checked_at: Option<NaiveDateTime>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct NewMonitor {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Uptime {
    pub uptime_percentage: f64,
    pub total_checks: u64,
    pub failed_checks: u64,
    pub avg_response_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckTriggered {
    pub status: String,
    pub check_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardMetrics {
    pub total_monitors: u64,
    pub monitors_up: u64,
    pub monitors_down: u64,
    pub monitors_degraded: u64,
    pub active_incidents: u64,
    pub avg_uptime: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusEntry {
    pub name: String,
    pub status: MonitorStatus,
    pub uptime_24h: Option<f64>,
}

/// Public status snapshot, no session required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusPage {
    #[serde(default)]
    pub monitors: Vec<StatusEntry>,
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Operational,
    PartialOutage,
    ServiceDisruption,
}

impl OverallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Operational => "All Systems Operational",
            OverallStatus::PartialOutage => "Partial Outage",
            OverallStatus::ServiceDisruption => "Service Disruption",
        }
    }
}

impl StatusPage {
    /// Any monitor down is a disruption; otherwise any degraded is a partial outage.
    pub fn overall(&self) -> OverallStatus {
        if self.monitors.iter().any(|m| m.status == MonitorStatus::Down) {
            OverallStatus::ServiceDisruption
        } else if self.monitors.iter().any(|m| m.status == MonitorStatus::Degraded) {
            OverallStatus::PartialOutage
        } else {
            OverallStatus::Operational
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: MonitorStatus) -> StatusEntry {
        StatusEntry {
            name: "api".to_string(),
            status,
            uptime_24h: Some(99.9),
        }
    }

    #[test]
    fn test_monitor_parses_backend_shape() {
        let json = r#"{
            "id": "m1", "name": "API health", "url": "https://api.example.com/health",
            "interval": 60, "type": "https", "status": "up", "enabled": true,
            "created_at": "2024-05-01T10:00:00", "last_checked_at": null
        }"#;
        let monitor: Monitor = serde_json::from_str(json).unwrap();
        assert_eq!(monitor.status, MonitorStatus::Up);
        assert_eq!(monitor.kind.as_deref(), Some("https"));
        assert!(monitor.last_checked_at.is_none());
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: MonitorStatus = serde_json::from_str(r#""maintenance""#).unwrap();
        assert_eq!(status, MonitorStatus::Unknown);
    }

    #[test]
    fn test_overall_status() {
        let mut page = StatusPage {
            monitors: vec![entry(MonitorStatus::Up), entry(MonitorStatus::Paused)],
            last_updated: None,
        };
        assert_eq!(page.overall(), OverallStatus::Operational);

        page.monitors.push(entry(MonitorStatus::Degraded));
        assert_eq!(page.overall(), OverallStatus::PartialOutage);

        page.monitors.push(entry(MonitorStatus::Down));
        assert_eq!(page.overall(), OverallStatus::ServiceDisruption);
    }

    #[test]
    fn test_empty_status_page_is_operational() {
        let page: StatusPage =
            serde_json::from_str(r#"{"overall_status":"operational","monitors":[]}"#).unwrap();
        assert_eq!(page.overall().label(), "All Systems Operational");
    }
}
