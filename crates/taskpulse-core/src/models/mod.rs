//! Records returned by the dashboard API.
//!
//! - Task boards: `Board`, `BoardList`, `Card` and their request bodies
//! - Monitoring: `Monitor`, `Uptime`, `DashboardMetrics`, `StatusPage`
//!
//! The request pipeline never looks inside these; only the typed client
//! decodes them.

pub mod monitor;
pub mod task;

pub use monitor::{
    CheckTriggered, DashboardMetrics, Monitor, MonitorStatus, NewMonitor, OverallStatus,
    StatusEntry, StatusPage, Uptime, DEFAULT_UPTIME_HOURS,
};
pub use task::{Board, BoardInput, BoardList, Card, CardMove, NewCard, NewList};
