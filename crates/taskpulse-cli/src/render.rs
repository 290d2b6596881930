//! Plain-text rendering of API records.
//!
//! Functions return strings rather than printing so the layout can be
//! tested without capturing stdout.

use std::fmt::Write;

use chrono::NaiveDateTime;
use taskpulse_core::auth::SessionData;
use taskpulse_core::models::{
    Board, DashboardMetrics, Monitor, MonitorStatus, StatusPage, Uptime,
};

/// Column width for names in tables
const NAME_WIDTH: usize = 32;

/// Column width for URLs in the monitor table
const URL_WIDTH: usize = 40;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional timestamp, "never" if absent
pub fn format_timestamp(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        None => "never".to_string(),
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Human age for a number of minutes ("just now", "5m ago", "2h ago", "3d ago")
pub fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

fn status_badge(status: MonitorStatus) -> &'static str {
    match status {
        MonitorStatus::Up => "[UP]",
        MonitorStatus::Down => "[DOWN]",
        MonitorStatus::Degraded => "[DEGRADED]",
        MonitorStatus::Paused => "[PAUSED]",
        MonitorStatus::Unknown => "[?]",
    }
}

pub fn session(data: &SessionData) -> String {
    format!(
        "{} (id {}), logged in {}",
        data.user.email,
        data.user.id,
        format_age(data.age_minutes())
    )
}

pub fn board_list(boards: &[Board]) -> String {
    if boards.is_empty() {
        return "No boards yet.\n".to_string();
    }
    let mut out = String::new();
    for board in boards {
        let _ = writeln!(
            out,
            "{:<36}  {:<width$}  {}",
            board.id,
            truncate_string(&board.name, NAME_WIDTH),
            board.description.as_deref().unwrap_or(""),
            width = NAME_WIDTH
        );
    }
    out
}

pub fn board_detail(board: &Board) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", board.name, board.id);
    if let Some(ref description) = board.description {
        let _ = writeln!(out, "{}", description);
    }

    let mut lists: Vec<_> = board.lists.iter().collect();
    lists.sort_by_key(|l| l.position);
    for list in lists {
        let _ = writeln!(out, "\n== {} ({} cards) [{}]", list.name, list.cards.len(), list.id);
        let mut cards: Vec<_> = list.cards.iter().collect();
        cards.sort_by_key(|c| c.position);
        for card in cards {
            let mark = if card.completed { "x" } else { " " };
            let _ = writeln!(out, "  [{}] {}  ({})", mark, card.title, card.id);
        }
    }
    out
}

pub fn monitor_list(monitors: &[Monitor]) -> String {
    if monitors.is_empty() {
        return "No monitors configured.\n".to_string();
    }
    let mut out = String::new();
    for monitor in monitors {
        let _ = writeln!(
            out,
            "{:<11} {:<name$}  {:<url$}  every {}s  ({})",
            status_badge(monitor.status),
            truncate_string(&monitor.name, NAME_WIDTH),
            truncate_string(&monitor.url, URL_WIDTH),
            monitor.interval,
            monitor.id,
            name = NAME_WIDTH,
            url = URL_WIDTH
        );
    }
    out
}

pub fn monitor_detail(monitor: &Monitor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {} ({})", status_badge(monitor.status), monitor.name, monitor.id);
    let _ = writeln!(out, "  url:          {}", monitor.url);
    if let Some(ref kind) = monitor.kind {
        let _ = writeln!(out, "  type:         {}", kind);
    }
    let _ = writeln!(out, "  interval:     {}s", monitor.interval);
    let _ = writeln!(out, "  enabled:      {}", monitor.enabled);
    let _ = writeln!(out, "  last checked: {}", format_timestamp(monitor.last_checked_at));
    out
}

pub fn uptime(uptime: &Uptime, hours: u32) -> String {
    format!(
        "Uptime over {}h: {} ({} checks, {} failed, avg {:.0} ms)\n",
        hours,
        format_percent(uptime.uptime_percentage),
        uptime.total_checks,
        uptime.failed_checks,
        uptime.avg_response_time
    )
}

pub fn dashboard(metrics: &DashboardMetrics, monitors: &[Monitor]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Monitors: {} total, {} up, {} down, {} degraded",
        metrics.total_monitors, metrics.monitors_up, metrics.monitors_down, metrics.monitors_degraded
    );
    let _ = writeln!(out, "Average uptime (24h): {}", format_percent(metrics.avg_uptime));
    match metrics.active_incidents {
        0 => {}
        1 => {
            let _ = writeln!(out, "1 active incident requires attention.");
        }
        n => {
            let _ = writeln!(out, "{} active incidents require attention.", n);
        }
    }

    let attention: Vec<_> = monitors
        .iter()
        .filter(|m| matches!(m.status, MonitorStatus::Down | MonitorStatus::Degraded))
        .cloned()
        .collect();
    if !attention.is_empty() {
        let _ = writeln!(out, "\nNeeds attention:");
        out.push_str(&monitor_list(&attention));
    }
    out
}

pub fn status_page(page: &StatusPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", page.overall().label());
    let _ = writeln!(out, "Last updated: {}\n", format_timestamp(page.last_updated));
    for entry in &page.monitors {
        let uptime = entry
            .uptime_24h
            .map(format_percent)
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<11} {:<width$}  {}",
            status_badge(entry.status),
            truncate_string(&entry.name, NAME_WIDTH),
            uptime,
            width = NAME_WIDTH
        );
    }
    out
}
