use chrono::DateTime;
use serde_json::json;

use crate::types::internal::alert::Alert;
use crate::types::internal::audit::AuditRecord;

fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

pub fn print_alerts(alerts: &[Alert], as_json: bool) -> Result<(), serde_json::Error> {
    if as_json {
        let values: Vec<_> = alerts
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "type": a.alert_type.as_str(),
                    "severity": a.severity.as_str(),
                    "message": a.message,
                    "user_id": a.user_id,
                    "ip_address": a.ip_address,
                    "created_at": a.created_at,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("No unresolved alerts");
        return Ok(());
    }
    for a in alerts {
        println!(
            "#{:<5} {:<8} {:<20} {}  {}",
            a.id,
            a.severity.as_str(),
            a.alert_type.as_str(),
            format_timestamp(a.created_at),
            a.message
        );
    }
    Ok(())
}

pub fn print_audit_entries(entries: &[AuditRecord], as_json: bool) -> Result<(), serde_json::Error> {
    if as_json {
        let values: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "id": e.id,
                    "timestamp": e.timestamp,
                    "event_type": e.event_type,
                    "user_id": e.user_id,
                    "action": e.action,
                    "ip_address": e.ip_address,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    for e in entries {
        println!(
            "{}  {:<22} {:<38} {}",
            format_timestamp(e.timestamp),
            e.event_type,
            e.user_id.as_deref().unwrap_or("-"),
            e.action
        );
    }
    Ok(())
}
