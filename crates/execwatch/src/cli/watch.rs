//! Watch command handler.

use super::OutputFormat;
use execwatch::{
    ChannelNotifier, ConnectionState, Execution, ExecwatchResult, JsonError, Notification,
    NotificationLevel, SyncClient, SyncConfig, SyncSnapshot,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Connect and report notifications and running executions until Ctrl-C.
pub async fn watch(
    url: Option<String>,
    config_path: Option<&Path>,
    max_attempts: Option<u32>,
    format: OutputFormat,
) -> ExecwatchResult<()> {
    let mut config = SyncConfig::load_with_override(config_path)?;
    if let Some(url) = url {
        config = config.with_server_url(url);
    }
    if max_attempts.is_some() {
        config = config.with_max_reconnect_attempts(max_attempts);
    }
    config.validate()?;

    info!(server_url = %config.server_url(), "Starting watch");

    let (notifier, mut notifications) = ChannelNotifier::new();
    let client = SyncClient::spawn(config, notifier);
    client.connect().await?;

    let mut updates = client.subscribe();
    let mut last_report: Option<Report> = None;

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            result = &mut interrupted => {
                if let Err(e) = result {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Interrupted, disconnecting");
                break;
            }
            Some(notification) = notifications.recv() => {
                print_notification(&notification, format)?;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!("Sync worker stopped");
                    break;
                }
                let report = Report::from(&*updates.borrow_and_update());
                if last_report.as_ref() != Some(&report) {
                    print_report(&report, format)?;
                    last_report = Some(report);
                }
            }
        }
    }

    client.disconnect().await?;
    client.shutdown().await?;
    Ok(())
}

/// The part of a snapshot worth printing: connection phase and running list.
#[derive(Debug, Clone, PartialEq)]
struct Report {
    state: String,
    running: Vec<Execution>,
}

impl From<&SyncSnapshot> for Report {
    fn from(snapshot: &SyncSnapshot) -> Self {
        Self {
            state: describe_state(snapshot.state()),
            running: snapshot.running().clone(),
        }
    }
}

fn describe_state(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "disconnected".to_string(),
        ConnectionState::Connecting { attempt: 0 } => "connecting".to_string(),
        ConnectionState::Connecting { attempt } => format!("connecting (attempt {})", attempt),
        ConnectionState::Connected { client_id } => format!("connected as {}", client_id),
        ConnectionState::Reconnecting { attempt, delay } => format!(
            "reconnecting in {}ms (attempt {})",
            delay.as_millis(),
            attempt
        ),
        ConnectionState::GaveUp { attempts } => {
            format!("gave up after {} reconnect attempts", attempts)
        }
    }
}

fn describe_execution(execution: &Execution) -> String {
    let kind = execution.kind.map(|k| k.label()).unwrap_or("Workflow");
    let status = execution
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let mut line = format!("#{} {} [{}]", execution.id, kind, status);
    if let Some(started_at) = execution.started_at {
        line.push_str(&format!(" started {}", started_at.format("%H:%M:%S")));
    }
    line
}

fn notification_line(notification: &Notification) -> String {
    let marker = match notification.level() {
        NotificationLevel::Success => "ok",
        NotificationLevel::Error => "error",
    };
    format!(
        "[{}] {}: {}",
        marker,
        notification.title(),
        notification.detail()
    )
}

fn print_notification(notification: &Notification, format: OutputFormat) -> ExecwatchResult<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&serde_json::json!({ "notification": notification }))
                .map_err(|e| JsonError::new("notification", e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => println!("{}", notification_line(notification)),
    }
    Ok(())
}

fn print_report(report: &Report, format: OutputFormat) -> ExecwatchResult<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&serde_json::json!({
                "state": report.state,
                "running": report.running,
            }))
            .map_err(|e| JsonError::new("report", e.to_string()))?;
            println!("{}", json);
        }
        OutputFormat::Human => {
            println!("{:-<60}", "");
            println!("State: {}", report.state);
            if report.running.is_empty() {
                println!("No running executions");
            }
            for execution in &report.running {
                println!("  {}", describe_execution(execution));
            }
        }
    }
    Ok(())
}
