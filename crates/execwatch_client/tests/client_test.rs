//! Sync client tests against a local WebSocket server.

mod test_utils;

use execwatch_client::{ChannelNotifier, ConnectionState, LogNotifier, SyncClient, SyncConfig};
use execwatch_core::{Execution, ExecutionKind, ExecutionStatus, NotificationLevel};
use std::time::Duration;
use test_utils::{TestServer, WAIT, fast_config, unreachable_addr, unreachable_url, wait_for};
use tokio::time::{sleep, timeout};

fn update(id: i64, status: ExecutionStatus) -> Execution {
    Execution {
        id,
        status: Some(status),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_connects_with_client_id_query() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);

    client.connect().await?;
    let conn = server.accept().await;
    let snapshot = wait_for(&client, |s| s.connected()).await;

    let sent_id = conn.client_id().expect("client_id query parameter");
    let ConnectionState::Connected { client_id } = snapshot.state() else {
        panic!("expected connected state, got {:?}", snapshot.state());
    };
    assert_eq!(client_id.as_str(), sent_id);
    assert!(conn.uri.starts_with("/ws?client_id="));

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_updates_merge_into_snapshot() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);
    client.connect().await?;
    let mut conn = server.accept().await;

    conn.send_update(&Execution {
        id: 1,
        kind: Some(ExecutionKind::Workflow),
        status: Some(ExecutionStatus::Running),
        workflow_id: Some(7),
        test_input: Some("input".to_string()),
        ..Default::default()
    })
    .await;
    conn.send_update(&Execution {
        id: 1,
        test_output: Some("output".to_string()),
        ..Default::default()
    })
    .await;

    let snapshot = wait_for(&client, |s| {
        s.executions()
            .get(&1)
            .is_some_and(|e| e.test_output.is_some())
    })
    .await;

    let record = &snapshot.executions()[&1];
    assert_eq!(record.status, Some(ExecutionStatus::Running));
    assert_eq!(record.workflow_id, Some(7));
    assert_eq!(record.test_input.as_deref(), Some("input"));
    assert_eq!(record.test_output.as_deref(), Some("output"));
    assert_eq!(snapshot.executions().len(), 1);
    assert_eq!(snapshot.running().len(), 1);

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_terminal_transitions_raise_notifications() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let (notifier, mut notifications) = ChannelNotifier::new();
    let client = SyncClient::spawn(fast_config(&server.url), notifier);
    client.connect().await?;
    let mut conn = server.accept().await;

    // First sighting of an already finished execution is silent.
    conn.send_update(&update(9, ExecutionStatus::Succeeded)).await;

    conn.send_update(&Execution {
        id: 1,
        kind: Some(ExecutionKind::AgentTest),
        status: Some(ExecutionStatus::Running),
        ..Default::default()
    })
    .await;
    conn.send_update(&update(1, ExecutionStatus::Succeeded)).await;

    conn.send_update(&update(2, ExecutionStatus::Running)).await;
    conn.send_update(&Execution {
        id: 2,
        status: Some(ExecutionStatus::Failed),
        error_message: Some("boom".to_string()),
        ..Default::default()
    })
    .await;

    let first = timeout(WAIT, notifications.recv())
        .await?
        .expect("notifier channel open");
    assert_eq!(*first.level(), NotificationLevel::Success);
    assert_eq!(*first.execution_id(), 1);
    assert_eq!(first.title(), "Agent run completed");
    assert_eq!(first.detail(), "Execution #1 finished successfully");

    let second = timeout(WAIT, notifications.recv())
        .await?
        .expect("notifier channel open");
    assert_eq!(*second.level(), NotificationLevel::Error);
    assert_eq!(*second.execution_id(), 2);
    assert_eq!(second.title(), "Workflow failed");
    assert_eq!(second.detail(), "boom");

    wait_for(&client, |s| s.executions().len() == 3).await;
    assert!(notifications.try_recv().is_err());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_malformed_messages_keep_connection() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);
    client.connect().await?;
    let mut conn = server.accept().await;

    conn.send_text("not json").await;
    conn.send_text(r#"{"type":"presence","data":{"user":"x"}}"#)
        .await;
    conn.send_text(r#"{"type":"execution_update","data":{"status":"running"}}"#)
        .await;
    conn.send_update(&update(4, ExecutionStatus::Pending)).await;

    let snapshot = wait_for(&client, |s| s.executions().contains_key(&4)).await;
    assert_eq!(snapshot.executions().len(), 1);
    assert!(snapshot.connected());
    assert!(server.try_accept().is_none());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_running_list_capped_in_snapshot() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);
    client.connect().await?;
    let mut conn = server.accept().await;

    for id in 1..=15 {
        conn.send_update(&update(id, ExecutionStatus::Running)).await;
    }

    let snapshot = wait_for(&client, |s| s.executions().len() == 15).await;
    assert_eq!(snapshot.running().len(), 10);
    assert_eq!(client.running().len(), 10);

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_keep_alive_sends_ping() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let config = SyncConfig::builder()
        .server_url(server.url.as_str())
        .keep_alive_secs(1)
        .build()?;
    let client = SyncClient::spawn(config, LogNotifier);
    client.connect().await?;
    let mut conn = server.accept().await;

    assert_eq!(conn.next_text().await.as_deref(), Some("ping"));
    assert_eq!(conn.next_text().await.as_deref(), Some("ping"));

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_reconnects_with_fresh_client_id() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);
    client.connect().await?;

    let first = server.accept().await;
    let first_id = first.client_id().map(str::to_string);
    wait_for(&client, |s| s.connected()).await;

    drop(first);

    let second = server.accept().await;
    let second_id = second.client_id().map(str::to_string);
    wait_for(&client, |s| s.connected()).await;

    assert!(first_id.is_some());
    assert!(second_id.is_some());
    assert_ne!(first_id, second_id);

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_successful_reopen_resets_backoff() -> anyhow::Result<()> {
    let addr = unreachable_addr().await?;
    let config = SyncConfig::builder()
        .server_url(format!("ws://{}/ws", addr))
        .backoff_base_ms(200)
        .backoff_max_ms(1000)
        .build()?;
    let client = SyncClient::spawn(config, LogNotifier);
    client.connect().await?;

    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::Reconnecting { attempt: 2, .. })
    })
    .await;
    assert_eq!(
        *snapshot.state(),
        ConnectionState::Reconnecting {
            attempt: 2,
            delay: Duration::from_millis(400),
        }
    );

    let mut server = TestServer::start_on(addr).await?;
    let conn = server.accept().await;
    wait_for(&client, |s| s.connected()).await;
    drop(conn);

    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::Reconnecting { .. })
    })
    .await;
    assert_eq!(
        *snapshot.state(),
        ConnectionState::Reconnecting {
            attempt: 1,
            delay: Duration::from_millis(200),
        }
    );

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_oversized_keep_alive_keeps_worker_running() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let config: SyncConfig = serde_json::from_value(serde_json::json!({
        "server_url": server.url,
        "keep_alive_secs": u64::MAX,
    }))?;
    assert!(config.validate().is_err());

    let client = SyncClient::spawn(config, LogNotifier);
    client.connect().await?;
    let _conn = server.accept().await;
    wait_for(&client, |s| s.connected()).await;
    sleep(Duration::from_millis(300)).await;

    client.disconnect().await?;
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_closes_channel() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);
    client.connect().await?;
    let mut conn = server.accept().await;
    wait_for(&client, |s| s.connected()).await;

    client.disconnect().await?;
    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(conn.next_text().await, None);

    // No reconnect follows an explicit disconnect.
    sleep(Duration::from_millis(200)).await;
    assert!(server.try_accept().is_none());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_is_idempotent() -> anyhow::Result<()> {
    let client = SyncClient::spawn(fast_config(&unreachable_url().await?), LogNotifier);

    client.disconnect().await?;
    client.disconnect().await?;

    assert!(!client.is_connected());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert!(client.executions().is_empty());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() -> anyhow::Result<()> {
    let config = SyncConfig::builder()
        .server_url(unreachable_url().await?)
        .backoff_base_ms(300)
        .backoff_max_ms(300)
        .build()?;
    let client = SyncClient::spawn(config, LogNotifier);

    client.connect().await?;
    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::Reconnecting { .. })
    })
    .await;
    assert_eq!(
        *snapshot.state(),
        ConnectionState::Reconnecting {
            attempt: 1,
            delay: Duration::from_millis(300),
        }
    );

    client.disconnect().await?;
    assert_eq!(client.state(), ConnectionState::Disconnected);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(client.state(), ConnectionState::Disconnected);

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() -> anyhow::Result<()> {
    let config = fast_config(&unreachable_url().await?).with_max_reconnect_attempts(Some(2));
    let client = SyncClient::spawn(config, LogNotifier);

    client.connect().await?;
    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::GaveUp { .. })
    })
    .await;

    assert_eq!(*snapshot.state(), ConnectionState::GaveUp { attempts: 2 });
    assert!(!client.is_connected());

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_connect_after_giving_up_starts_over() -> anyhow::Result<()> {
    let config = SyncConfig::builder()
        .server_url(unreachable_url().await?)
        .backoff_base_ms(300)
        .backoff_max_ms(300)
        .max_reconnect_attempts(1)
        .build()?;
    let client = SyncClient::spawn(config, LogNotifier);

    client.connect().await?;
    wait_for(&client, |s| matches!(s.state(), ConnectionState::GaveUp { .. })).await;

    client.connect().await?;
    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::Reconnecting { .. })
    })
    .await;
    assert_eq!(
        *snapshot.state(),
        ConnectionState::Reconnecting {
            attempt: 1,
            delay: Duration::from_millis(300),
        }
    );

    let snapshot = wait_for(&client, |s| {
        matches!(s.state(), ConnectionState::GaveUp { .. })
    })
    .await;
    assert_eq!(*snapshot.state(), ConnectionState::GaveUp { attempts: 1 });

    client.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_repeated_connect_opens_one_channel() -> anyhow::Result<()> {
    let mut server = TestServer::start().await?;
    let client = SyncClient::spawn(fast_config(&server.url), LogNotifier);

    client.connect().await?;
    client.connect().await?;
    let _conn = server.accept().await;
    wait_for(&client, |s| s.connected()).await;
    client.connect().await?;

    sleep(Duration::from_millis(200)).await;
    assert!(server.try_accept().is_none());

    client.shutdown().await?;
    Ok(())
}
