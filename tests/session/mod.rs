use dephy_interact::model::{ConnectionDefaults, ConnectionParams, DeviceAddress};
use dephy_interact::protocol::EventData;
use dephy_interact::protocol::EventDecoder;
use dephy_interact::rings::{ControlChannel, Method};
use dephy_interact::session::{
    apply_weight, establish_control_channel, run_decode_stage, spawn_weight_command, AppEvent,
    FEED_CHANNEL_CAPACITY,
};
use dephy_interact::Error;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[allow(dead_code)]
#[path = "../protocol/test_helpers.rs"]
mod test_helpers;
use test_helpers::*;

mod mock_channel;
use mock_channel::MockControlChannel;

fn params() -> ConnectionParams {
    ConnectionParams::from_input(DEVICE, "", "", &ConnectionDefaults::default())
        .expect("Failed to build connection params")
}

fn device() -> DeviceAddress {
    DEVICE.parse().expect("Failed to parse device address")
}

fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn info_messages(events: &[AppEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Info(m) => Some(m.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_control_channel_bring_up_sequence() {
    let mock = Arc::new(MockControlChannel::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    establish_control_channel(mock.clone(), params(), tx, Duration::ZERO)
        .await
        .expect("Bring-up should succeed");

    assert_eq!(mock.methods(), vec![Method::ConnectPeerViaHttp, Method::ConnectWithDid]);
    let calls = mock.calls();
    assert_eq!(calls[0].1, json!({"url": "https://rings-poc.dephy.io"}));
    assert_eq!(calls[1].1, json!({"did": DEVICE}));

    let events = drain(&mut rx);
    let ready_at = events
        .iter()
        .position(|e| matches!(e, AppEvent::ControlReady))
        .expect("ControlReady missing");
    assert_eq!(ready_at, 2);
    assert_eq!(
        info_messages(&events),
        vec![
            "[Init] Connecting to Rings node for P2P connection.".to_string(),
            "[Control Channel] Connected to helper node for P2P handshaking with Rings.".to_string(),
            format!("[Control Channel] Connected to {}", DEVICE),
        ]
    );
}

#[tokio::test]
async fn test_helper_node_failure_fails_session() {
    let mock = Arc::new(MockControlChannel::failing_on(Method::ConnectPeerViaHttp));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = establish_control_channel(mock.clone(), params(), tx, Duration::ZERO).await;
    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(mock.methods(), vec![Method::ConnectPeerViaHttp]);

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, AppEvent::Failed(_))));
    assert!(!events.iter().any(|e| matches!(e, AppEvent::ControlReady)));
}

#[tokio::test]
async fn test_device_connect_failure_is_only_logged() {
    let mock = Arc::new(MockControlChannel::failing_on(Method::ConnectWithDid));
    let (tx, mut rx) = mpsc::unbounded_channel();

    establish_control_channel(mock.clone(), params(), tx, Duration::ZERO)
        .await
        .expect("connectWithDid failure must not fail the session");

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, AppEvent::ControlReady)));
    assert!(!events.iter().any(|e| matches!(e, AppEvent::Failed(_))));
    assert_eq!(info_messages(&events).len(), 2);
}

#[tokio::test]
async fn test_weight_command_shape() {
    let mock = MockControlChannel::new();
    let sent = apply_weight(Some(&mock as &dyn ControlChannel), &device(), "2.0")
        .await
        .expect("Failed to send weight");
    assert_eq!(sent, Some(2.0));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Method::SendBackendMessage);
    assert_eq!(
        calls[0].1,
        json!({
            "destination_did": DEVICE,
            "data": "{\"PlainText\":\"2\"}",
        })
    );
}

#[tokio::test]
async fn test_weight_is_noop_without_control_channel() {
    let sent = apply_weight(None, &device(), "2.0")
        .await
        .expect("No-op must not fail");
    assert_eq!(sent, None);
}

#[tokio::test]
async fn test_rejected_weight_is_command_error() {
    let mock = MockControlChannel::failing_on(Method::SendBackendMessage);
    let result = apply_weight(Some(&mock as &dyn ControlChannel), &device(), "0.25").await;
    assert!(matches!(result, Err(Error::Command(_))));
    assert_eq!(mock.methods(), vec![Method::SendBackendMessage]);
}

#[tokio::test]
async fn test_non_numeric_weight_sends_nothing() {
    let mock = MockControlChannel::new();
    let result = apply_weight(Some(&mock as &dyn ControlChannel), &device(), "heavy").await;
    assert!(matches!(result, Err(Error::Command(_))));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_spawned_weight_command_reports_back() {
    let mock: Arc<dyn ControlChannel> = Arc::new(MockControlChannel::new());
    let (tx, mut rx) = mpsc::unbounded_channel();

    spawn_weight_command(Some(mock), device(), "-1.5".to_string(), tx.clone());
    match rx.recv().await {
        Some(AppEvent::CommandSent(weight)) => assert_eq!(weight, -1.5),
        other => panic!("expected CommandSent, got {:?}", other),
    }

    let failing: Arc<dyn ControlChannel> =
        Arc::new(MockControlChannel::failing_on(Method::SendBackendMessage));
    spawn_weight_command(Some(failing), device(), "3".to_string(), tx);
    assert!(matches!(rx.recv().await, Some(AppEvent::CommandFailed(_))));
}

#[tokio::test]
async fn test_decode_stage_keeps_order_and_skips_bad_events() {
    let (event_tx, event_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let (app_tx, mut app_rx) = mpsc::unbounded_channel();

    let first = EventData { original: 1.0, weight: 1.0, actually: 1.0 };
    let second = EventData { original: 2.0, weight: 2.0, actually: 2.0 };
    event_tx.send(create_test_event(DEVICE, &first, 10)).await.unwrap();
    event_tx.send(create_test_event(OTHER_DEVICE, &first, 11)).await.unwrap();
    event_tx
        .send(create_test_event_with_content(DEVICE, "not base58!".to_string()))
        .await
        .unwrap();
    event_tx.send(create_test_event(DEVICE, &second, 12)).await.unwrap();
    drop(event_tx);

    run_decode_stage(event_rx, EventDecoder::new(did(DEVICE)), app_tx).await;

    let fed: Vec<EventData> = drain(&mut app_rx)
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Feed(decoded) => Some(decoded.payload),
            _ => None,
        })
        .collect();
    assert_eq!(fed, vec![first, second]);
}

#[tokio::test]
async fn test_duplicate_events_are_not_deduplicated() {
    let (event_tx, event_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let (app_tx, mut app_rx) = mpsc::unbounded_channel();

    let event = create_test_event(DEVICE, &EventData { original: 5.0, weight: 5.0, actually: 5.0 }, 1);
    event_tx.send(event.clone()).await.unwrap();
    event_tx.send(event).await.unwrap();
    drop(event_tx);

    run_decode_stage(event_rx, EventDecoder::new(did(DEVICE)), app_tx).await;
    assert_eq!(drain(&mut app_rx).len(), 2);
}
