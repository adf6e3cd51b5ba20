use crate::model::{ConnectionParams, DeviceAddress};
use crate::nostr::{Event, Filter, RelayClient};
use crate::protocol::{parse_weight, DecodedEvent, EventDecoder, SendBackendMessageRequest};
use crate::rings::{self, ControlChannel};
use crate::{Error, Result};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Relay reader → decode stage buffer.
pub const FEED_CHANNEL_CAPACITY: usize = 512;
pub const DID_CONNECT_DELAY: Duration = Duration::from_secs(1);
pub const WEIGHT_SENT_MESSAGE: &str =
    "[Control Channel] Sent message through P2P network for changing weight.";

/// Everything background tasks report back to the single owner of the
/// session state.
#[derive(Debug)]
pub enum AppEvent {
    Log(String, log::Level),
    Info(String),
    Feed(Box<DecodedEvent>),
    ControlReady,
    Failed(String),
    CommandSent(f64),
    CommandFailed(String),
}

pub type AppSender = mpsc::UnboundedSender<AppEvent>;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub verify_hash: bool,
    pub did_connect_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            verify_hash: false,
            did_connect_delay: DID_CONNECT_DELAY,
        }
    }
}

/// Starts both halves of a session: the Rings control channel bring-up and
/// the relay feed. Both stop when `cancel` fires.
pub fn spawn_session(
    params: &ConnectionParams,
    channel: Arc<dyn ControlChannel>,
    options: &SessionOptions,
    events: AppSender,
    cancel: CancellationToken,
) {
    let control_params = params.clone();
    let control_events = events.clone();
    let control_cancel = cancel.clone();
    let delay = options.did_connect_delay;
    tokio::spawn(async move {
        tokio::select! {
            _ = control_cancel.cancelled() => {
                debug!("Control channel bring-up cancelled");
            }
            _ = establish_control_channel(channel, control_params, control_events, delay) => {}
        }
    });

    let relay = RelayClient::new(params.relay_address.clone());
    let decoder = EventDecoder::new(params.did()).with_hash_check(options.verify_hash);
    let since = chrono::Utc::now().timestamp().max(0) as u64;
    tokio::spawn(async move {
        if let Err(e) = start_feed(&relay, decoder, since, events.clone(), cancel).await {
            error!("Relay feed stopped: {}", e);
            let _ = events.send(AppEvent::Failed(e.to_string()));
        }
    });
}

/// Helper node handshake, then a delayed direct connect to the device.
/// Only the first step is allowed to fail the session.
pub async fn establish_control_channel(
    channel: Arc<dyn ControlChannel>,
    params: ConnectionParams,
    events: AppSender,
    did_connect_delay: Duration,
) -> Result<()> {
    let _ = events.send(AppEvent::Info(
        "[Init] Connecting to Rings node for P2P connection.".to_string(),
    ));

    if let Err(e) = rings::connect_peer_via_http(channel.as_ref(), &params.assist_node_address).await {
        let e = match e {
            Error::Connection(_) => e,
            other => Error::Connection(other.to_string()),
        };
        error!("Helper node {} unreachable: {}", params.assist_node_address, e);
        let _ = events.send(AppEvent::Failed(e.to_string()));
        return Err(e);
    }
    let _ = events.send(AppEvent::Info(
        "[Control Channel] Connected to helper node for P2P handshaking with Rings.".to_string(),
    ));
    let _ = events.send(AppEvent::ControlReady);

    tokio::time::sleep(did_connect_delay).await;
    match rings::connect_with_did(channel.as_ref(), params.device.as_str()).await {
        Ok(_) => {
            let _ = events.send(AppEvent::Info(format!(
                "[Control Channel] Connected to {}",
                params.device
            )));
        }
        Err(e) => error!("connectWithDid {} failed: {}", params.device, e),
    }
    Ok(())
}

/// Subscribes to the relay and runs the decode stage until cancelled or the
/// relay drops.
pub async fn start_feed(
    relay: &RelayClient,
    decoder: EventDecoder,
    since: u64,
    events: AppSender,
    cancel: CancellationToken,
) -> Result<()> {
    let subscription = relay.subscribe(Filter::dephy_since(since)).await?;
    let _ = events.send(AppEvent::Info(
        "[NoStr] Subscribed for DePHY messages.".to_string(),
    ));
    info!("Subscription {} open on {}", subscription.id(), relay.url());

    let (tx, rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let decode = tokio::spawn(run_decode_stage(rx, decoder, events));
    let result = subscription.forward(tx, cancel).await;
    let _ = decode.await;
    result
}

/// Drains relay events in delivery order. A bad event is logged and dropped;
/// the stage keeps going.
pub async fn run_decode_stage(mut rx: mpsc::Receiver<Event>, decoder: EventDecoder, events: AppSender) {
    while let Some(event) = rx.recv().await {
        match decoder.decode(&event) {
            Ok(Some(decoded)) => {
                if events.send(AppEvent::Feed(Box::new(decoded))).is_err() {
                    break;
                }
            }
            Ok(None) => debug!("Event {} is not from {}", event.id, decoder.did()),
            Err(e) => warn!("Dropping event {}: {}", event.id, e),
        }
    }
    debug!("Decode stage finished");
}

/// Sends one weight command. `None` channel means the control channel is not
/// up yet and nothing happens.
pub async fn apply_weight(
    channel: Option<&dyn ControlChannel>,
    device: &DeviceAddress,
    input: &str,
) -> Result<Option<f64>> {
    let Some(channel) = channel else {
        debug!("Control channel not ready, ignoring weight input");
        return Ok(None);
    };

    let weight = parse_weight(input)?;
    let request = SendBackendMessageRequest::weight(device, weight)?;
    rings::send_backend_message(channel, &request)
        .await
        .map_err(|e| Error::Command(e.to_string()))?;
    info!("Weight {} sent to {}", weight, device);
    Ok(Some(weight))
}

pub fn spawn_weight_command(
    channel: Option<Arc<dyn ControlChannel>>,
    device: DeviceAddress,
    input: String,
    events: AppSender,
) {
    tokio::spawn(async move {
        match apply_weight(channel.as_deref(), &device, &input).await {
            Ok(Some(weight)) => {
                let _ = events.send(AppEvent::CommandSent(weight));
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to send weight: {}", e);
                let _ = events.send(AppEvent::CommandFailed(e.to_string()));
            }
        }
    });
}
