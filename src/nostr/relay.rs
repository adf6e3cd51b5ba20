use crate::nostr::{ClientMessage, Event, Filter, RelayMessage};
use crate::{Error, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Single-relay NIP-01 client. Only reads; publishing is out of scope.
pub struct RelayClient {
    url: String,
}

impl RelayClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connects and sends `REQ`. Events flow once the returned subscription
    /// is driven with [`RelaySubscription::forward`].
    pub async fn subscribe(&self, filter: Filter) -> Result<RelaySubscription> {
        info!("Connecting to relay {}", self.url);
        let (ws_stream, _) = match timeout(CONNECT_TIMEOUT, connect_async(self.url.as_str())).await {
            Ok(Ok(ok)) => ok,
            Ok(Err(e)) => {
                return Err(Error::Connection(format!("relay {}: {}", self.url, e)));
            }
            Err(_) => {
                return Err(Error::Connection(format!(
                    "relay {}: connect timed out after {:?}",
                    self.url, CONNECT_TIMEOUT
                )));
            }
        };

        let (mut write, read) = ws_stream.split();
        let id = format!("dephy-{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        write
            .send(Message::Text(ClientMessage::req(&id, &[filter])?))
            .await?;
        debug!("Sent REQ {} to {}", id, self.url);

        Ok(RelaySubscription {
            id,
            url: self.url.clone(),
            write,
            read,
        })
    }
}

pub struct RelaySubscription {
    id: String,
    url: String,
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

impl RelaySubscription {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pushes every event of this subscription into `events`, in delivery
    /// order, until cancelled or the relay goes away. Sends `CLOSE` on
    /// cancellation.
    pub async fn forward(mut self, events: mpsc::Sender<Event>, cancel: CancellationToken) -> Result<()> {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Closing subscription {}", self.id);
                    let _ = self.write.send(Message::Text(ClientMessage::close(&self.id))).await;
                    let _ = self.write.close().await;
                    return Ok(());
                }
                next = self.read.next() => {
                    let message = match next {
                        Some(Ok(message)) => message,
                        Some(Err(e)) => return Err(Error::Connection(format!("relay {}: {}", self.url, e))),
                        None => return Err(Error::Connection(format!("relay {} closed the stream", self.url))),
                    };

                    match message {
                        Message::Text(text) => {
                            if !handle_text(&self.id, &self.url, &text, &events).await? {
                                return Ok(());
                            }
                        }
                        Message::Ping(payload) => {
                            self.write.send(Message::Pong(payload)).await?;
                        }
                        Message::Close(frame) => {
                            return Err(Error::Connection(format!(
                                "relay {} closed the connection: {:?}",
                                self.url, frame
                            )));
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}

/// Returns `Ok(false)` once nobody is listening for events anymore.
async fn handle_text(id: &str, url: &str, text: &str, events: &mpsc::Sender<Event>) -> Result<bool> {
    let message = match RelayMessage::from_json(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Skipping unparseable relay frame: {}", e);
            return Ok(true);
        }
    };

    match message {
        RelayMessage::Event { subscription_id, event } => {
            if subscription_id != id {
                debug!("Ignoring event for foreign subscription {}", subscription_id);
                return Ok(true);
            }
            if events.send(*event).await.is_err() {
                debug!("Event receiver dropped, stopping subscription {}", id);
                return Ok(false);
            }
        }
        RelayMessage::EndOfStoredEvents(subscription_id) => {
            debug!("End of stored events for {}", subscription_id);
        }
        RelayMessage::Notice(notice) => {
            warn!("Relay notice from {}: {}", url, notice);
        }
        RelayMessage::Closed { subscription_id, message } if subscription_id == id => {
            return Err(Error::Connection(format!(
                "relay {} closed subscription: {}",
                url, message
            )));
        }
        RelayMessage::Closed { .. } => {}
        RelayMessage::Unknown(label) => {
            debug!("Unknown relay frame {}", label);
        }
    }
    Ok(true)
}
