pub mod command;
pub mod decoder;
pub mod envelope;
pub mod event_data;

pub use command::{parse_weight, BackendMessage, SendBackendMessageRequest};
pub use decoder::{process_event, DecodedEvent, EventDecoder};
pub use envelope::{MessageChannel, RawMessage, SignedMessage};
pub use event_data::EventData;
