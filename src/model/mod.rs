pub mod address;
pub mod log_entry;

pub use address::{
    extract_device_address, ConnectionDefaults, ConnectionParams, DeviceAddress,
    DEFAULT_ASSIST_NODE_ADDRESS, DEFAULT_RELAY_ADDRESS, DID_PREFIX,
};
pub use log_entry::{ConnectionLog, LogEntry};
