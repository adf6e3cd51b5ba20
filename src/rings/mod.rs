pub mod client;

pub use client::{
    connect_peer_via_http, connect_with_did, node_info, send_backend_message, ControlChannel,
    Method, RingsRpcClient,
};
