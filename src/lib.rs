pub mod config;
pub mod error;
pub mod model;
pub mod nostr;
pub mod protocol;
pub mod rings;
pub mod session;
pub mod settings;
pub mod tui;

pub use error::{Error, Result};
