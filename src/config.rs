use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "dephy-interact",
    version,
    about = "Watch a DePHY device's event feed and send it weight commands over Rings"
)]
pub struct Cli {
    /// Device address, or any text containing one (0x + 40 hex digits).
    /// Pre-fills the connect form; required with --headless.
    #[arg(long, env = "DEPHY_DEVICE")]
    pub device: Option<String>,

    /// Nostr relay used when the relay field is left empty.
    #[arg(long, env = "DEPHY_RELAY")]
    pub relay: Option<String>,

    /// Rings helper node used when the assist node field is left empty.
    #[arg(long, env = "DEPHY_ASSIST_NODE")]
    pub assist: Option<String>,

    /// JSON-RPC endpoint of the local Rings node.
    #[arg(long, env = "DEPHY_RINGS_ENDPOINT")]
    pub rings_endpoint: Option<String>,

    /// Maximum number of log entries kept in memory (0 = unbounded).
    #[arg(long)]
    pub log_capacity: Option<usize>,

    /// Check each envelope's keccak256 hash before accepting it.
    #[arg(long, default_value = "false")]
    pub verify_hash: bool,

    /// Directory for info.log and error.log.
    #[arg(long, env = "DEPHY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Print the feed to stdout instead of drawing the terminal UI.
    #[arg(long, requires = "device")]
    pub headless: bool,

    /// Weight to send once the control channel is up (headless only).
    #[arg(long, requires = "headless", allow_hyphen_values = true)]
    pub weight: Option<String>,

    /// UI refresh interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub tick_rate_ms: u64,

    /// Write the effective settings to ~/.dephy-interact/settings.json.
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    /// Flags win over the persisted settings.
    pub fn merge(&self, mut settings: Settings) -> Settings {
        if let Some(relay) = &self.relay {
            settings.relay_address = relay.clone();
        }
        if let Some(assist) = &self.assist {
            settings.assist_node_address = assist.clone();
        }
        if let Some(endpoint) = &self.rings_endpoint {
            settings.rings_endpoint = endpoint.clone();
        }
        if let Some(capacity) = self.log_capacity {
            settings.log_capacity = capacity;
        }
        if self.verify_hash {
            settings.verify_hash = true;
        }
        if let Some(dir) = &self.log_dir {
            settings.log_dir = dir.clone();
        }
        settings
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(10))
    }
}
