pub mod event;
pub mod relay;

pub use event::{
    ClientMessage, Event, Filter, RelayMessage, DEPHY_CATEGORY, DEPHY_KIND, TAG_DEPHY_EDGE,
    TAG_DEPHY_FROM, TAG_DEPHY_TO,
};
pub use relay::{RelayClient, RelaySubscription};
