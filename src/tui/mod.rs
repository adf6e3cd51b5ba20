pub mod app;
pub mod event;
pub mod tui_logger;
pub mod ui;
pub mod widgets;

pub use app::{Action, App, FocusArea, FormField, NoticeKind, TuiPhase};
pub use event::{Event, EventHandler};
pub use tui_logger::{init_tui_logger, LogEvent, TuiLogger};
