use crate::model::{ConnectionDefaults, ConnectionLog, ConnectionParams, LogEntry};
use crate::session::{AppEvent, WEIGHT_SENT_MESSAGE};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

const NOTICE_TTL: Duration = Duration::from_secs(4);
const DIAGNOSTICS_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum TuiPhase {
    AwaitingParams,
    Connecting,
    Connected,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusArea {
    Form,
    Feed,
    WeightInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Device,
    Relay,
    AssistNode,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Device, FormField::Relay, FormField::AssistNode];

    pub fn next(self) -> Self {
        match self {
            FormField::Device => FormField::Relay,
            FormField::Relay => FormField::AssistNode,
            FormField::AssistNode => FormField::Device,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Device => FormField::AssistNode,
            FormField::Relay => FormField::Device,
            FormField::AssistNode => FormField::Relay,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::Device => "Device Address",
            FormField::Relay => "Relay Address (optional)",
            FormField::AssistNode => "Assist Node Address (optional)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    pub expires_at: Instant,
}

/// What the event loop has to do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connect(ConnectionParams),
    SendWeight(String),
    Quit,
}

pub struct App {
    pub phase: TuiPhase,
    pub should_quit: bool,
    pub focus_area: FocusArea,

    // Connect form
    pub form_field: FormField,
    pub device_input: Input,
    pub relay_input: Input,
    pub assist_input: Input,
    pub defaults: ConnectionDefaults,
    /// Blocking message over the form, dismissed with any key.
    pub popup_message: Option<String>,

    // Session
    pub params: Option<ConnectionParams>,
    pub log: ConnectionLog,
    pub weight_input: Input,
    pub control_ready: bool,
    pub notice: Option<Notice>,
    pub debug_mode: bool,
    pub diagnostics: VecDeque<String>,
    pub warning_count: usize,

    pub feed_scroll: usize,
    pub feed_viewport_height: usize,
}

impl App {
    pub fn new(defaults: ConnectionDefaults, log_capacity: usize, device: Option<String>) -> Self {
        Self {
            phase: TuiPhase::AwaitingParams,
            should_quit: false,
            focus_area: FocusArea::Form,
            form_field: FormField::Device,
            device_input: Input::new(device.unwrap_or_default()),
            relay_input: Input::default(),
            assist_input: Input::default(),
            defaults,
            popup_message: None,
            params: None,
            log: ConnectionLog::new(log_capacity),
            weight_input: Input::default(),
            control_ready: false,
            notice: None,
            debug_mode: false,
            diagnostics: VecDeque::new(),
            warning_count: 0,
            feed_scroll: 0,
            feed_viewport_height: 10,
        }
    }

    pub fn form_input(&self, field: FormField) -> &Input {
        match field {
            FormField::Device => &self.device_input,
            FormField::Relay => &self.relay_input,
            FormField::AssistNode => &self.assist_input,
        }
    }

    fn form_input_mut(&mut self, field: FormField) -> &mut Input {
        match field {
            FormField::Device => &mut self.device_input,
            FormField::Relay => &mut self.relay_input,
            FormField::AssistNode => &mut self.assist_input,
        }
    }

    /// Validates the form. On success the form is gone for good.
    pub fn submit_form(&mut self) -> Option<ConnectionParams> {
        match ConnectionParams::from_input(
            self.device_input.value(),
            self.relay_input.value(),
            self.assist_input.value(),
            &self.defaults,
        ) {
            Ok(params) => {
                self.params = Some(params.clone());
                self.transition_to_connecting();
                Some(params)
            }
            Err(e) => {
                self.popup_message = Some(format!("{}. Please check the device address.", e));
                None
            }
        }
    }

    pub fn transition_to_connecting(&mut self) {
        self.phase = TuiPhase::Connecting;
        self.focus_area = FocusArea::WeightInput;
    }

    pub fn transition_to_connected(&mut self) {
        if self.phase == TuiPhase::Connecting {
            self.phase = TuiPhase::Connected;
        }
    }

    /// Terminal: the weight box is locked and only scrolling and quit remain.
    pub fn transition_to_error(&mut self, error: String) {
        self.phase = TuiPhase::Error(error);
        if self.focus_area == FocusArea::WeightInput {
            self.focus_area = FocusArea::Feed;
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, TuiPhase::Error(_))
    }

    pub fn show_notice(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.notice = Some(Notice {
            text: text.into(),
            kind,
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    pub fn on_tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expires_at <= now) {
            self.notice = None;
        }
    }

    fn push_diagnostic(&mut self, line: String) {
        self.diagnostics.push_front(line);
        self.diagnostics.truncate(DIAGNOSTICS_CAPACITY);
    }

    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Info(message) => {
                self.log.message(message);
                self.keep_scroll_anchor();
            }
            AppEvent::Feed(decoded) => {
                self.log.prepend(LogEntry::Event(decoded));
                self.keep_scroll_anchor();
            }
            AppEvent::ControlReady => {
                self.control_ready = true;
                self.transition_to_connected();
            }
            AppEvent::Failed(error) => {
                self.transition_to_error(error);
            }
            AppEvent::CommandSent(_) => {
                self.log.message(WEIGHT_SENT_MESSAGE);
                self.keep_scroll_anchor();
                self.show_notice("Successful sent P2P message.", NoticeKind::Success);
            }
            AppEvent::CommandFailed(error) => {
                self.show_notice(
                    format!("Failed to send P2P message: {}", error),
                    NoticeKind::Failure,
                );
            }
            AppEvent::Log(msg, level) => {
                let should_show = match level {
                    log::Level::Error | log::Level::Warn => true,
                    _ => self.debug_mode,
                };
                if level <= log::Level::Warn {
                    self.warning_count += 1;
                }
                if should_show {
                    self.push_diagnostic(msg);
                }
            }
        }
    }

    /// Keeps the view on the same entries when something is prepended while
    /// the user is scrolled away from the top.
    fn keep_scroll_anchor(&mut self) {
        if self.feed_scroll > 0 {
            self.feed_scroll = (self.feed_scroll + 1).min(self.max_scroll());
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.log.len().saturating_sub(self.feed_viewport_height)
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.feed_scroll = (self.feed_scroll + lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.feed_scroll = self.feed_scroll.saturating_sub(lines);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Some(Action::Quit);
        }

        if self.popup_message.is_some() {
            self.popup_message = None;
            return None;
        }

        match self.focus_area {
            FocusArea::Form => self.handle_form_key(key),
            FocusArea::WeightInput if !self.is_failed() => self.handle_weight_key(key),
            FocusArea::WeightInput => None,
            FocusArea::Feed => {
                self.handle_feed_key(key);
                None
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.form_field = self.form_field.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.form_field = self.form_field.prev();
            }
            KeyCode::Enter => {
                return self.submit_form().map(Action::Connect);
            }
            _ => {
                let field = self.form_field;
                self.form_input_mut(field).handle_event(&CrosstermEvent::Key(key));
            }
        }
        None
    }

    fn handle_weight_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let input = self.weight_input.value().trim().to_string();
                if input.is_empty() {
                    return None;
                }
                self.weight_input.reset();
                if input == "/debug" {
                    self.debug_mode = !self.debug_mode;
                    let state = if self.debug_mode { "on" } else { "off" };
                    self.show_notice(format!("Debug mode {}", state), NoticeKind::Success);
                    return None;
                }
                return Some(Action::SendWeight(input));
            }
            KeyCode::Tab => {
                self.focus_area = FocusArea::Feed;
            }
            KeyCode::Up | KeyCode::Down | KeyCode::PageUp | KeyCode::PageDown => {
                self.handle_feed_key(key);
            }
            _ => {
                self.weight_input.handle_event(&CrosstermEvent::Key(key));
            }
        }
        None
    }

    /// Newest entry is at the top; scrolling down walks into older entries.
    fn handle_feed_key(&mut self, key: KeyEvent) {
        let page_size = self.feed_viewport_height.saturating_sub(1).max(1);
        match key.code {
            KeyCode::Tab if !self.is_failed() => self.focus_area = FocusArea::WeightInput,
            KeyCode::Down => self.scroll_down(1),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::PageDown => self.scroll_down(page_size),
            KeyCode::PageUp => self.scroll_up(page_size),
            KeyCode::Home => self.feed_scroll = 0,
            KeyCode::End => self.feed_scroll = self.max_scroll(),
            _ => {}
        }
    }
}
