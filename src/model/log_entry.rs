use crate::protocol::DecodedEvent;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Info {
        id: String,
        /// Unix seconds.
        ts: i64,
        message: String,
    },
    Event(Box<DecodedEvent>),
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        LogEntry::Info {
            id: uuid::Uuid::new_v4().to_string(),
            ts: chrono::Utc::now().timestamp(),
            message: message.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            LogEntry::Info { id, .. } => id,
            LogEntry::Event(decoded) => &decoded.id,
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, LogEntry::Event(_))
    }

    /// Single display line, the same in the TUI and in headless output.
    pub fn render(&self) -> String {
        match self {
            LogEntry::Info { ts, message, .. } => format!("{} 📶 {}", ts, message),
            LogEntry::Event(decoded) => format!(
                "{} 🌎 [NoStr] Received: {}",
                decoded.raw.timestamp, decoded.rendered
            ),
        }
    }
}

impl From<DecodedEvent> for LogEntry {
    fn from(decoded: DecodedEvent) -> Self {
        LogEntry::Event(Box::new(decoded))
    }
}

/// Newest-first log of a session. Entries are never edited; once `capacity`
/// is reached the oldest entry falls off. A capacity of 0 keeps everything.
#[derive(Debug, Clone)]
pub struct ConnectionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ConnectionLog {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn prepend(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        if self.capacity > 0 {
            self.entries.truncate(self.capacity);
        }
    }

    pub fn message(&mut self, message: impl Into<String>) {
        self.prepend(LogEntry::info(message));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }
}

impl Default for ConnectionLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_order() {
        let mut log = ConnectionLog::new(0);
        log.message("first");
        log.message("second");
        let rendered: Vec<String> = log.iter().map(LogEntry::render).collect();
        assert!(rendered[0].ends_with("📶 second"));
        assert!(rendered[1].ends_with("📶 first"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = ConnectionLog::new(2);
        log.message("a");
        log.message("b");
        log.message("c");
        assert_eq!(log.len(), 2);
        let last = log.iter().last().unwrap().render();
        assert!(last.ends_with("📶 b"));
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut log = ConnectionLog::new(0);
        for i in 0..5000 {
            log.message(format!("m{}", i));
        }
        assert_eq!(log.len(), 5000);
    }

    #[test]
    fn test_info_entries_get_unique_ids() {
        let a = LogEntry::info("x");
        let b = LogEntry::info("x");
        assert_ne!(a.id(), b.id());
        assert!(!a.is_event());
    }
}
