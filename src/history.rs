//! Process-lifetime translation history. Append-only, never persisted.

use chrono::{DateTime, Utc};

pub const EMPTY_HISTORY_MESSAGE: &str = "No translation history yet.";

/// One completed translation, as shown in the history view.
#[derive(Debug, Clone)]
pub struct TranslationRecord {
    pub input_text: String,
    pub output_text: String,
    /// Human-readable direction, e.g. "English to Spanish"
    pub mode_description: String,
    pub dialect_label: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct HistoryLog {
    records: Vec<TranslationRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: TranslationRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Format all entries in insertion order, or the fixed empty message.
    pub fn render(&self) -> String {
        if self.records.is_empty() {
            return EMPTY_HISTORY_MESSAGE.to_string();
        }

        let mut out = String::new();
        for (index, record) in self.records.iter().enumerate() {
            out.push_str(&format!(
                "{}. [{}] {} ({})\n   In:  {}\n   Out: {}\n",
                index + 1,
                record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                record.mode_description,
                record.dialect_label,
                record.input_text,
                record.output_text,
            ));
        }
        out.trim_end().to_string()
    }
}
