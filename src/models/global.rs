use std::path::PathBuf;

use serde::Deserialize;

use crate::utils::store::Document;

/// Bot-wide settings read from `config.json` at startup
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalSettings {
    #[serde(rename = "LoggingActivated", default = "enabled")]
    pub logging_activated: bool,
    #[serde(rename = "DebugModeActivated", default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub log_file_location: String,
}

fn enabled() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            logging_activated: true,
            debug_mode: false,
            log_file_location: String::new(),
        }
    }
}

impl GlobalSettings {
    /// Falls back to defaults when a field has the wrong type
    pub fn from_document(doc: &Document) -> Self {
        serde_json::from_value(serde_json::Value::Object(doc.clone())).unwrap_or_default()
    }

    /// Directory for the rolling log file, if file logging is on
    pub fn log_dir(&self) -> Option<PathBuf> {
        let location = self.log_file_location.trim();
        if !self.logging_activated || location.is_empty() {
            return None;
        }
        Some(PathBuf::from(location))
    }
}

/// What startup found at `config.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalConfigState {
    Loaded,
    Missing,
    /// Present, but read as `{}`: corrupt, not an object, or literally empty
    Unreadable,
}

impl GlobalConfigState {
    pub fn classify(file_exists: bool, doc: &Document) -> Self {
        match (file_exists, doc.is_empty()) {
            (_, false) => Self::Loaded,
            (false, true) => Self::Missing,
            (true, true) => Self::Unreadable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_defaults() {
        let settings = GlobalSettings::from_document(&Document::new());
        assert!(settings.logging_activated);
        assert!(!settings.debug_mode);
        assert_eq!(settings.log_dir(), None);
    }

    #[test]
    fn test_log_dir() {
        let doc: Document = serde_json::from_value(json!({
            "whitelist": ["1"],
            "LoggingActivated": true,
            "DebugModeActivated": true,
            "log_file_location": "logs/"
        }))
        .unwrap();
        let settings = GlobalSettings::from_document(&doc);
        assert!(settings.debug_mode);
        assert_eq!(settings.log_dir(), Some(PathBuf::from("logs/")));

        let off = GlobalSettings {
            logging_activated: false,
            ..settings
        };
        assert_eq!(off.log_dir(), None);
    }

    #[test]
    fn test_classify_global_config() {
        let doc: Document = serde_json::from_value(json!({ "whitelist": [] })).unwrap();
        assert_eq!(GlobalConfigState::classify(true, &doc), GlobalConfigState::Loaded);
        assert_eq!(
            GlobalConfigState::classify(false, &Document::new()),
            GlobalConfigState::Missing
        );
        assert_eq!(
            GlobalConfigState::classify(true, &Document::new()),
            GlobalConfigState::Unreadable
        );
    }
}
