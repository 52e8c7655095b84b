use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::id_string;
use crate::utils::store::Document;

pub const LOGGING_ACTIVATED: &str = "LoggingActivated";
pub const LOGGING_CONFIG: &str = "logging_config";
pub const LOG_ALL_BY_DEFAULT: &str = "log_all_by_default";
pub const ENABLED_CHANNELS: &str = "enabled_channels";
pub const DISABLED_CHANNELS: &str = "disabled_channels";
pub const MUSIC_CHANNEL_ID: &str = "music_channel_id";
pub const ANNOUNCEMENTS: &str = "announcements";

/// Document written the first time a guild is seen
static DEFAULT_GUILD_CONFIG: Lazy<Document> = Lazy::new(|| {
    serde_json::from_value(json!({
        "whitelist": [],
        "LoggingActivated": true,
        "logging_config": {
            "log_all_by_default": true,
            "enabled_channels": [],
            "disabled_channels": []
        },
        "music_channel_id": ""
    }))
    .unwrap_or_default()
});

pub fn default_guild_config() -> Document {
    DEFAULT_GUILD_CONFIG.clone()
}

pub fn logging_activated(doc: &Document) -> bool {
    doc.get(LOGGING_ACTIVATED)
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

pub fn set_logging_activated(doc: &mut Document, enabled: bool) {
    doc.insert(LOGGING_ACTIVATED.to_string(), Value::Bool(enabled));
}

fn channel_list(logging: Option<&Value>, key: &str) -> Vec<String> {
    logging
        .and_then(|l| l.get(key))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(id_string).collect())
        .unwrap_or_default()
}

/// Whether messages in `channel_id` should be written to the chat log.
///
/// A disabled entry beats an enabled one; channels in neither list follow
/// `log_all_by_default`.
pub fn should_log_channel(doc: &Document, channel_id: u64) -> bool {
    if !logging_activated(doc) {
        return false;
    }
    let logging = doc.get(LOGGING_CONFIG);
    let channel = channel_id.to_string();

    if channel_list(logging, DISABLED_CHANNELS).contains(&channel) {
        return false;
    }
    if channel_list(logging, ENABLED_CHANNELS).contains(&channel) {
        return true;
    }
    logging
        .and_then(|l| l.get(LOG_ALL_BY_DEFAULT))
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

/// Moves a channel into the enabled or disabled list
pub fn set_channel_logging(doc: &mut Document, channel_id: u64, enabled: bool) {
    let logging = doc
        .entry(LOGGING_CONFIG)
        .or_insert_with(|| DEFAULT_GUILD_CONFIG[LOGGING_CONFIG].clone());
    if !logging.is_object() {
        *logging = DEFAULT_GUILD_CONFIG[LOGGING_CONFIG].clone();
    }

    let channel = channel_id.to_string();
    let (add_to, remove_from) = if enabled {
        (ENABLED_CHANNELS, DISABLED_CHANNELS)
    } else {
        (DISABLED_CHANNELS, ENABLED_CHANNELS)
    };

    if let Some(Value::Array(items)) = logging.get_mut(remove_from) {
        items.retain(|item| id_string(item).as_deref() != Some(channel.as_str()));
    }
    let target = &mut logging[add_to];
    if !target.is_array() {
        *target = Value::Array(Vec::new());
    }
    if let Value::Array(items) = target {
        if !items.iter().any(|item| id_string(item).as_deref() == Some(channel.as_str())) {
            items.push(Value::String(channel));
        }
    }
}

pub fn music_channel_id(doc: &Document) -> Option<u64> {
    doc.get(MUSIC_CHANNEL_ID)
        .and_then(id_string)
        .and_then(|id| id.parse().ok())
        .filter(|id| *id != 0)
}

/// `None` clears the setting back to the empty string
pub fn set_music_channel_id(doc: &mut Document, channel_id: Option<u64>) {
    let value = channel_id.map(|id| id.to_string()).unwrap_or_default();
    doc.insert(MUSIC_CHANNEL_ID.to_string(), Value::String(value));
}

pub fn announcements(doc: &Document) -> Option<(bool, Option<u64>)> {
    let section = doc.get(ANNOUNCEMENTS)?;
    let enabled = section
        .get("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let channel = section
        .get("channel_id")
        .and_then(id_string)
        .and_then(|id| id.parse().ok());
    Some((enabled, channel))
}

/// Keeps the previous channel when `channel_id` is `None`
pub fn set_announcements(doc: &mut Document, enabled: bool, channel_id: Option<u64>) {
    let previous = announcements(doc).and_then(|(_, channel)| channel);
    let channel = channel_id.or(previous);
    doc.insert(
        ANNOUNCEMENTS.to_string(),
        json!({
            "enabled": enabled,
            "channel_id": channel.map(|id| id.to_string()).unwrap_or_default(),
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape() {
        let doc = default_guild_config();
        assert_eq!(doc["whitelist"], json!([]));
        assert_eq!(doc["LoggingActivated"], json!(true));
        assert_eq!(doc["logging_config"]["log_all_by_default"], json!(true));
        assert_eq!(doc["logging_config"]["enabled_channels"], json!([]));
        assert_eq!(doc["logging_config"]["disabled_channels"], json!([]));
        assert_eq!(doc["music_channel_id"], json!(""));
        assert_eq!(doc.len(), 4);
    }

    #[test]
    fn test_should_log_channel() {
        let mut doc = default_guild_config();
        assert!(should_log_channel(&doc, 10));

        set_channel_logging(&mut doc, 10, false);
        assert!(!should_log_channel(&doc, 10));
        assert!(should_log_channel(&doc, 11));

        doc[LOGGING_CONFIG][LOG_ALL_BY_DEFAULT] = json!(false);
        assert!(!should_log_channel(&doc, 11));

        set_channel_logging(&mut doc, 10, true);
        assert!(should_log_channel(&doc, 10));
        assert_eq!(doc[LOGGING_CONFIG][DISABLED_CHANNELS], json!([]));
        assert_eq!(doc[LOGGING_CONFIG][ENABLED_CHANNELS], json!(["10"]));

        set_logging_activated(&mut doc, false);
        assert!(!should_log_channel(&doc, 10));
    }

    #[test]
    fn test_set_channel_logging_on_empty_doc() {
        let mut doc = Document::new();
        set_channel_logging(&mut doc, 5, true);
        set_channel_logging(&mut doc, 5, true);
        assert_eq!(doc[LOGGING_CONFIG][ENABLED_CHANNELS], json!(["5"]));
    }

    #[test]
    fn test_music_channel() {
        let mut doc = default_guild_config();
        assert_eq!(music_channel_id(&doc), None);

        set_music_channel_id(&mut doc, Some(99));
        assert_eq!(doc[MUSIC_CHANNEL_ID], json!("99"));
        assert_eq!(music_channel_id(&doc), Some(99));

        set_music_channel_id(&mut doc, None);
        assert_eq!(doc[MUSIC_CHANNEL_ID], json!(""));
    }

    #[test]
    fn test_announcements_keep_channel() {
        let mut doc = default_guild_config();
        assert_eq!(announcements(&doc), None);

        set_announcements(&mut doc, true, Some(7));
        set_announcements(&mut doc, false, None);
        assert_eq!(announcements(&doc), Some((false, Some(7))));

        // Legacy files store the channel as a number
        doc[ANNOUNCEMENTS] = json!({ "enabled": true, "channel_id": 8 });
        assert_eq!(announcements(&doc), Some((true, Some(8))));
    }
}
