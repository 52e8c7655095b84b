// Reaction-role table: { "<guild_id>": [ReactionRoleMessage, ...] }
//
// Records are edited in place on the raw JSON so that anything this module
// cannot read survives a write untouched.

use serde_json::{json, Value};
use tracing::warn;

use super::id_string;
use crate::utils::store::Document;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleMapping {
    pub emoji: String,
    pub role_id: String,
}

/// One message users react to, with its emoji -> role pairs
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRoleMessage {
    pub message_id: String,
    pub channel_id: String,
    pub roles: Vec<RoleMapping>,
}

fn parse_mapping(value: &Value) -> Option<RoleMapping> {
    Some(RoleMapping {
        emoji: value.get("emoji")?.as_str()?.to_string(),
        role_id: value.get("roleID").and_then(id_string)?,
    })
}

fn parse_record(record: &Value) -> Option<ReactionRoleMessage> {
    let message_id = record.get("messageID").and_then(id_string)?;
    let channel_id = record.get("channelID").and_then(id_string)?;
    let roles = match record.get("roles") {
        Some(Value::Array(roles)) => roles.iter().filter_map(parse_mapping).collect(),
        _ => Vec::new(),
    };
    Some(ReactionRoleMessage {
        message_id,
        channel_id,
        roles,
    })
}

/// Readable entries for one guild. Records without ids and role entries
/// without an emoji or role id are skipped; the rest of a record still counts.
pub fn guild_entries(table: &Document, guild_id: u64) -> Vec<ReactionRoleMessage> {
    let Some(Value::Array(records)) = table.get(&guild_id.to_string()) else {
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| {
            let entry = parse_record(record);
            if entry.is_none() {
                warn!("Skipping reaction-role record in guild {}: {}", guild_id, record);
            }
            entry
        })
        .collect()
}

/// Adds `emoji -> role` on a message, replacing an existing mapping for the
/// same emoji. Other records and entries are left exactly as stored.
///
/// Returns false, changing nothing, when the guild's value or the matched
/// record's `roles` is not an array.
pub fn add_mapping(
    table: &mut Document,
    guild_id: u64,
    channel_id: u64,
    message_id: u64,
    emoji: &str,
    role_id: u64,
) -> bool {
    let records = table
        .entry(guild_id.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(records) = records else {
        return false;
    };

    let message_id = message_id.to_string();
    let channel_id = channel_id.to_string();
    let mapping = json!({ "emoji": emoji, "roleID": role_id.to_string() });

    let existing = records
        .iter()
        .position(|r| r.get("messageID").and_then(id_string).as_deref() == Some(message_id.as_str()));
    let Some(index) = existing else {
        records.push(json!({
            "messageID": message_id,
            "channelID": channel_id,
            "roles": [mapping],
        }));
        return true;
    };
    // Only objects carry a messageID
    let Some(record) = records[index].as_object_mut() else {
        return false;
    };

    if !matches!(record.get("roles"), None | Some(Value::Array(_))) {
        return false;
    }
    record.insert("channelID".to_string(), Value::String(channel_id));
    let roles = record
        .entry("roles")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(roles) = roles {
        let key = emoji_key(emoji);
        let slot = roles.iter_mut().find(|r| {
            r.get("emoji").and_then(Value::as_str).map(emoji_key) == Some(key)
        });
        match slot {
            Some(slot) => *slot = mapping,
            None => roles.push(mapping),
        }
    }
    true
}

/// Drops every mapping for the guild. Returns whether anything was removed.
pub fn clear_guild(table: &mut Document, guild_id: u64) -> bool {
    table.remove(&guild_id.to_string()).is_some()
}

/// Role granted for reacting with `reaction_key` on `message_id`
pub fn find_role(entries: &[ReactionRoleMessage], message_id: u64, reaction_key: &str) -> Option<u64> {
    let message_id = message_id.to_string();
    entries
        .iter()
        .filter(|e| e.message_id == message_id)
        .flat_map(|e| e.roles.iter())
        .find(|r| emoji_key(&r.emoji) == reaction_key)
        .and_then(|r| r.role_id.parse().ok())
        .filter(|id| *id != 0)
}

/// Comparable form of a stored emoji: custom emoji (`<:name:id>`,
/// `<a:name:id>`, `name:id`) reduce to their id, unicode stays as-is.
pub fn emoji_key(emoji: &str) -> &str {
    let trimmed = emoji.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);
    match inner.rsplit_once(':') {
        Some((_, id)) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => id,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_emoji_key() {
        assert_eq!(emoji_key("👍"), "👍");
        assert_eq!(emoji_key("<:pog:123456>"), "123456");
        assert_eq!(emoji_key("<a:dance:42>"), "42");
        assert_eq!(emoji_key("dance:42"), "42");
        assert_eq!(emoji_key(" ✅ "), "✅");
    }

    #[test]
    fn test_guild_entries_legacy_numbers() {
        let t = table(json!({
            "1": [
                { "messageID": 100, "channelID": "200", "roles": [{ "emoji": "👍", "roleID": 300 }] },
                { "bogus": true }
            ]
        }));
        let entries = guild_entries(&t, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message_id, "100");
        assert_eq!(entries[0].roles[0].role_id, "300");
        assert!(guild_entries(&t, 2).is_empty());
    }

    fn mixed_table() -> Document {
        table(json!({
            "1": [
                {
                    "messageID": "10",
                    "channelID": "20",
                    "roles": [
                        { "emoji": "👍", "roleID": "100" },
                        { "emoji": "🎉", "roleID": null }
                    ]
                },
                { "messageID": "11", "channelID": "21", "roles": "oops" },
                { "bogus": true }
            ]
        }))
    }

    #[test]
    fn test_bad_role_entry_keeps_rest_of_record() {
        let t = mixed_table();
        let entries = guild_entries(&t, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].roles,
            vec![RoleMapping {
                emoji: "👍".to_string(),
                role_id: "100".to_string()
            }]
        );
        assert!(entries[1].roles.is_empty());
        assert_eq!(find_role(&entries, 10, "👍"), Some(100));
        assert_eq!(find_role(&entries, 10, "🎉"), None);
    }

    #[test]
    fn test_add_keeps_unreadable_records() {
        let mut t = mixed_table();
        let before = t["1"].clone();

        assert!(add_mapping(&mut t, 1, 22, 12, "✅", 5));

        let records = t["1"].as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[..3], before.as_array().unwrap()[..]);
        assert_eq!(
            records[3],
            json!({ "messageID": "12", "channelID": "22", "roles": [{ "emoji": "✅", "roleID": "5" }] })
        );
    }

    #[test]
    fn test_add_to_record_with_bad_entry() {
        let mut t = mixed_table();
        let untouched = t["1"][1].clone();

        assert!(add_mapping(&mut t, 1, 20, 10, "<:pog:55>", 7));
        assert!(add_mapping(&mut t, 1, 20, 10, "👍", 8));

        assert_eq!(
            t["1"][0]["roles"],
            json!([
                { "emoji": "👍", "roleID": "8" },
                { "emoji": "🎉", "roleID": null },
                { "emoji": "<:pog:55>", "roleID": "7" }
            ])
        );
        assert_eq!(t["1"][1], untouched);

        let entries = guild_entries(&t, 1);
        assert_eq!(find_role(&entries, 10, "👍"), Some(8));
        assert_eq!(find_role(&entries, 10, "55"), Some(7));
    }

    #[test]
    fn test_add_refuses_malformed_containers() {
        let mut t = mixed_table();
        let before = t.clone();
        // Record 11 has a non-array `roles`
        assert!(!add_mapping(&mut t, 1, 99, 11, "✅", 5));
        assert_eq!(t, before);

        let mut t = table(json!({ "1": { "not": "a list" } }));
        let before = t.clone();
        assert!(!add_mapping(&mut t, 1, 2, 3, "✅", 4));
        assert_eq!(t, before);
    }

    #[test]
    fn test_add_and_find() {
        let mut t = Document::new();
        assert!(add_mapping(&mut t, 1, 20, 10, "👍", 1));
        assert!(add_mapping(&mut t, 1, 20, 10, "<:pog:55>", 2));
        assert!(add_mapping(&mut t, 1, 20, 10, "👍", 3));
        assert!(add_mapping(&mut t, 1, 21, 11, "👍", 4));

        let entries = guild_entries(&t, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].roles.len(), 2);
        assert_eq!(find_role(&entries, 10, "👍"), Some(3));
        assert_eq!(find_role(&entries, 10, "55"), Some(2));
        assert_eq!(find_role(&entries, 11, "👍"), Some(4));
        assert_eq!(find_role(&entries, 12, "👍"), None);
    }

    #[test]
    fn test_add_and_clear() {
        let mut t = Document::new();
        assert!(add_mapping(&mut t, 1, 2, 3, "✅", 4));

        assert_eq!(
            t["1"],
            json!([{ "messageID": "3", "channelID": "2", "roles": [{ "emoji": "✅", "roleID": "4" }] }])
        );

        assert!(clear_guild(&mut t, 1));
        assert!(!clear_guild(&mut t, 1));
        assert!(t.is_empty());
    }
}
