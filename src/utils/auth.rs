// Whitelist-based authorization for privileged commands

use tracing::{error, info};

use crate::models::whitelist;
use crate::utils::store::ConfigStore;

/// Whether `user_id` is on the bot-wide whitelist in `config.json`
pub async fn is_authorized_global(store: &ConfigStore, user_id: u64) -> bool {
    let config = store.load_global_config().await;
    whitelist::contains(&config, &user_id.to_string())
}

/// Whether `user_id` may run privileged commands in `guild_id`.
///
/// A non-empty guild whitelist is authoritative, owners included. While the
/// whitelist is empty only the owner gets in, and their id is written to the
/// whitelist on that first check so the trust becomes explicit.
pub async fn is_authorized_server(
    store: &ConfigStore,
    user_id: u64,
    guild_id: u64,
    is_guild_owner: bool,
) -> bool {
    let user = user_id.to_string();
    let config = store.load_guild_config(guild_id).await;
    if !whitelist::entries(&config).is_empty() {
        return whitelist::contains(&config, &user);
    }
    if !is_guild_owner {
        return false;
    }

    // Re-check under the lock: someone may have filled the list meanwhile
    let owner = user.clone();
    let persisted = store
        .update_guild_config(guild_id, move |doc| {
            if whitelist::entries(doc).is_empty() {
                whitelist::add(doc, &owner);
                true
            } else {
                whitelist::contains(doc, &owner)
            }
        })
        .await;

    match persisted {
        Ok(allowed) => {
            if allowed {
                info!("Whitelisted owner {} of guild {}", user_id, guild_id);
            }
            allowed
        }
        Err(e) => {
            error!(
                "Could not persist owner {} to whitelist of guild {}: {}",
                user_id, guild_id, e
            );
            true
        }
    }
}

/// Global whitelist or guild-level authorization
pub async fn is_authorized(
    store: &ConfigStore,
    user_id: u64,
    guild_id: Option<u64>,
    is_guild_owner: bool,
) -> bool {
    if is_authorized_global(store, user_id).await {
        return true;
    }
    match guild_id {
        Some(guild_id) => is_authorized_server(store, user_id, guild_id, is_guild_owner).await,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::paths::DataPaths;
    use crate::utils::store::Document;
    use serde_json::json;
    use tempfile::TempDir;

    const GUILD: u64 = 555;
    const OWNER: u64 = 1;
    const MEMBER: u64 = 2;

    fn store(tmp: &TempDir) -> ConfigStore {
        ConfigStore::new(DataPaths::new(tmp.path()))
    }

    #[tokio::test]
    async fn test_global_whitelist() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(!is_authorized_global(&store, OWNER).await);

        let config: Document =
            serde_json::from_value(json!({ "whitelist": ["1"], "LoggingActivated": true })).unwrap();
        store.save_global_config(&config).await.unwrap();

        assert!(is_authorized_global(&store, OWNER).await);
        assert!(!is_authorized_global(&store, MEMBER).await);
    }

    #[tokio::test]
    async fn test_owner_persisted_on_first_use() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        assert!(!is_authorized_server(&store, MEMBER, GUILD, false).await);
        assert!(is_authorized_server(&store, OWNER, GUILD, true).await);

        let config = store.load_guild_config(GUILD).await;
        assert_eq!(whitelist::entries(&config), vec!["1".to_string()]);

        assert!(!is_authorized_server(&store, MEMBER, GUILD, false).await);
        assert!(is_authorized_server(&store, OWNER, GUILD, true).await);
    }

    #[tokio::test]
    async fn test_explicit_whitelist_excludes_owner() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store
            .update_guild_config(GUILD, |doc| whitelist::add(doc, "2"))
            .await
            .unwrap();

        assert!(is_authorized_server(&store, MEMBER, GUILD, false).await);
        assert!(!is_authorized_server(&store, OWNER, GUILD, true).await);

        let config = store.load_guild_config(GUILD).await;
        assert_eq!(whitelist::entries(&config), vec!["2".to_string()]);
    }

    #[tokio::test]
    async fn test_owner_allowed_when_persist_fails() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        // Guild file path occupied by a non-empty directory: every write fails
        let path = store.paths().server_config(GUILD);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("keep"), b"x").unwrap();

        assert!(is_authorized_server(&store, OWNER, GUILD, true).await);
        assert!(!is_authorized_server(&store, MEMBER, GUILD, false).await);
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_global_admin_passes_everywhere() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store
            .update_global_config(|doc| whitelist::add(doc, "9"))
            .await
            .unwrap();

        assert!(is_authorized(&store, 9, Some(GUILD), false).await);
        assert!(is_authorized(&store, 9, None, false).await);
        assert!(!is_authorized(&store, MEMBER, None, false).await);
        // Global admins are not written into the guild whitelist
        let config = store.load_guild_config(GUILD).await;
        assert!(whitelist::entries(&config).is_empty());
    }
}
