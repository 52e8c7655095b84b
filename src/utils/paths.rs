// Data directory layout
//
// <root>/config.json            global config
// <root>/reactionrole.json      reaction-role table
// <root>/quiz.json, hangman.json minigame datasets
// <root>/servers/<guild>.json   per-guild config

use std::path::{Path, PathBuf};

use tracing::warn;

pub const GLOBAL_CONFIG: &str = "config.json";
pub const REACTION_ROLES: &str = "reactionrole.json";
pub const QUIZ: &str = "quiz.json";
pub const HANGMAN: &str = "hangman.json";

const SERVERS_DIR: &str = "servers";

/// Resolves logical resource names to files under a fixed data root
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Relative roots are anchored to the current working directory once, here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a fixed resource such as `config.json`
    pub fn resource(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn global_config(&self) -> PathBuf {
        self.resource(GLOBAL_CONFIG)
    }

    pub fn reaction_roles(&self) -> PathBuf {
        self.resource(REACTION_ROLES)
    }

    pub fn servers_dir(&self) -> PathBuf {
        self.root.join(SERVERS_DIR)
    }

    /// `<root>/servers/<guild_id>.json`. Pure path arithmetic; the store
    /// creates `servers/` on its blocking pool before touching the file.
    pub fn server_config(&self, guild_id: u64) -> PathBuf {
        self.servers_dir().join(format!("{}.json", guild_id))
    }
}

/// Creates the directory holding `path` if it is missing.
///
/// Failures are only logged: the next write against `path` reports the
/// real error.
pub fn ensure_parent_dir(path: &Path) {
    let Some(dir) = path.parent() else {
        return;
    };
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Could not create {}: {}", dir.display(), e);
    }
}
