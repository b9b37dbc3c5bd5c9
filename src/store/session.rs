use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication state for the whole app.
///
/// Authenticated API calls take an [`AuthToken`], so code paths that lack a
/// session cannot reach them; there is no ambient nullable token to forget
/// to check.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Unauthenticated,
    Authenticated(AuthToken),
}

/// Proof of a logged-in session: the bearer token plus the display name the
/// backend returned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthToken {
    pub token: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Could not determine config directory")]
    ConfigDirNotFound,

    #[error("File I/O error: {0}")]
    FileIo(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// On-disk layout. The keys mirror the mobile client's `token`/`username`
/// storage entries.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: String,
    #[serde(default)]
    username: String,
}

/// Persists the session as a JSON file in the platform config directory.
///
/// Written at login, read at startup, deleted at logout. A missing or
/// unreadable file means logged out, never a startup failure.
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Result<Self, SessionStoreError> {
        let config_dir = directories::ProjectDirs::from("com", "expense-tracker", "expense-tracker")
            .ok_or(SessionStoreError::ConfigDirNotFound)?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| SessionStoreError::FileIo(format!("Failed to create config dir: {e}")))?;

        Ok(Self {
            file_path: config_dir.join("session.json"),
        })
    }

    /// Store backed by an explicit path, used by tests.
    pub fn with_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn load(&self) -> Session {
        if !self.file_path.exists() {
            return Session::Unauthenticated;
        }

        let content = match fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read session file: {err}");
                return Session::Unauthenticated;
            }
        };

        match serde_json::from_str::<SessionFile>(&content) {
            Ok(file) if !file.token.is_empty() => Session::Authenticated(AuthToken {
                token: file.token,
                display_name: file.username,
            }),
            Ok(_) => Session::Unauthenticated,
            Err(err) => {
                tracing::warn!("Failed to parse session file, treating as logged out: {err}");
                Session::Unauthenticated
            }
        }
    }

    pub fn save(&self, auth: &AuthToken) -> Result<(), SessionStoreError> {
        let file = SessionFile {
            token: auth.token.clone(),
            username: auth.display_name.clone(),
        };

        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| SessionStoreError::Serialization(format!("Failed to serialize session: {e}")))?;

        fs::write(&self.file_path, content)
            .map_err(|e| SessionStoreError::FileIo(format!("Failed to write session: {e}")))?;

        tracing::info!("Session persisted to {:?}", self.file_path);
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionStoreError> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path)
                .map_err(|e| SessionStoreError::FileIo(format!("Failed to remove session: {e}")))?;
        }
        tracing::info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::with_path(dir.path().join("session.json"))
    }

    #[test]
    fn missing_file_means_unauthenticated() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), Session::Unauthenticated);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let auth = AuthToken {
            token: "abc123".to_string(),
            display_name: "minh".to_string(),
        };

        store.save(&auth).unwrap();
        assert_eq!(store.load(), Session::Authenticated(auth));
    }

    #[test]
    fn clear_removes_the_session() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let auth = AuthToken {
            token: "abc123".to_string(),
            display_name: String::new(),
        };

        store.save(&auth).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), Session::Unauthenticated);

        // Clearing an already-absent session is not an error.
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_means_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session.json"), "not json").unwrap();
        assert_eq!(store.load(), Session::Unauthenticated);
    }

    #[test]
    fn empty_token_means_unauthenticated() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            dir.path().join("session.json"),
            r#"{"token": "", "username": "x"}"#,
        )
        .unwrap();
        assert_eq!(store.load(), Session::Unauthenticated);
    }
}
