//! Session storage.
//!
//! Reads/writes ~/.config/crosscheck/auth.json (0600 on Unix). The wizard
//! and the CLI never reach into ambient state for credentials — they take
//! an explicit [`SessionContext`] built here or from flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Explicit session handed to the API client at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Bearer token for the service API
    pub token: String,
    /// API base URL (e.g., "https://api.crosscheck.dev")
    pub api_base: String,
    /// Account email (for display)
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionContext {
    pub fn new(token: String, api_base: String) -> Self {
        Self { token, api_base, email: None }
    }
}

/// Returns the path to the session credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("crosscheck/auth.json"))
}

/// Load the saved session from disk.
/// Returns None if nothing is saved or the file is invalid.
pub fn load_auth() -> Option<SessionContext> {
    let path = auth_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save the session to disk.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_auth(session: &SessionContext) -> Result<(), String> {
    let path = auth_file_path().ok_or("Could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(session)
        .map_err(|e| format!("Failed to serialize session: {}", e))?;

    std::fs::write(&path, &contents)
        .map_err(|e| format!("Failed to write auth file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete the saved session.
pub fn delete_auth() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| format!("Failed to delete auth file: {}", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_roundtrip() {
        let session = SessionContext {
            token: "test-token".into(),
            api_base: "https://api.crosscheck.dev".into(),
            email: Some("alice@example.com".into()),
        };

        let json = serde_json::to_string_pretty(&session).unwrap();
        let parsed: SessionContext = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.token, "test-token");
        assert_eq!(parsed.api_base, "https://api.crosscheck.dev");
        assert_eq!(parsed.email.as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn session_missing_optional_fields() {
        let json = r#"{"token":"tok","api_base":"https://api.test"}"#;
        let parsed: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "tok");
        assert!(parsed.email.is_none());
    }

    #[test]
    fn auth_file_path_points_into_config_dir() {
        let path = auth_file_path().unwrap();
        assert!(path.to_string_lossy().contains("crosscheck"));
        assert!(path.to_string_lossy().contains("auth.json"));
    }

    #[test]
    fn save_and_load_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        // Write and read manually since save_auth uses the real config path.
        let session = SessionContext::new("tok123".into(), "https://api.test".into());
        let json = serde_json::to_string_pretty(&session).unwrap();
        std::fs::write(&path, &json).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: SessionContext = serde_json::from_str(&contents).unwrap();
        assert_eq!(loaded.token, "tok123");
        assert_eq!(loaded.api_base, "https://api.test");
    }
}
