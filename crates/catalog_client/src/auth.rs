//! Token acquisition and on-disk cache.
//!
//! Reads/writes `<config_dir>/permsync/auth.json` (0600 on Unix). A run
//! with explicit credentials logs in and refreshes the cache; a run
//! without credentials reuses the cached token for the same server.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use permsync_engine::CatalogError;

/// Token cached locally after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedToken {
    pub token: String,
    /// Base URL the token was issued by.
    pub api_base: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Returns the path of the token cache file.
pub fn token_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("permsync/auth.json"))
}

/// Load the cached token from disk.
/// Returns None if nothing is cached or the file is invalid.
pub fn load_cached() -> Option<CachedToken> {
    let path = token_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save the token to disk.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_cached(cached: &CachedToken) -> Result<(), String> {
    let path = token_file_path().ok_or("could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create config directory: {e}"))?;
    }

    let contents = serde_json::to_string_pretty(cached)
        .map_err(|e| format!("failed to serialize token: {e}"))?;

    std::fs::write(&path, &contents).map_err(|e| format!("failed to write auth file: {e}"))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("failed to set file permissions: {e}"))?;
    }

    Ok(())
}

/// Exchange credentials for a bearer token.
pub fn login(
    http: &reqwest::blocking::Client,
    api_base: &str,
    username: &str,
    password: &str,
) -> Result<String, CatalogError> {
    let url = format!("{api_base}/apiv2/login");
    let response = http
        .post(&url)
        .json(&LoginRequest { user_name: username, password })
        .send()
        .map_err(|e| CatalogError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    if status == 401 {
        return Err(CatalogError::Unauthorized);
    }
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CatalogError::Http(status, body));
    }
    let parsed: LoginResponse =
        response.json().map_err(|e| CatalogError::Parse(e.to_string()))?;
    Ok(parsed.token)
}

/// Get a usable token: log in when a username is given (refreshing the
/// cache), otherwise fall back to the cached token for this server.
pub fn obtain_token(
    http: &reqwest::blocking::Client,
    api_base: &str,
    username: &str,
    password: &str,
) -> Result<String, CatalogError> {
    if username.is_empty() {
        if let Some(cached) = load_cached() {
            if cached.api_base == api_base {
                return Ok(cached.token);
            }
        }
        return Err(CatalogError::Unauthorized);
    }
    let token = login(http, api_base, username, password)?;
    // Cache failures don't invalidate a successful login.
    let _ = save_cached(&CachedToken { token: token.clone(), api_base: api_base.to_string() });
    Ok(token)
}
