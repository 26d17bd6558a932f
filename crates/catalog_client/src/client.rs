//! Catalog HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Implements the
//! engine's `CatalogSource` seam over the v3 catalog endpoints:
//! top-level listing, by-path fetch, and full-object update.

use std::time::Duration;

use serde::Deserialize;

use permsync_engine::{CatalogError, CatalogNode, CatalogSource, ChildRef};

use crate::auth;
use crate::config::ClientConfig;

/// Catalog API client (blocking).
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Shape of the top-level `GET /api/v3/catalog` response.
#[derive(Deserialize)]
struct Listing {
    data: Vec<ChildRef>,
}

impl CatalogClient {
    /// Build a client from config: construct the HTTP stack, then obtain
    /// a token (login or cache).
    pub fn connect(config: &ClientConfig) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("permsync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .danger_accept_invalid_certs(!config.verify)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let api_base = config.base_url();
        let token = auth::obtain_token(&http, &api_base, &config.username, &config.password)?;
        Ok(Self { http, api_base, token })
    }

    /// Client with a known token. Used by tests against a mock server.
    pub fn with_token(api_base: &str, token: &str) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("permsync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn url(&self, segments: &[&str]) -> Result<url::Url, CatalogError> {
        let mut url = url::Url::parse(&self.api_base)
            .map_err(|e| CatalogError::Transport(format!("bad base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Transport("base URL cannot carry segments".into()))?
            .extend(segments);
        Ok(url)
    }

    fn by_path_url(&self, path: &[String]) -> Result<url::Url, CatalogError> {
        let mut url = self.url(&["api", "v3", "catalog", "by-path"])?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Transport("base URL cannot carry segments".into()))?
            .extend(path);
        Ok(url)
    }

    fn check(
        response: reqwest::blocking::Response,
        what: &str,
    ) -> Result<reqwest::blocking::Response, CatalogError> {
        let status = response.status().as_u16();
        if response.status().is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(match status {
            401 => CatalogError::Unauthorized,
            403 => CatalogError::Forbidden,
            404 => CatalogError::NotFound(what.to_string()),
            409 => CatalogError::Conflict(body),
            _ => CatalogError::Http(status, body),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: url::Url,
        what: &str,
    ) -> Result<T, CatalogError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        let response = Self::check(response, what)?;
        response.json().map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

impl CatalogSource for CatalogClient {
    fn get_by_path(&self, path: &[String]) -> Result<CatalogNode, CatalogError> {
        let url = self.by_path_url(path)?;
        self.get_json(url, &path.join("/"))
    }

    fn get_children(&self, path: &[String]) -> Result<Vec<ChildRef>, CatalogError> {
        Ok(self.get_by_path(path)?.children)
    }

    fn get_roots(&self) -> Result<Vec<ChildRef>, CatalogError> {
        let url = self.url(&["api", "v3", "catalog"])?;
        let listing: Listing = self.get_json(url, "catalog root")?;
        Ok(listing.data)
    }

    fn update(&self, node: &CatalogNode) -> Result<(), CatalogError> {
        let mut url = self.url(&["api", "v3", "catalog"])?;
        url.path_segments_mut()
            .map_err(|_| CatalogError::Transport("base URL cannot carry segments".into()))?
            .push(&node.id);
        let response = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(node)
            .send()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Self::check(response, &node.display_path())?;
        Ok(())
    }
}

/// Normalize one user-supplied path segment into the form the catalog
/// stores: quotes stripped, `@` dropped, space / `-` / `.` mapped to `_`.
pub fn normalize_segment(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '"' | '@' => None,
            ' ' | '-' | '.' => Some('_'),
            c => Some(c),
        })
        .collect()
}
