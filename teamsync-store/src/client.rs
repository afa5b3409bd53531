//! Realtime database REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use teamsync_core::config::StoreConfig;
use teamsync_core::credentials;
use teamsync_core::{RecordSource, StoreToken};
use tracing::{debug, info};
use url::Url;

use crate::{Error, Result};

/// Read-only client for a Firebase-style realtime database
///
/// Data at `path` is read with `GET {database_url}/{path}.json`. A stored
/// `null` means nothing lives at that path.
#[derive(Clone)]
pub struct RealtimeDbClient {
    http: reqwest::Client,
    database_url: Url,
    records_path: String,
    token: Option<StoreToken>,
}

impl RealtimeDbClient {
    /// Create a client for the given database and records path
    pub fn new(database_url: &str, records_path: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut database_url = Url::parse(database_url)?;
        if !database_url.path().ends_with('/') {
            let path = format!("{}/", database_url.path());
            database_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("teamsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            database_url,
            records_path: records_path.into(),
            token: None,
        })
    }

    /// Create a client from configuration, picking up the store token
    ///
    /// Token is loaded from (in priority order):
    /// 1. TEAMSYNC_STORE_TOKEN environment variable
    /// 2. `token_file` in the store section
    /// 3. ~/.config/teamsync/store.token
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let token = credentials::store_token(config)?;
        let client = Self::new(&config.database_url, config.records_path.clone(), config.timeout)?;
        let client = match token {
            Some(token) => client.with_token(token),
            None => client,
        };

        info!(
            database_url = %client.database_url,
            records_path = %client.records_path,
            authenticated = client.token.is_some(),
            "Created realtime database client"
        );

        Ok(client)
    }

    /// Authenticate requests with a database secret or access token
    pub fn with_token(mut self, token: StoreToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Get the configured records path
    pub fn records_path(&self) -> &str {
        &self.records_path
    }

    /// Build the REST URL for `path`, without credentials
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let path = path.trim_matches('/');
        Ok(self.database_url.join(&format!("{}.json", path))?)
    }

    /// Read the JSON value stored at `path`
    pub async fn get(&self, path: &str) -> Result<Option<Value>> {
        let mut url = self.url_for(path)?;
        debug!(url = %url, "Reading from realtime database");

        if let Some(ref token) = self.token {
            url.query_pairs_mut().append_pair("auth", token.expose());
        }

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))?;

        Ok(match value {
            Value::Null => None,
            other => Some(other),
        })
    }
}

impl std::fmt::Debug for RealtimeDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDbClient")
            .field("database_url", &self.database_url.as_str())
            .field("records_path", &self.records_path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordSource for RealtimeDbClient {
    fn label(&self) -> String {
        self.url_for(&self.records_path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| self.records_path.clone())
    }

    async fn fetch_tree(&self) -> teamsync_core::Result<Option<Value>> {
        Ok(self.get(&self.records_path).await?)
    }
}
