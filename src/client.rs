use crate::config::Credentials;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const BODY_EXCERPT_CHARS: usize = 200;
const USER_AGENT: &str = concat!("hivevlan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HiveResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to hive{hive} failed")]
    Transport {
        hive: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("hive{hive} answered {status}: {excerpt}")]
    Status {
        hive: String,
        status: StatusCode,
        excerpt: String,
    },
}

/// Blocking client for the bulk VLAN endpoint of each hive.
#[derive(Debug, Clone)]
pub struct HiveClient {
    url_template: String,
    http: Client,
    credentials: Credentials,
}

impl HiveClient {
    pub fn new(url_template: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        // Certificate verification stays at reqwest's default (enabled).
        let http = Client::builder()
            .user_agent(HeaderValue::from_static(USER_AGENT))
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            url_template: url_template.to_string(),
            http,
            credentials,
        })
    }

    pub fn hive_url(&self, hive: &str) -> String {
        self.url_template.replace("{hive}", hive)
    }

    /// One GET against the hive, no retries. Anything but `200 OK` is an
    /// error, the body of such a response is never handed back as data.
    pub fn fetch(&self, hive: &str) -> Result<HiveResponse, FetchError> {
        let url = self.hive_url(hive);
        debug!(hive, %url, "requesting bulk VLAN dump");

        let transport = |source| FetchError::Transport {
            hive: hive.to_string(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .header("X-Requested-Hive", format!("hive{hive}"))
            .header(ACCEPT, HeaderValue::from_static("text/plain"))
            .send()
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().map_err(transport)?;

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                hive: hive.to_string(),
                status,
                excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        info!(hive, status = status.as_u16(), bytes = body.len(), "fetched VLAN dump");
        Ok(HiveResponse {
            status: status.as_u16(),
            body,
        })
    }
}
