//! Voyager API HTTP client.
//!
//! Replays the session cookies as headers, and when the API answers with an
//! authentication failure (401, 403 or a redirect loop to the login page),
//! asks its [`Authenticator`] for fresh cookies and tries again a bounded
//! number of times.

pub mod api;
pub mod endpoints;
mod user_agent;

pub use api::Api;
pub use user_agent::{resolve_user_agent, session_user_agent, IMPERSONATE_USER_AGENTS, USER_AGENT};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::{redirect, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::parsers::ParseError;
use crate::session::{ApiCookies, Authenticator, SessionError};

pub const VOYAGER_BASE_URL: &str = "https://www.linkedin.com/voyager/api";
pub const NORMALIZED_JSON: &str = "application/vnd.linkedin.normalized+json+2.1";
pub const DEFAULT_ACCEPT_LANGUAGE: &str =
    "pt-BR,pt;q=0.9,fr-FR;q=0.8,fr;q=0.7,en-US;q=0.6,en;q=0.5";

const CSRF_TOKEN_HEADER: &str = "csrf-token";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { status: u16, url: String },

    #[error("Not authenticated and no way to log in")]
    NotAuthenticated,

    #[error("Authentication failed after {0} attempts")]
    AuthExhausted(u32),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    /// None, "impersonate" or a custom string (see [`resolve_user_agent`]).
    pub user_agent: Option<String>,
    pub accept_language: String,
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Re-authentications allowed per request.
    pub max_auth_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: VOYAGER_BASE_URL.to_string(),
            user_agent: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(10),
            max_redirects: 3,
            max_auth_retries: 2,
        }
    }
}

impl ClientOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.api_base_url.clone(),
            user_agent: settings.user_agent.clone(),
            accept_language: settings.accept_language.clone(),
            timeout: Duration::from_secs(settings.request_timeout),
            max_redirects: settings.max_redirects,
            max_auth_retries: settings.max_auth_retries,
        }
    }
}

/// Authenticated JSON client for the Voyager API.
pub struct VoyagerClient {
    http: Client,
    options: ClientOptions,
    cookies: RwLock<Option<ApiCookies>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl VoyagerClient {
    /// Create a client. Without cookies, the first request authenticates.
    pub fn new(options: ClientOptions, cookies: Option<ApiCookies>) -> Result<Self, ClientError> {
        let user_agent = resolve_user_agent(
            options.user_agent.as_deref(),
            cookies.as_ref().map(|c| c.li_at.as_str()),
        );
        let http = Client::builder()
            .user_agent(&user_agent)
            .timeout(options.timeout)
            .redirect(redirect::Policy::limited(options.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            http,
            options,
            cookies: RwLock::new(cookies),
            authenticator: None,
        })
    }

    /// Set the authenticator used when the API rejects the session.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.options.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn request(&self, url: &str, cookies: &ApiCookies) -> RequestBuilder {
        self.http
            .get(url)
            .header(ACCEPT, NORMALIZED_JSON)
            .header(ACCEPT_LANGUAGE, &self.options.accept_language)
            .header(COOKIE, cookies.cookie_header())
            .header(CSRF_TOKEN_HEADER, cookies.csrf_token())
    }

    async fn reauthenticate(&self, attempts: &mut u32) -> Result<(), ClientError> {
        let authenticator = self
            .authenticator
            .as_ref()
            .ok_or(ClientError::NotAuthenticated)?;
        if *attempts >= self.options.max_auth_retries {
            return Err(ClientError::AuthExhausted(*attempts));
        }
        *attempts += 1;

        info!(
            "Authenticating (attempt {}/{})",
            attempts, self.options.max_auth_retries
        );
        let cookies = authenticator.authenticate().await?;
        *self.cookies.write().await = Some(cookies);
        Ok(())
    }

    /// GET an endpoint and decode the JSON body.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value, ClientError> {
        let url = self.url(endpoint);
        let mut attempts = 0;

        loop {
            let current = self.cookies.read().await.clone();
            let Some(cookies) = current else {
                self.reauthenticate(&mut attempts).await?;
                continue;
            };

            debug!("GET {}", url);
            match self.request(&url, &cookies).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        warn!("Session rejected with {} for {}", status.as_u16(), url);
                    } else if !status.is_success() {
                        return Err(ClientError::Status {
                            status: status.as_u16(),
                            url,
                        });
                    } else {
                        return Ok(response.json().await?);
                    }
                }
                Err(e) if e.is_redirect() => {
                    warn!("Too many redirects for {}", url);
                }
                Err(e) => return Err(e.into()),
            }

            self.reauthenticate(&mut attempts).await?;
        }
    }
}
