//! LinkedIn session handling.
//!
//! The Voyager API authenticates with two browser cookies: `li_at` (the
//! session) and `JSESSIONID` (replayed as the CSRF token). This module loads
//! and saves those cookies, and re-creates them through a browser login when
//! the API starts refusing them.

pub mod config;
pub mod cookies;
pub mod login;
pub mod verification;

pub use config::LoginBrowserConfig;
pub use cookies::{
    load_cookies, save_cookies, ApiCookies, BrowserCookie, CookieFileAuthenticator,
};
pub use login::{BrowserLogin, Credentials, LoginOptions};
pub use verification::fetch_verification_code;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing cookie: {0}")]
    MissingCookie(&'static str),

    #[error("Cookie file not found: {0}")]
    CookieFileNotFound(PathBuf),

    #[error("Invalid cookie file: {0}")]
    InvalidCookieFile(#[from] serde_json::Error),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Verification code unavailable: {0}")]
    Verification(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can produce fresh API cookies.
///
/// The client calls this when a request is rejected as unauthenticated and
/// replays the request with whatever comes back.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<ApiCookies, SessionError>;
}
