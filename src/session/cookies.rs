//! Cookie persistence and API credential extraction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Authenticator, SessionError};

/// Cookie name carrying the session.
pub const SESSION_COOKIE: &str = "li_at";
/// Cookie name carrying the CSRF token.
pub const CSRF_COOKIE: &str = "JSESSIONID";

const CSRF_PREFIX: &str = "ajax:";

/// Cookie as exported by a browser session.
///
/// Accepts both our own format and the camelCase/`key` variants that browser
/// extensions and puppeteer write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserCookie {
    #[serde(alias = "key")]
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "default_cookie_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, alias = "httpOnly")]
    pub http_only: bool,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedCookies {
    cookies: Vec<BrowserCookie>,
    /// Milliseconds since the epoch.
    #[serde(default)]
    timestamp: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CookieFile {
    List(Vec<BrowserCookie>),
    Saved(SavedCookies),
}

/// Load cookies from a JSON file.
///
/// The file is either a bare array of cookies or `{ "cookies": [...], "timestamp": ... }`.
pub fn load_cookies(path: &Path) -> Result<Vec<BrowserCookie>, SessionError> {
    if !path.exists() {
        return Err(SessionError::CookieFileNotFound(path.to_path_buf()));
    }

    debug!("Loading cookies from {:?}", path);
    let content = std::fs::read_to_string(path)?;
    let cookies = match serde_json::from_str(&content)? {
        CookieFile::List(cookies) => cookies,
        CookieFile::Saved(saved) => {
            if let Some(ts) = saved.timestamp {
                debug!("Cookies saved at {}", ts);
            }
            saved.cookies
        }
    };
    Ok(cookies)
}

/// Save cookies to a JSON file, creating parent directories.
pub fn save_cookies(path: &Path, cookies: &[BrowserCookie]) -> Result<(), SessionError> {
    let saved = SavedCookies {
        cookies: cookies.to_vec(),
        timestamp: Some(Utc::now().timestamp_millis()),
    };
    let json = serde_json::to_string_pretty(&saved)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    info!("Saved {} cookies to {:?}", cookies.len(), path);

    Ok(())
}

/// The two cookie values the API needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCookies {
    pub li_at: String,
    /// `JSESSIONID` with quotes and the `ajax:` prefix removed.
    pub jsession_id: String,
}

impl ApiCookies {
    pub fn new(li_at: impl Into<String>, jsession_id: &str) -> Self {
        Self {
            li_at: li_at.into(),
            jsession_id: normalize_jsession_id(jsession_id).to_string(),
        }
    }

    pub fn from_cookies(cookies: &[BrowserCookie]) -> Result<Self, SessionError> {
        let find = |name: &str| cookies.iter().find(|c| c.name == name);

        let jsession = find(CSRF_COOKIE).ok_or(SessionError::MissingCookie(CSRF_COOKIE))?;
        let li_at = find(SESSION_COOKIE).ok_or(SessionError::MissingCookie(SESSION_COOKIE))?;

        let jsession_id = normalize_jsession_id(&jsession.value);
        if jsession_id.is_empty() {
            return Err(SessionError::MissingCookie(CSRF_COOKIE));
        }
        if li_at.value.is_empty() {
            return Err(SessionError::MissingCookie(SESSION_COOKIE));
        }

        Ok(Self {
            li_at: li_at.value.clone(),
            jsession_id: jsession_id.to_string(),
        })
    }

    /// Value of the `cookie` request header.
    pub fn cookie_header(&self) -> String {
        format!(
            "{}={}; {}=\"{}{}\"",
            SESSION_COOKIE, self.li_at, CSRF_COOKIE, CSRF_PREFIX, self.jsession_id
        )
    }

    /// Value of the `csrf-token` request header.
    pub fn csrf_token(&self) -> String {
        format!("{}{}", CSRF_PREFIX, self.jsession_id)
    }
}

fn normalize_jsession_id(value: &str) -> &str {
    let value = value.trim_matches('"');
    value.strip_prefix(CSRF_PREFIX).unwrap_or(value)
}

/// Re-reads the cookie file on every authentication.
///
/// Useful when another process (or a person with a browser) keeps the file fresh.
pub struct CookieFileAuthenticator {
    path: PathBuf,
}

impl CookieFileAuthenticator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Authenticator for CookieFileAuthenticator {
    async fn authenticate(&self) -> Result<ApiCookies, SessionError> {
        let cookies = load_cookies(&self.path)?;
        ApiCookies::from_cookies(&cookies)
    }
}
