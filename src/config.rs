//! Configuration management for voyager-scrape using the prefer crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::{ClientOptions, DEFAULT_ACCEPT_LANGUAGE, VOYAGER_BASE_URL};
use crate::client::api::DEFAULT_MAX_PAGES;
use crate::session::{Credentials, LoginBrowserConfig, LoginOptions};

/// Default cookie file name inside the data directory.
pub const DEFAULT_COOKIES_FILENAME: &str = "linkedin_cookies.json";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Saved session cookies.
    pub cookies_file: PathBuf,
    /// Voyager API base URL.
    pub api_base_url: String,
    /// User agent: None, "impersonate" or a custom string.
    pub user_agent: Option<String>,
    /// Accept-Language header sent with every request.
    pub accept_language: String,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Redirects followed before a request counts as an auth failure.
    pub max_redirects: usize,
    /// Re-authentications allowed per request.
    pub max_auth_retries: u32,
    /// Cap on pages fetched by paginated commands.
    pub max_pages: u32,
    /// Login email.
    pub email: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Webhook returning the emailed verification PIN.
    pub verification_webhook: Option<String>,
    /// Browser used for logging in.
    pub browser: LoginBrowserConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // ~/.local/share/voyager, falling back to the home dir, then CWD
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voyager");

        Self {
            cookies_file: data_dir.join(DEFAULT_COOKIES_FILENAME),
            data_dir,
            api_base_url: VOYAGER_BASE_URL.to_string(),
            user_agent: None,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            request_timeout: 10,
            max_redirects: 3,
            max_auth_retries: 2,
            max_pages: DEFAULT_MAX_PAGES,
            email: None,
            password: None,
            verification_webhook: None,
            browser: LoginBrowserConfig::default(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            cookies_file: data_dir.join(DEFAULT_COOKIES_FILENAME),
            data_dir,
            ..Default::default()
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::from_settings(self)
    }

    /// Credentials, when both email and password are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn login_options(&self) -> LoginOptions {
        LoginOptions {
            cookies_file: self.cookies_file.clone(),
            credentials: self.credentials(),
            verification_webhook: self.verification_webhook.clone(),
            browser: self.browser.clone(),
        }
    }

    /// Apply `VOYAGER_*` and `LINKEDIN_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = env_var("VOYAGER_COOKIES_FILE") {
            tracing::debug!("Using VOYAGER_COOKIES_FILE from environment: {}", path);
            self.cookies_file = PathBuf::from(shellexpand::tilde(&path).as_ref());
        }
        if let Some(email) = env_var("LINKEDIN_EMAIL") {
            self.email = Some(email);
        }
        if let Some(password) = env_var("LINKEDIN_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(webhook) = env_var("VOYAGER_VERIFICATION_WEBHOOK") {
            self.verification_webhook = Some(webhook);
        }
        if let Some(remote) = env_var("VOYAGER_BROWSER_URL") {
            self.browser.remote_url = Some(remote);
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Cookie file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_file: Option<String>,
    /// API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Accept-Language header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_language: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Redirect limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<usize>,
    /// Re-authentications per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_auth_retries: Option<u32>,
    /// Page cap for paginated commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Verification webhook URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_webhook: Option<String>,
    /// Run the login browser headless.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
    /// Proxy for the login browser.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Remote Chrome DevTools URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_url: Option<String>,
    /// Extra Chrome arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[prefer(default)]
    pub chrome_args: Vec<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers voyager config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("voyager").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.cookies_file = settings.data_dir.join(DEFAULT_COOKIES_FILENAME);
        }
        if let Some(ref cookies_file) = self.cookies_file {
            settings.cookies_file = self.resolve_path(cookies_file, base_dir);
        }
        if let Some(ref url) = self.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(ref language) = self.accept_language {
            settings.accept_language = language.clone();
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(redirects) = self.max_redirects {
            settings.max_redirects = redirects;
        }
        if let Some(retries) = self.max_auth_retries {
            settings.max_auth_retries = retries;
        }
        if let Some(pages) = self.max_pages {
            settings.max_pages = pages;
        }
        if let Some(ref email) = self.email {
            settings.email = Some(email.clone());
        }
        if let Some(ref webhook) = self.verification_webhook {
            settings.verification_webhook = Some(webhook.clone());
        }
        if let Some(headless) = self.headless {
            settings.browser.headless = headless;
        }
        if let Some(ref proxy) = self.proxy {
            settings.browser.proxy = Some(proxy.clone());
        }
        if let Some(ref url) = self.browser_url {
            settings.browser.remote_url = Some(url.clone());
        }
        if !self.chrome_args.is_empty() {
            settings.browser.chrome_args = self.chrome_args.clone();
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
}

/// Load config from the explicit path or by discovery.
async fn load_file_config(options: &LoadOptions) -> Config {
    if let Some(ref config_path) = options.config_path {
        return match Config::load_from_path(config_path).await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Config::default()
            }
        };
    }

    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let config = load_file_config(&options).await;

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // Environment takes precedence over the file
    settings.apply_env_overrides();

    (settings, config)
}
