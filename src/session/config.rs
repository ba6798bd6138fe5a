//! Browser settings for the interactive login.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the login browser is started and how long it waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginBrowserConfig {
    /// Off to watch the login or solve a challenge by hand.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// e.g. "socks5://127.0.0.1:1080"
    #[serde(default)]
    pub proxy: Option<String>,

    /// Per-navigation timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// DevTools URL of an already running Chrome (e.g. "ws://localhost:9222").
    /// Takes precedence over launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Webhook polls before giving up on the emailed PIN.
    #[serde(default = "default_verification_attempts")]
    pub verification_attempts: u32,

    /// Seconds between webhook polls.
    #[serde(default = "default_verification_interval")]
    pub verification_interval: u64,
}

impl Default for LoginBrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            proxy: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
            remote_url: None,
            verification_attempts: default_verification_attempts(),
            verification_interval: default_verification_interval(),
        }
    }
}

impl LoginBrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn verification_interval(&self) -> Duration {
        Duration::from_secs(self.verification_interval)
    }
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_verification_attempts() -> u32 {
    10
}

fn default_verification_interval() -> u64 {
    6
}
