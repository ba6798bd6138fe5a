//! Shared helper functions for CLI commands.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::warn;

use voyager_scrape::client::{Api, VoyagerClient};
use voyager_scrape::config::Settings;
use voyager_scrape::session::{load_cookies, ApiCookies, BrowserLogin, SessionError};

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run a future behind a spinner on stderr.
pub async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_message(message.to_string());

    let output = future.await;
    progress.finish_and_clear();
    output
}

/// Cookies from the configured cookie file, if it holds a usable session.
pub fn saved_api_cookies(settings: &Settings) -> Option<ApiCookies> {
    match load_cookies(&settings.cookies_file) {
        Ok(cookies) => match ApiCookies::from_cookies(&cookies) {
            Ok(api) => Some(api),
            Err(e) => {
                warn!("Saved cookies are unusable: {}", e);
                None
            }
        },
        Err(SessionError::CookieFileNotFound(_)) => None,
        Err(e) => {
            warn!("Could not read {}: {}", settings.cookies_file.display(), e);
            None
        }
    }
}

/// API over the saved session, logging in with the browser when needed.
pub fn build_api(settings: &Settings) -> anyhow::Result<Api> {
    let client = VoyagerClient::new(settings.client_options(), saved_api_cookies(settings))?
        .with_authenticator(Arc::new(BrowserLogin::new(settings.login_options())));
    Ok(Api::new(client).with_max_pages(settings.max_pages))
}
