//! Interactive browser login.
//!
//! Drives a real Chrome through the LinkedIn login form with chromiumoxide,
//! answers the email PIN challenge from a webhook when one is configured, and
//! saves the resulting session cookies.

use std::path::PathBuf;

use url::Url;

use super::config::LoginBrowserConfig;

pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub const FEED_URL: &str = "https://www.linkedin.com/feed/";
pub const HOME_URL: &str = "https://www.linkedin.com/";

/// Page text shown when LinkedIn wants the emailed PIN.
pub const PROTECT_ACCOUNT_PHRASES: &[&str] = &["Proteja sua conta", "Protect your account"];

const STEALTH_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const USERNAME_SELECTOR: &str = "#username";
const PASSWORD_SELECTOR: &str = "#password";
const SUBMIT_SELECTOR: &str = "button[type=\"submit\"]";
const QUICK_LOGIN_SELECTOR: &str = ".member-profile-block";

const VERIFICATION_INPUT_SELECTORS: &[&str] = &[
    "input[name=\"pin\"]",
    "#input__email_verification_pin",
    "input[name=\"verificationCode\"]",
    "input[name=\"otp\"]",
    "input[type=\"tel\"]",
    "input[inputmode=\"numeric\"]",
];

const VERIFICATION_SUBMIT_SELECTORS: &[&str] = &[
    "button[type=\"submit\"]",
    "button[aria-label*=\"Verificar\"]",
    "button[aria-label*=\"Verify\"]",
];

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Everything the login flow needs.
#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub cookies_file: PathBuf,
    pub credentials: Option<Credentials>,
    /// Webhook answering with the emailed verification PIN.
    pub verification_webhook: Option<String>,
    pub browser: LoginBrowserConfig,
}

/// Whether a page URL means the session is authenticated.
pub fn is_logged_in_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !parsed.host_str().is_some_and(|host| host.ends_with("linkedin.com")) {
        return false;
    }
    let path = parsed.path();
    path == "/" || path.starts_with("/feed") || path.starts_with("/in/")
}

/// Whether page content is the account protection (PIN) challenge.
pub fn needs_verification(content: &str) -> bool {
    PROTECT_ACCOUNT_PHRASES
        .iter()
        .any(|phrase| content.contains(phrase))
}

#[cfg(feature = "browser")]
mod imp {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chromiumoxide::cdp::browser_protocol::network::{
        CookieParam, GetCookiesParams, SetUserAgentOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use tokio::sync::Mutex;
    use tracing::{debug, info, warn};

    use super::*;
    use crate::session::cookies::{load_cookies, save_cookies, ApiCookies, BrowserCookie};
    use crate::session::verification::poll_verification_code;
    use crate::session::{Authenticator, SessionError};

    /// LinkedIn keeps setting cookies for a moment after the redirect.
    const SETTLE_DELAY: Duration = Duration::from_secs(3);

    fn browser_error(e: impl std::fmt::Display) -> SessionError {
        SessionError::Browser(e.to_string())
    }

    /// Logs in with a real browser and returns fresh API cookies.
    pub struct BrowserLogin {
        options: LoginOptions,
        browser: Mutex<Option<Arc<Browser>>>,
        http: reqwest::Client,
    }

    impl BrowserLogin {
        /// Common Chrome executable paths to check.
        const CHROME_PATHS: &'static [&'static str] = &[
            // Linux
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            // macOS
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/google/chrome/google-chrome",
        ];

        pub fn new(options: LoginOptions) -> Self {
            Self {
                options,
                browser: Mutex::new(None),
                http: reqwest::Client::new(),
            }
        }

        fn find_chrome() -> Result<PathBuf, SessionError> {
            for path in Self::CHROME_PATHS {
                let p = std::path::Path::new(path);
                if p.exists() {
                    info!("Found Chrome at: {}", path);
                    return Ok(p.to_path_buf());
                }
            }

            for cmd in &[
                "google-chrome",
                "google-chrome-stable",
                "chromium",
                "chromium-browser",
            ] {
                if let Ok(path) = which::which(cmd) {
                    info!("Found Chrome in PATH: {}", path.display());
                    return Ok(path);
                }
            }

            Err(SessionError::Browser(
                "Chrome/Chromium not found. Install chromium or google-chrome".into(),
            ))
        }

        async fn browser(&self) -> Result<Arc<Browser>, SessionError> {
            let mut slot = self.browser.lock().await;
            if let Some(browser) = slot.as_ref() {
                return Ok(browser.clone());
            }

            let config = &self.options.browser;
            let (browser, mut handler) = if let Some(remote_url) = &config.remote_url {
                info!("Connecting to remote browser at {}", remote_url);
                Browser::connect(remote_url.clone())
                    .await
                    .map_err(browser_error)?
            } else {
                info!("Launching browser (headless={})", config.headless);
                let mut builder = BrowserConfig::builder()
                    .chrome_executable(Self::find_chrome()?)
                    .window_size(1366, 768);

                if !config.headless {
                    builder = builder.with_head();
                }
                if let Some(proxy) = &config.proxy {
                    builder = builder.arg(format!("--proxy-server={}", proxy));
                }

                builder = builder
                    .arg("--disable-blink-features=AutomationControlled")
                    .arg("--disable-infobars")
                    .arg("--disable-dev-shm-usage")
                    .arg("--no-first-run")
                    .arg("--no-default-browser-check")
                    .arg("--no-sandbox")
                    .arg("--window-size=1366,768");

                for arg in &config.chrome_args {
                    builder = builder.arg(arg);
                }

                let browser_config = builder.build().map_err(SessionError::Browser)?;
                Browser::launch(browser_config)
                    .await
                    .map_err(browser_error)?
            };

            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let browser = Arc::new(browser);
            *slot = Some(browser.clone());
            Ok(browser)
        }

        async fn navigate(&self, page: &Page, url: &str) -> Result<(), SessionError> {
            info!("Navigating to {}", url);
            let params = NavigateParams::builder()
                .url(url)
                .build()
                .map_err(SessionError::Browser)?;

            let timeout = self.options.browser.navigation_timeout();
            match tokio::time::timeout(timeout, page.execute(params)).await {
                Ok(result) => {
                    result.map_err(browser_error)?;
                }
                Err(_) => warn!("Timeout navigating to {}", url),
            }
            if let Err(e) = page.wait_for_navigation().await {
                debug!("Navigation wait ended early: {}", e);
            }
            Ok(())
        }

        async fn current_url(page: &Page) -> Result<String, SessionError> {
            Ok(page.url().await.map_err(browser_error)?.unwrap_or_default())
        }

        async fn restore_cookies(&self, page: &Page) -> Result<(), SessionError> {
            let path = &self.options.cookies_file;
            if !path.exists() {
                return Ok(());
            }

            for cookie in load_cookies(path)? {
                if cookie.name.is_empty() || cookie.domain.is_empty() {
                    continue;
                }
                let param = CookieParam::builder()
                    .name(cookie.name.as_str())
                    .value(cookie.value.as_str())
                    .domain(cookie.domain.as_str())
                    .path(cookie.path.as_str())
                    .build();
                match param {
                    Ok(param) => {
                        if let Err(e) = page.set_cookie(param).await {
                            warn!("Failed to set cookie {}: {}", cookie.name, e);
                        }
                    }
                    Err(e) => warn!("Failed to build cookie {}: {}", cookie.name, e),
                }
            }
            Ok(())
        }

        async fn submit_credentials(&self, page: &Page) -> Result<(), SessionError> {
            if let Ok(block) = page.find_element(QUICK_LOGIN_SELECTOR).await {
                info!("Using remembered account");
                block.click().await.map_err(browser_error)?;
                return Ok(());
            }

            let credentials = self.options.credentials.as_ref().ok_or_else(|| {
                SessionError::LoginFailed("no saved session and no credentials configured".into())
            })?;

            let username = page
                .find_element(USERNAME_SELECTOR)
                .await
                .map_err(browser_error)?;
            username
                .click()
                .await
                .map_err(browser_error)?
                .type_str(&credentials.email)
                .await
                .map_err(browser_error)?;

            let password = page
                .find_element(PASSWORD_SELECTOR)
                .await
                .map_err(browser_error)?;
            password
                .click()
                .await
                .map_err(browser_error)?
                .type_str(&credentials.password)
                .await
                .map_err(browser_error)?;

            page.find_element(SUBMIT_SELECTOR)
                .await
                .map_err(browser_error)?
                .click()
                .await
                .map_err(browser_error)?;
            Ok(())
        }

        async fn answer_verification(&self, page: &Page) -> Result<(), SessionError> {
            let webhook = self.options.verification_webhook.as_deref().ok_or_else(|| {
                SessionError::Verification("no verification webhook configured".into())
            })?;

            info!("Verification required, waiting for code");
            let code = poll_verification_code(
                &self.http,
                webhook,
                self.options.browser.verification_attempts,
                self.options.browser.verification_interval(),
            )
            .await?;

            let mut input = None;
            for selector in VERIFICATION_INPUT_SELECTORS {
                if let Ok(element) = page.find_element(*selector).await {
                    debug!("Verification input: {}", selector);
                    input = Some(element);
                    break;
                }
            }
            let input = input.ok_or_else(|| {
                SessionError::Verification("verification input not found".into())
            })?;
            input
                .click()
                .await
                .map_err(browser_error)?
                .type_str(&code)
                .await
                .map_err(browser_error)?;

            for selector in VERIFICATION_SUBMIT_SELECTORS {
                if let Ok(button) = page.find_element(*selector).await {
                    button.click().await.map_err(browser_error)?;
                    return Ok(());
                }
            }
            input.press_key("Enter").await.map_err(browser_error)?;
            Ok(())
        }

        async fn collect_cookies(page: &Page) -> Result<Vec<BrowserCookie>, SessionError> {
            let params = GetCookiesParams::builder()
                .urls(vec![HOME_URL.to_string()])
                .build();
            let cookies = match page.execute(params).await {
                Ok(result) => result.result.cookies,
                Err(e) => {
                    warn!("Failed to get cookies via CDP: {}, trying page.get_cookies()", e);
                    page.get_cookies().await.unwrap_or_default()
                }
            };
            debug!("Got {} cookies from browser", cookies.len());

            Ok(cookies
                .iter()
                .map(|c| BrowserCookie {
                    name: c.name.clone(),
                    value: c.value.clone(),
                    domain: c.domain.clone(),
                    path: c.path.clone(),
                    secure: c.secure,
                    http_only: c.http_only,
                })
                .collect())
        }

        /// Run the whole flow on one page.
        async fn login(&self, page: &Page) -> Result<Vec<BrowserCookie>, SessionError> {
            page.execute(SetUserAgentOverrideParams::new(STEALTH_USER_AGENT.to_string()))
                .await
                .map_err(browser_error)?;

            self.restore_cookies(page).await?;
            self.navigate(page, FEED_URL).await?;

            if is_logged_in_url(&Self::current_url(page).await?) {
                info!("Saved session is still valid");
            } else {
                self.navigate(page, LOGIN_URL).await?;
                self.submit_credentials(page).await?;
                if let Err(e) = page.wait_for_navigation().await {
                    debug!("Navigation wait ended early: {}", e);
                }

                let content = page.content().await.map_err(browser_error)?;
                if needs_verification(&content) {
                    self.answer_verification(page).await?;
                    if let Err(e) = page.wait_for_navigation().await {
                        debug!("Navigation wait ended early: {}", e);
                    }
                }

                let url = Self::current_url(page).await?;
                if !is_logged_in_url(&url) {
                    return Err(SessionError::LoginFailed(format!(
                        "still not logged in, ended on {}",
                        url
                    )));
                }
                info!("Logged in");
            }

            tokio::time::sleep(SETTLE_DELAY).await;
            Self::collect_cookies(page).await
        }

        /// Close the browser.
        pub async fn close(&self) {
            *self.browser.lock().await = None;
        }
    }

    #[async_trait]
    impl Authenticator for BrowserLogin {
        async fn authenticate(&self) -> Result<ApiCookies, SessionError> {
            let browser = self.browser().await?;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(browser_error)?;

            let result = self.login(&page).await;
            let _ = page.close().await;

            let cookies = result?;
            save_cookies(&self.options.cookies_file, &cookies)?;
            ApiCookies::from_cookies(&cookies)
        }
    }
}

#[cfg(not(feature = "browser"))]
mod imp {
    use async_trait::async_trait;

    use super::LoginOptions;
    use crate::session::{ApiCookies, Authenticator, SessionError};

    /// Stub used when the crate is built without browser support.
    pub struct BrowserLogin {
        #[allow(dead_code)]
        options: LoginOptions,
    }

    impl BrowserLogin {
        pub fn new(options: LoginOptions) -> Self {
            Self { options }
        }

        pub async fn close(&self) {}
    }

    #[async_trait]
    impl Authenticator for BrowserLogin {
        async fn authenticate(&self) -> Result<ApiCookies, SessionError> {
            Err(SessionError::Browser(
                "Browser support not compiled. Rebuild with: cargo build --features browser"
                    .into(),
            ))
        }
    }
}

pub use imp::BrowserLogin;
