//! Interactive login.

use console::style;

use voyager_scrape::config::Settings;
use voyager_scrape::session::{Authenticator, BrowserLogin};

use crate::cli::helpers::with_spinner;

pub async fn cmd_login(settings: &Settings) -> anyhow::Result<()> {
    if settings.credentials().is_none() {
        println!(
            "{} No credentials configured; relying on the saved session or a remembered account",
            style("!").yellow()
        );
    }

    let login = BrowserLogin::new(settings.login_options());
    let result = with_spinner("Logging in...", login.authenticate()).await;
    login.close().await;

    let cookies = result?;
    println!(
        "{} Logged in, session saved to {}",
        style("✓").green(),
        settings.cookies_file.display()
    );
    println!("  {} {}", style("csrf-token:").dim(), cookies.csrf_token());
    Ok(())
}
