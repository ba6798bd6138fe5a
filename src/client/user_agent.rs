//! User agent selection.
//!
//! Session cookies are minted by desktop Chrome during login, so every
//! agent here is a desktop Chrome string. A session keeps one agent for its
//! whole lifetime: the pick in impersonate mode is keyed on the session
//! cookie, not on the clock.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Config value selecting a per-session agent from [`IMPERSONATE_USER_AGENTS`].
pub const IMPERSONATE: &str = "impersonate";

pub const IMPERSONATE_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

fn pick(seed: u64) -> &'static str {
    IMPERSONATE_USER_AGENTS[(seed % IMPERSONATE_USER_AGENTS.len() as u64) as usize]
}

/// Agent for a session, stable for the same `li_at` value.
pub fn session_user_agent(session_key: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    session_key.hash(&mut hasher);
    pick(hasher.finish())
}

/// Resolve the configured user agent.
///
/// `None` gives [`USER_AGENT`]. `"impersonate"` picks from the Chrome pool,
/// keyed on `session_key` when there is one. Anything else is sent verbatim.
pub fn resolve_user_agent(config: Option<&str>, session_key: Option<&str>) -> String {
    match (config, session_key) {
        (None, _) => USER_AGENT.to_string(),
        (Some(IMPERSONATE), Some(key)) => session_user_agent(key).to_string(),
        (Some(IMPERSONATE), None) => {
            let nanos = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            pick(nanos).to_string()
        }
        (Some(custom), _) => custom.to_string(),
    }
}
