//! One-time verification codes delivered through a webhook.
//!
//! When LinkedIn asks to confirm a login, it emails a numeric PIN. An
//! external automation reads that mail and exposes the latest code at a
//! webhook returning `{"output": {"code": 123456}}`.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use super::SessionError;
use crate::graph::path;

/// The code, as a string, from a webhook payload.
pub fn code_from_payload(payload: &Value) -> Option<String> {
    match path::get_present(payload, "output.code")? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Fetch the current verification code from the webhook.
pub async fn fetch_verification_code(
    client: &reqwest::Client,
    webhook: &str,
) -> Result<String, SessionError> {
    debug!("Fetching verification code from webhook");

    let payload: Value = client
        .get(webhook)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    code_from_payload(&payload)
        .ok_or_else(|| SessionError::Verification("webhook response has no output.code".into()))
}

/// Poll the webhook until it returns a code or `attempts` run out.
pub async fn poll_verification_code(
    client: &reqwest::Client,
    webhook: &str,
    attempts: u32,
    interval: Duration,
) -> Result<String, SessionError> {
    let mut last_error = None;
    for attempt in 1..=attempts {
        match fetch_verification_code(client, webhook).await {
            Ok(code) => {
                info!("Got verification code on attempt {}", attempt);
                return Ok(code);
            }
            Err(e) => {
                debug!("Verification code attempt {} failed: {}", attempt, e);
                last_error = Some(e);
            }
        }
        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| SessionError::Verification("no attempts were made".into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_code() {
        assert_eq!(
            code_from_payload(&json!({"output": {"code": 482913}})),
            Some("482913".to_string())
        );
    }

    #[test]
    fn test_string_code_is_trimmed() {
        assert_eq!(
            code_from_payload(&json!({"output": {"code": " 0042 "}})),
            Some("0042".to_string())
        );
    }

    #[test]
    fn test_missing_code() {
        assert_eq!(code_from_payload(&json!({"output": {}})), None);
        assert_eq!(code_from_payload(&json!({"output": {"code": null}})), None);
        assert_eq!(code_from_payload(&json!({"output": {"code": ""}})), None);
    }

    #[tokio::test]
    async fn test_poll_with_no_attempts() {
        let client = reqwest::Client::new();
        let err = poll_verification_code(&client, "http://127.0.0.1:9", 0, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Verification(_)));
    }
}
