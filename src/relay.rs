//! The gate in front of the upstream call.
//!
//! A request passes three local checks in a fixed order (shared secret,
//! per-client quota, non-empty question) before anything is sent upstream.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::RelayError;
use crate::rate_limit::{QuotaDecision, QuotaStore};
use crate::upstream::Upstream;

/// Returned when the upstream reply has no answer text.
pub const FALLBACK_ANSWER: &str = "No response from AI";

pub struct Relay {
    auth_token: SecretString,
    quota: Option<Arc<dyn QuotaStore>>,
    upstream: Arc<dyn Upstream>,
}

impl Relay {
    pub fn new(
        auth_token: SecretString,
        quota: Option<Arc<dyn QuotaStore>>,
        upstream: Arc<dyn Upstream>,
    ) -> Self {
        Self {
            auth_token,
            quota,
            upstream,
        }
    }

    fn authorized(&self, auth_header: Option<&str>) -> bool {
        let Some(presented) = auth_header else {
            return false;
        };
        let expected = self.auth_token.expose_secret().as_bytes();
        presented.as_bytes().ct_eq(expected).into()
    }

    pub async fn handle(
        &self,
        question: Option<&str>,
        auth_header: Option<&str>,
        client_identity: &str,
    ) -> Result<String, RelayError> {
        if !self.authorized(auth_header) {
            return Err(RelayError::Unauthorized);
        }

        if let Some(quota) = &self.quota {
            if let QuotaDecision::Rejected { retry_after } = quota.check_and_increment(client_identity) {
                return Err(RelayError::QuotaExceeded { retry_after });
            }
        }

        let question = match question {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(RelayError::MissingQuestion),
        };

        let response = self.upstream.generate(question).await?;

        Ok(match response.answer_text() {
            Some(text) => text.to_string(),
            None => {
                tracing::info!(client = %client_identity, "Upstream reply had no answer text, using fallback");
                FALLBACK_ANSWER.to_string()
            }
        })
    }
}
