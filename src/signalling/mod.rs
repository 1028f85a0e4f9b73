//! Signalling client: credential fetch and SDP offer/answer exchange.
//!
//! Two single-attempt HTTP calls, no retries. A failed call aborts the
//! session start; a fresh credential is minted per attempt because the
//! secret is consumed by the exchange and expires server-side shortly
//! after issue.

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::config::SessionConfig;
use crate::error::VoicewireError;
use crate::util::timeout::with_timeout;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Short-lived session secret minted by the backend.
///
/// Consumed once by the SDP exchange; never persisted.
#[derive(Clone)]
pub struct Credential {
    secret: String,
}

impl Credential {
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("secret", &"..").finish()
    }
}

#[derive(Debug, Deserialize)]
struct CredentialResponse {
    client_secret: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    value: Option<String>,
}

/// HTTPS signalling for session establishment.
#[derive(Debug, Clone)]
pub struct SignallingClient {
    credential_url: String,
    realtime_url: String,
    model: String,
    timeout: Duration,
}

impl SignallingClient {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            credential_url: config.credential_url.clone(),
            realtime_url: config.realtime_url.clone(),
            model: config.model.clone(),
            timeout: config.http_timeout,
        }
    }

    /// Fetch a session credential from the backend.
    ///
    /// One GET; fails with `Credential` if the response is not OK or lacks
    /// `client_secret.value`.
    pub async fn get_credential(&self) -> Result<Credential, VoicewireError> {
        with_timeout(self.timeout, async {
            let response = shared_client().get(&self.credential_url).send().await?;
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            if !(200..300).contains(&status) {
                return Err(VoicewireError::Credential(format!(
                    "credential endpoint returned status {status}: {body}"
                )));
            }

            let parsed: CredentialResponse = serde_json::from_str(&body).map_err(|_| {
                VoicewireError::Credential("credential response was not JSON".to_string())
            })?;
            let secret = parsed
                .client_secret
                .and_then(|cs| cs.value)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    VoicewireError::Credential(
                        "credential response missing client_secret.value".to_string(),
                    )
                })?;

            Ok(Credential { secret })
        })
        .await
    }

    /// Exchange the local offer for the remote answer.
    ///
    /// One POST of the raw offer SDP with the credential as a bearer token
    /// and the model as a query parameter. The success body is the answer
    /// SDP as plain text; non-OK bodies are surfaced as diagnostics.
    pub async fn exchange_session_description(
        &self,
        offer_sdp: &str,
        credential: &Credential,
    ) -> Result<String, VoicewireError> {
        let url = format!(
            "{}?model={}",
            trim_trailing_slash(&self.realtime_url),
            self.model
        );

        with_timeout(self.timeout, async {
            let response = shared_client()
                .post(&url)
                .header(AUTHORIZATION, format!("Bearer {}", credential.secret()))
                .header(CONTENT_TYPE, "application/sdp")
                .body(offer_sdp.to_string())
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            if !(200..300).contains(&status) {
                return Err(VoicewireError::Signalling {
                    status,
                    message: body,
                });
            }

            Ok(body)
        })
        .await
    }
}

fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}
