//! Deadline-bounded gateway to the external advisory service.
//!
//! The client sends a short prompt derived from the trigger context and
//! the reading's numeric fields, and returns the first candidate text on
//! success. Timeout, transport failure, non-success status, malformed
//! body, and empty candidate lists all degrade to a locally synthesized
//! fallback, so the caller always receives displayable text.
//!
//! # Example
//!
//! ```no_run
//! use riskwatch_core::{AdvisoryClient, AdvisoryProvider, Reading};
//!
//! # async fn example() -> riskwatch_core::Result<()> {
//! let client = AdvisoryClient::new(
//!     "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent",
//!     "my-api-key",
//! )?;
//!
//! let reading = Reading::builder().temperature(26.0).co2(720).aceton(8.0).build();
//! let outcome = client.advise(&reading, "Acetone Surge.").await;
//! println!("{} ({})", outcome.text, outcome.source);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use riskwatch_types::{AdvisoryOutcome, AdvisorySource, Reading};

use crate::error::{Error, Result};
use crate::traits::AdvisoryProvider;

/// Hard deadline for one advisory round trip.
pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_millis(2000);

/// Synthesize the local fallback outcome for a trigger context.
///
/// Used whenever the advisory service cannot produce a live answer; the
/// text is visually indistinguishable from a live response except for its
/// canned wording.
pub fn fallback(context: &str) -> AdvisoryOutcome {
    AdvisoryOutcome {
        text: format!("⚠️ PREDICTION: {context} Risk detected. Check sensors."),
        source: AdvisorySource::Fallback,
    }
}

/// HTTP client for the advisory service.
///
/// Stateless and reentrant; the at-most-one-in-flight guarantee is the
/// caller's responsibility.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    deadline: Duration,
}

impl AdvisoryClient {
    /// Create a client for the given endpoint with the default deadline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the URL does not start with
    /// `http://` or `https://`, or [`Error::AdvisoryTransport`] if the
    /// underlying HTTP client cannot be constructed.
    pub fn new(url: &str, api_key: &str) -> Result<Self> {
        Self::with_deadline(url, api_key, DEFAULT_ADVISORY_TIMEOUT)
    }

    /// Create a client with a custom deadline.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_deadline(url: &str, api_key: &str, deadline: Duration) -> Result<Self> {
        let url = url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::InvalidConfig(format!(
                "advisory URL must start with http:// or https://, got: {url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(deadline)
            .build()
            .map_err(Error::AdvisoryTransport)?;

        Ok(Self {
            client,
            url,
            api_key: api_key.to_string(),
            deadline,
        })
    }

    /// The configured deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Build the prompt sent to the advisory service.
    fn build_prompt(reading: &Reading, context: &str) -> String {
        format!(
            "Act as an Industrial Safety AI.\n\
             Context: {context}\n\
             Readings: Temp {}, Acetone {}, CO2 {}.\n\
             Output ONE specific technical recommendation. Max 20 words.",
            reading.temperature, reading.aceton, reading.co2
        )
    }

    /// One live round trip, without the fallback conversion.
    async fn request_live(&self, reading: &Reading, context: &str) -> Result<String> {
        let prompt = Self::build_prompt(reading, context);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let url = format!("{}?key={}", self.url, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(Error::AdvisoryTransport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AdvisoryStatus {
                status: status.as_u16(),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        parsed.first_text().ok_or(Error::NoCandidates)
    }
}

#[async_trait]
impl AdvisoryProvider for AdvisoryClient {
    async fn advise(&self, reading: &Reading, context: &str) -> AdvisoryOutcome {
        let attempt = tokio::time::timeout(self.deadline, self.request_live(reading, context));
        match attempt.await {
            Ok(Ok(text)) => {
                debug!("Advisory service answered ({} chars)", text.len());
                AdvisoryOutcome {
                    text,
                    source: AdvisorySource::Live,
                }
            }
            Ok(Err(e)) => {
                warn!("Advisory request failed, using fallback: {}", e);
                fallback(context)
            }
            Err(_) => {
                let e = Error::AdvisoryTimeout {
                    deadline: self.deadline,
                };
                warn!("Advisory request failed, using fallback: {}", e);
                fallback(context)
            }
        }
    }
}

/// Advisory provider for deployments without a reachable service.
///
/// Always answers with the local fallback text, immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAdvisor;

#[async_trait]
impl AdvisoryProvider for FallbackAdvisor {
    async fn advise(&self, _reading: &Reading, context: &str) -> AdvisoryOutcome {
        fallback(context)
    }
}

/// Advisory service response shape.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// First non-empty candidate text, if any.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    fn reading() -> Reading {
        Reading::builder()
            .temperature(26.0)
            .humidity(45.0)
            .co2(720)
            .aceton(8.0)
            .build()
    }

    #[test]
    fn fallback_text_contains_context() {
        let outcome = fallback("CO2 Rising.");
        assert_eq!(
            outcome.text,
            "⚠️ PREDICTION: CO2 Rising. Risk detected. Check sensors."
        );
        assert_eq!(outcome.source, AdvisorySource::Fallback);
    }

    #[test]
    fn prompt_carries_numeric_context() {
        let prompt = AdvisoryClient::build_prompt(&reading(), "Acetone Surge.");
        assert!(prompt.contains("Acetone Surge."));
        assert!(prompt.contains("Temp 26"));
        assert!(prompt.contains("CO2 720"));
        assert!(prompt.contains("Max 20 words"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = AdvisoryClient::new("localhost:9000", "key");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client = AdvisoryClient::new("http://localhost:9000/", "key").unwrap();
        assert_eq!(client.url, "http://localhost:9000");
    }

    #[test]
    fn response_parsing_takes_first_candidate() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Ventilate the fume hood."}]}},
                {"content": {"parts": [{"text": "Second candidate."}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.first_text().unwrap(), "Ventilate the fume hood.");
    }

    #[test]
    fn empty_candidate_list_yields_none() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.first_text().is_none());

        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parsed.first_text().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_fallback() {
        // Nothing listens on the loopback discard port; the connection is
        // refused well within the deadline.
        let client =
            AdvisoryClient::with_deadline("http://127.0.0.1:9", "key", Duration::from_millis(500))
                .unwrap();
        let outcome = client.advise(&reading(), "Temp Spike.").await;
        assert_eq!(outcome.source, AdvisorySource::Fallback);
        assert!(outcome.text.contains("Temp Spike."));
        assert!(!outcome.text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_service_hits_the_deadline() {
        // Accept the connection and never answer; the paused clock lets the
        // deadline elapse without waiting in real time.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            // Drain the request without ever responding.
            while let Ok(n) = socket.read(&mut buf).await {
                if n == 0 {
                    break;
                }
            }
        });

        let client = AdvisoryClient::new(&format!("http://{addr}"), "key").unwrap();
        let started = tokio::time::Instant::now();
        let outcome = client.advise(&reading(), "CO2 Rising.").await;

        assert_eq!(outcome.source, AdvisorySource::Fallback);
        assert!(outcome.text.contains("CO2 Rising."));
        assert!(started.elapsed() <= DEFAULT_ADVISORY_TIMEOUT + Duration::from_millis(100));
    }

    #[tokio::test]
    async fn fallback_advisor_is_immediate() {
        let outcome = FallbackAdvisor.advise(&reading(), "Acetone Surge.").await;
        assert_eq!(outcome.source, AdvisorySource::Fallback);
        assert!(outcome.text.contains("Acetone Surge."));
    }
}
