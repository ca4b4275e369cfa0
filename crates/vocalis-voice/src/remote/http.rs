//! HTTP backend abstraction for the remote voice API.
//!
//! The backend only moves bytes: it attaches the credential header and
//! reports the status code. Mapping statuses to [`VoiceError`] variants is
//! done by the client so that it can be tested against a fake backend.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::config::RemoteApiConfig;
use crate::error::VoiceError;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "xi-api-key";

/// Raw HTTP response.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: Bytes,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP backends the remote client can talk through.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn get(&self, url: &Url) -> Result<HttpReply, VoiceError>;

    /// POST a JSON body, asking for `accept` in return.
    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        accept: &str,
    ) -> Result<HttpReply, VoiceError>;
}

/// Production HTTP backend using reqwest.
///
/// No retries: a failed remote call is reported to the user, who decides
/// whether to try again.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_key: String,
}

impl ReqwestBackend {
    pub fn new(config: &RemoteApiConfig) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| VoiceError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
        })
    }

    async fn into_reply(response: reqwest::Response) -> Result<HttpReply, VoiceError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get(&self, url: &Url) -> Result<HttpReply, VoiceError> {
        let response = self
            .client
            .get(url.as_str())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        Self::into_reply(response).await
    }

    async fn post_json(
        &self,
        url: &Url,
        body: &serde_json::Value,
        accept: &str,
    ) -> Result<HttpReply, VoiceError> {
        let response = self
            .client
            .post(url.as_str())
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, accept)
            .json(body)
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;
        Self::into_reply(response).await
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Canned response for the fake backend.
    #[derive(Clone)]
    pub enum CannedResponse {
        Reply(HttpReply),
        TransportError(String),
    }

    impl CannedResponse {
        pub fn json(status: u16, json: &serde_json::Value) -> Self {
            Self::Reply(HttpReply {
                status,
                body: Bytes::from(json.to_string()),
            })
        }

        pub fn bytes(status: u16, body: &'static [u8]) -> Self {
            Self::Reply(HttpReply {
                status,
                body: Bytes::from_static(body),
            })
        }
    }

    /// A request the fake backend received.
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub body: Option<serde_json::Value>,
        pub accept: Option<String>,
    }

    /// A fake HTTP backend that returns canned responses by URL substring.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Vec<(String, CannedResponse)>,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses.push((url_contains.to_string(), response));
            self
        }

        pub fn requests(&self) -> Arc<Mutex<Vec<RecordedRequest>>> {
            Arc::clone(&self.requests)
        }

        fn respond(&self, request: RecordedRequest) -> Result<HttpReply, VoiceError> {
            let found = self
                .responses
                .iter()
                .find(|(pattern, _)| request.url.contains(pattern.as_str()))
                .map(|(_, response)| response.clone());
            self.requests.lock().unwrap().push(request);

            match found {
                Some(CannedResponse::Reply(reply)) => Ok(reply),
                Some(CannedResponse::TransportError(msg)) => Err(VoiceError::Network(msg)),
                None => Ok(HttpReply {
                    status: 404,
                    body: Bytes::new(),
                }),
            }
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get(&self, url: &Url) -> Result<HttpReply, VoiceError> {
            self.respond(RecordedRequest {
                method: "GET",
                url: url.to_string(),
                body: None,
                accept: None,
            })
        }

        async fn post_json(
            &self,
            url: &Url,
            body: &serde_json::Value,
            accept: &str,
        ) -> Result<HttpReply, VoiceError> {
            self.respond(RecordedRequest {
                method: "POST",
                url: url.to_string(),
                body: Some(body.clone()),
                accept: Some(accept.to_string()),
            })
        }
    }
}
