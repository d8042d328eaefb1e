use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Response};
use tracing::{info, warn};

use crate::{
    config::Config,
    errors::{constants::API_KEY_HEADER, Result, VoxError},
    tts::{gateway::SynthesisGateway, request::SynthesisRequest},
};

use super::structs::speaker::Speaker;

#[derive(Clone, Debug)]
pub struct VOICEVOX {
    client: Client,
    base_url: String,
    key: String,
    synthesis_timeout: Duration,
    voices_timeout: Duration,
}

impl VOICEVOX {
    pub fn new(
        base_url: String,
        key: String,
        synthesis_timeout: Duration,
        voices_timeout: Duration,
    ) -> Self {
        Self::with_client(Client::new(), base_url, key, synthesis_timeout, voices_timeout)
    }

    pub fn with_client(
        client: Client,
        base_url: String,
        key: String,
        synthesis_timeout: Duration,
        voices_timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            synthesis_timeout,
            voices_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.synthesis_timeout(),
            config.voices_timeout(),
        )
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into `GatewayStatus`, keeping whatever body came back.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Gateway returned an error status");
        Err(VoxError::gateway_status(status.as_u16(), body))
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> VoxError {
    if err.is_timeout() {
        VoxError::gateway_timeout(timeout.as_secs())
    } else {
        VoxError::Http(err)
    }
}

#[async_trait]
impl SynthesisGateway for VOICEVOX {
    #[tracing::instrument(skip_all, fields(speaker = request.speaker, mode = request.mode.as_str()))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes> {
        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(self.endpoint("tts"))
            .header(API_KEY_HEADER, &self.key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(self.synthesis_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.synthesis_timeout))?;

        let audio = Self::check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.synthesis_timeout))?;

        info!(bytes = audio.len(), "Synthesized audio");
        Ok(audio)
    }

    #[tracing::instrument(skip_all)]
    async fn list_voices(&self) -> Result<Vec<Speaker>> {
        let response = self
            .client
            .get(self.endpoint("voices"))
            .header(API_KEY_HEADER, &self.key)
            .timeout(self.voices_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.voices_timeout))?;

        let body = Self::check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| transport_error(e, self.voices_timeout))?;

        Ok(serde_json::from_slice(&body)?)
    }
}
