use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::Result;

use super::{request::SynthesisRequest, voicevox::structs::speaker::Speaker};

/// Backend that turns synthesis requests into audio.
///
/// Implementations enforce their own timeouts and never retry; any non-2xx answer is
/// reported as `VoxError::GatewayStatus`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SynthesisGateway: Send + Sync {
    /// Synthesize the request and return the encoded audio.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes>;

    /// Fetch the catalog of available characters and their styles.
    async fn list_voices(&self) -> Result<Vec<Speaker>>;
}
