//! IPC client for communicating with the processing service

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::config::Settings;
use crate::server::ipc::{
    deserialize_response, serialize_request, ApiRequest, ApiResponse, MAX_FRAME_LEN,
};

/// Client for communicating with the service
pub struct ServiceClient {
    stream: UnixStream,
}

impl ServiceClient {
    /// Connect to the service
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let socket_path = settings.socket_path();

        let stream = UnixStream::connect(&socket_path).await.with_context(|| {
            format!(
                "Failed to connect to service at {:?}. Is the daemon running? Try: recap daemon start",
                socket_path
            )
        })?;

        Ok(Self { stream })
    }

    /// Send a request and wait for the response
    pub async fn send(&mut self, request: ApiRequest) -> Result<ApiResponse> {
        let stream = &mut self.stream;

        // Serialize and send request
        let bytes = serialize_request(&request);
        stream.write_all(&bytes).await?;

        // Read response length
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf) as usize;

        if len > MAX_FRAME_LEN {
            anyhow::bail!("Response frame too large: {} bytes", len);
        }

        // Read response body
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;

        // Deserialize response
        let response = deserialize_response(&body)
            .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;

        Ok(response)
    }
}
