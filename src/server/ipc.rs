//! Wire protocol definitions for the processing service
//!
//! Requests and responses travel as length-prefixed JSON frames over a
//! Unix socket: a 4-byte little-endian length followed by the JSON body.

use serde::{Deserialize, Serialize};

/// Largest accepted frame. Audio uploads ride inside request frames, so
/// this is far larger than a typical control message.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Request sent from a client to the processing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApiRequest {
    /// Ping to check if the service is alive
    Ping,

    /// Report which models are loaded
    Health,

    /// Load both models on a background task
    PreloadModels,

    /// Transcribe an uploaded audio recording to text
    Transcribe {
        file_name: String,
        audio_base64: String,
    },

    /// Summarize text, honoring optional word-count bounds
    Summarize {
        text: String,
        max_length: Option<usize>,
        min_length: Option<usize>,
    },

    /// Full pipeline: transcribe an uploaded recording, then summarize it
    ProcessMeeting {
        file_name: String,
        audio_base64: String,
    },

    /// Shut down the service
    Shutdown,
}

/// Response sent from the service back to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApiResponse {
    /// Pong response to ping
    Pong,

    /// Acknowledgment (for shutdown, preload, etc.)
    Ok,

    /// Model load state
    Health {
        transcriber_loaded: bool,
        summarizer_ready: bool,
    },

    /// Transcription result
    Transcription {
        text: String,
        language: String,
        duration_seconds: f64,
    },

    /// Summarization result with word counts
    Summary {
        summary: String,
        original_words: usize,
        summary_words: usize,
    },

    /// Full pipeline result
    Meeting {
        meeting_id: String,
        transcription: String,
        summary: String,
        language: String,
        processed_at: String,
    },

    /// Error response
    Error { message: String },
}

/// Serialize a request to bytes for the wire
pub fn serialize_request(request: &ApiRequest) -> Vec<u8> {
    let json = serde_json::to_string(request).expect("Failed to serialize request");
    let len = json.len() as u32;
    let mut bytes = len.to_le_bytes().to_vec();
    bytes.extend(json.as_bytes());
    bytes
}

/// Serialize a response to bytes for the wire
pub fn serialize_response(response: &ApiResponse) -> Vec<u8> {
    let json = serde_json::to_string(response).expect("Failed to serialize response");
    let len = json.len() as u32;
    let mut bytes = len.to_le_bytes().to_vec();
    bytes.extend(json.as_bytes());
    bytes
}

/// Deserialize a request from bytes
pub fn deserialize_request(data: &[u8]) -> Result<ApiRequest, String> {
    serde_json::from_slice(data).map_err(|e| e.to_string())
}

/// Deserialize a response from bytes
pub fn deserialize_response(data: &[u8]) -> Result<ApiResponse, String> {
    serde_json::from_slice(data).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_the_frame() {
        let request = ApiRequest::Summarize {
            text: "Quarterly results were discussed. Revenue is up.".to_string(),
            max_length: Some(100),
            min_length: None,
        };

        let bytes = serialize_request(&request);
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(len, bytes.len() - 4);

        let decoded = deserialize_request(&bytes[4..]).unwrap();
        match decoded {
            ApiRequest::Summarize {
                text, max_length, ..
            } => {
                assert!(text.starts_with("Quarterly"));
                assert_eq!(max_length, Some(100));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn response_round_trips_through_the_frame() {
        let response = ApiResponse::Summary {
            summary: "Revenue is up.".to_string(),
            original_words: 7,
            summary_words: 3,
        };

        let bytes = serialize_response(&response);
        let decoded = deserialize_response(&bytes[4..]).unwrap();
        match decoded {
            ApiResponse::Summary { summary_words, .. } => assert_eq!(summary_words, 3),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn garbage_bytes_fail_to_deserialize() {
        assert!(deserialize_request(b"not json").is_err());
    }
}
