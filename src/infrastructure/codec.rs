//! # Track Codec
//!
//! Portable string form of a `Track`: a versioned JSON payload in URL-safe base64.

use crate::domain::traits::TrackCodec;
use crate::domain::types::Track;
use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

const FORMAT_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    v: u8,
    track: Track,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Base64TrackCodec;

impl TrackCodec for Base64TrackCodec {
    fn encode(&self, track: &Track) -> Result<String> {
        let payload = serde_json::to_vec(&Envelope {
            v: FORMAT_VERSION,
            track: track.clone(),
        })
        .context("Failed to serialize track")?;
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    fn decode(&self, input: &str) -> Result<Track> {
        let bytes = URL_SAFE_NO_PAD
            .decode(input.trim())
            .context("Track string is not valid base64")?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).context("Track payload is malformed")?;
        if envelope.v != FORMAT_VERSION {
            bail!("Unsupported track format version {}", envelope.v);
        }
        Ok(envelope.track)
    }
}
