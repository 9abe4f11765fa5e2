//! Envelope serialization.
//!
//! The codec is handed to the server at build time rather than living in a
//! global, so a host can swap in pretty-printing or its own encoder.

use crate::response::Envelope;

/// Turns an [`Envelope`] into response body bytes.
///
/// Implementations must write `null` values explicitly and must not
/// HTML-escape string contents.
pub trait Codec: Send + Sync + 'static {
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, serde_json::Error>;
}

/// The default [`Codec`], backed by `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Codec for JsonCodec {
    fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, serde_json::Error> {
        if self.pretty {
            serde_json::to_vec_pretty(envelope)
        } else {
            serde_json::to_vec(envelope)
        }
    }
}
