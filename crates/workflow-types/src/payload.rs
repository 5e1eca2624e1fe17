use serde::{Deserialize, Serialize};

/// Codec used to encode/decode payload bytes crossing the host boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Codec {
    Json,
    Cbor,
}

/// Opaque bytes with an associated codec.
///
/// Activity/child-workflow inputs, signal bodies, and query results are all
/// carried as `Payload` rather than as typed Rust values: the core never
/// interprets workflow data, it only ferries it between the host and the
/// dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub codec: Codec,
}

impl Payload {
    pub fn new(bytes: Vec<u8>, codec: Codec) -> Self {
        Self { bytes, codec }
    }

    pub fn json(value: &impl Serialize) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::to_vec(value)?, Codec::Json))
    }
}
