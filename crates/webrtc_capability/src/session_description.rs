//! The JSON shape an SDP takes on the wire: `{"type": "...", "sdp": "..."}`.
//! Encrypted under the recipient's RSA public key before being placed in an
//! `RtcOffer`/`RtcAnswer` payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: String,
    pub sdp: String,
}

impl SessionDescription {
    pub fn to_json_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("SessionDescription always serializes")
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips() {
        let sd = SessionDescription {
            sdp_type: "offer".to_string(),
            sdp: "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\n".to_string(),
        };
        let bytes = sd.to_json_bytes();
        assert_eq!(SessionDescription::from_json_bytes(&bytes).unwrap(), sd);
    }

    #[test]
    fn type_field_is_serialized_without_renaming_collision() {
        let sd = SessionDescription {
            sdp_type: "answer".to_string(),
            sdp: "v=0".to_string(),
        };
        let json = String::from_utf8(sd.to_json_bytes()).unwrap();
        assert!(json.contains("\"type\":\"answer\""));
    }
}
