//! `RtcAnswer`: the answerer's session description, encrypted under the
//! offerer's RSA public key.

use crate::id::MemberId;

use super::{take, WireError, ID_LENGTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcAnswer {
    pub to: MemberId,
    pub from: MemberId,
    pub remote_sd: Vec<u8>,
}

impl RtcAnswer {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 * ID_LENGTH + self.remote_sd.len());
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(&self.remote_sd);
        buf
    }

    pub fn unmarshal(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = bytes;
        let to = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;
        let from = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;
        let remote_sd = cursor.to_vec();
        Ok(Self { to, from, remote_sd })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(ID_LENGTH)).unwrap()
    }

    #[test]
    fn marshal_then_unmarshal_round_trips() {
        let original = RtcAnswer {
            to: id('A'),
            from: id('B'),
            remote_sd: br#"{"type":"answer","sdp":"v=0..."}"#.to_vec(),
        };
        let unmarshaled = RtcAnswer::unmarshal(&original.marshal()).unwrap();
        assert_eq!(original, unmarshaled);
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(matches!(
            RtcAnswer::unmarshal(&[0u8; ID_LENGTH]),
            Err(WireError::Truncated)
        ));
    }
}
