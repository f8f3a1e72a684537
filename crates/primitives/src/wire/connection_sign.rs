//! `ConnectionSign`: an existing member's endorsement of a candidate,
//! carrying the STUN server and RSA public key the candidate should use
//! when it builds its offer.

use crate::id::MemberId;

use super::{
    take, take_u16_be, take_u8, WireError, ID_LENGTH, MAX_PUB_KEY_LENGTH, MAX_STUN_SERVER_LENGTH,
    MIN_PUB_KEY_LENGTH, SIGN_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSign {
    pub to: MemberId,
    pub from: MemberId,
    pub stun_server: String,
    pub rsa_pub_key_pem: Vec<u8>,
    pub sign: [u8; SIGN_LENGTH],
}

impl ConnectionSign {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            2 * ID_LENGTH + 1 + self.stun_server.len() + 2 + self.rsa_pub_key_pem.len() + SIGN_LENGTH,
        );
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.push(self.stun_server.len() as u8);
        buf.extend_from_slice(self.stun_server.as_bytes());
        buf.extend_from_slice(&(self.rsa_pub_key_pem.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.rsa_pub_key_pem);
        buf.extend_from_slice(&self.sign);
        buf
    }

    pub fn unmarshal(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = bytes;

        let to = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;
        let from = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;

        let stun_len = take_u8(&mut cursor)? as usize;
        if stun_len > MAX_STUN_SERVER_LENGTH {
            return Err(WireError::StunServerTooLong(stun_len));
        }
        let stun_server = String::from_utf8_lossy(take(&mut cursor, stun_len)?).into_owned();

        let pub_key_len = take_u16_be(&mut cursor)? as usize;
        if !(MIN_PUB_KEY_LENGTH..=MAX_PUB_KEY_LENGTH).contains(&pub_key_len) {
            return Err(WireError::PubKeyLengthOutOfRange(pub_key_len));
        }
        let rsa_pub_key_pem = take(&mut cursor, pub_key_len)?.to_vec();

        if cursor.len() != SIGN_LENGTH {
            return Err(WireError::TrailingLengthMismatch {
                expected: SIGN_LENGTH,
                actual: cursor.len(),
            });
        }
        let mut sign = [0u8; SIGN_LENGTH];
        sign.copy_from_slice(cursor);

        Ok(Self {
            to,
            from,
            stun_server,
            rsa_pub_key_pem,
            sign,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> MemberId {
        MemberId::new(c.to_string().repeat(ID_LENGTH)).unwrap()
    }

    fn sample() -> ConnectionSign {
        ConnectionSign {
            to: id('A'),
            from: id('B'),
            stun_server: "stun:stun.example.org:19302".to_string(),
            rsa_pub_key_pem: vec![b'K'; MIN_PUB_KEY_LENGTH],
            sign: [7u8; SIGN_LENGTH],
        }
    }

    #[test]
    fn marshal_then_unmarshal_round_trips() {
        let original = sample();
        let unmarshaled = ConnectionSign::unmarshal(&original.marshal()).unwrap();
        assert_eq!(original, unmarshaled);
    }

    #[test]
    fn rejects_stun_server_over_max_length() {
        let mut s = sample();
        s.stun_server = "x".repeat(MAX_STUN_SERVER_LENGTH + 1);
        let bytes = s.marshal();
        assert!(matches!(
            ConnectionSign::unmarshal(&bytes),
            Err(WireError::StunServerTooLong(_))
        ));
    }

    #[test]
    fn rejects_pub_key_length_below_minimum() {
        let mut s = sample();
        s.rsa_pub_key_pem = vec![b'K'; MIN_PUB_KEY_LENGTH - 1];
        let bytes = s.marshal();
        assert!(matches!(
            ConnectionSign::unmarshal(&bytes),
            Err(WireError::PubKeyLengthOutOfRange(_))
        ));
    }

    #[test]
    fn rejects_truncated_sign_field() {
        let s = sample();
        let mut bytes = s.marshal();
        bytes.pop();
        assert!(matches!(
            ConnectionSign::unmarshal(&bytes),
            Err(WireError::TrailingLengthMismatch { .. })
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(matches!(
            ConnectionSign::unmarshal(&[0u8; 10]),
            Err(WireError::Truncated)
        ));
    }
}
