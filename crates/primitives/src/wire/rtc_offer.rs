//! `RtcOffer`: the offerer's session description, encrypted under the
//! recipient's RSA public key, carried alongside the offerer's own RSA
//! public key so the recipient can encrypt its answer in turn.

use crate::id::MemberId;

use super::{
    take, take_u16_be, WireError, ID_LENGTH, MAX_PUB_KEY_LENGTH, MIN_PUB_KEY_LENGTH, SIGN_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcOffer {
    pub to: MemberId,
    pub from: MemberId,
    pub sign: [u8; SIGN_LENGTH],
    pub rsa_pub_key_pem: Vec<u8>,
    pub remote_sd: Vec<u8>,
}

impl RtcOffer {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            2 * ID_LENGTH + SIGN_LENGTH + 2 + self.rsa_pub_key_pem.len() + self.remote_sd.len(),
        );
        buf.extend_from_slice(self.to.as_bytes());
        buf.extend_from_slice(self.from.as_bytes());
        buf.extend_from_slice(&self.sign);
        buf.extend_from_slice(&(self.rsa_pub_key_pem.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.rsa_pub_key_pem);
        buf.extend_from_slice(&self.remote_sd);
        buf
    }

    pub fn unmarshal(bytes: &[u8]) -> Result<Self, WireError> {
        let mut cursor = bytes;

        let to = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;
        let from = MemberId::from_bytes(take(&mut cursor, ID_LENGTH)?)?;

        let mut sign = [0u8; SIGN_LENGTH];
        sign.copy_from_slice(take(&mut cursor, SIGN_LENGTH)?);

        let pub_key_len = take_u16_be(&mut cursor)? as usize;
        if !(MIN_PUB_KEY_LENGTH..=MAX_PUB_KEY_LENGTH).contains(&pub_key_len) {
            return Err(WireError::PubKeyLengthOutOfRange(pub_key_len));
        }
        let rsa_pub_key_pem = take(&mut cursor, pub_key_len)?.to_vec();
        let remote_sd = cursor.to_vec();

        Ok(Self {
            to,
            from,
            sign,
            rsa_pub_key_pem,
            remote_sd,
        })
    }
}
