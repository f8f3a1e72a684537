//! `Signature`: the ASN.1 DER encoding of an ECDSA (R, S) pair as exchanged
//! in `TestChallenge` payloads. This wrapper doesn't reinterpret the DER
//! bytes; `crypto::ecdsa_keys::verify` is the only place that parses them.

use super::WireError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_der(der: Vec<u8>) -> Self {
        Self(der)
    }

    pub fn as_der(&self) -> &[u8] {
        &self.0
    }

    pub fn marshal(&self) -> Vec<u8> {
        self.0.clone()
    }

    pub fn unmarshal(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.is_empty() {
            return Err(WireError::Truncated);
        }
        Ok(Self(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_then_unmarshal_round_trips() {
        let sig = Signature::from_der(vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]);
        let unmarshaled = Signature::unmarshal(&sig.marshal()).unwrap();
        assert_eq!(sig, unmarshaled);
    }

    #[test]
    fn rejects_empty_bytes() {
        assert!(matches!(
            Signature::unmarshal(&[]),
            Err(WireError::Truncated)
        ));
    }
}
