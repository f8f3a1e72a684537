//! The wire-level signal envelope: [`SignalType`], [`NetworkSignal`] and
//! [`IncomeSignal`]. Payload bytes are interpreted by the handler for the
//! given type; this module only knows the type tag and the envelope shape.

use crate::id::MemberId;
use crate::wire::WireError;

/// The closed set of signal kinds the protocol exchanges, encoded as a
/// single unsigned byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalType {
    DoVerify,
    ProvidePubKey,
    PubKeyProvided,
    SolveChallenge,
    TestChallenge,
    NewConnection,
    GenerateConnectionSign,
    SendConnectionSign,
    MakeOffer,
    SendOffer,
    HandleOffer,
    SendAnswer,
    HandleAnswer,
    ConnectionEstablished,
    Ping,
    Pong,
    DisconnectCandidate,
}

impl SignalType {
    /// All variants in wire-byte order. Index into this array is the byte
    /// value; keep new variants appended at the end so existing peers never
    /// see a tag shift.
    const ALL: [SignalType; 17] = [
        SignalType::DoVerify,
        SignalType::ProvidePubKey,
        SignalType::PubKeyProvided,
        SignalType::SolveChallenge,
        SignalType::TestChallenge,
        SignalType::NewConnection,
        SignalType::GenerateConnectionSign,
        SignalType::SendConnectionSign,
        SignalType::MakeOffer,
        SignalType::SendOffer,
        SignalType::HandleOffer,
        SignalType::SendAnswer,
        SignalType::HandleAnswer,
        SignalType::ConnectionEstablished,
        SignalType::Ping,
        SignalType::Pong,
        SignalType::DisconnectCandidate,
    ];

    pub fn to_byte(self) -> u8 {
        Self::ALL.iter().position(|&t| t == self).expect("exhaustive") as u8
    }

    pub fn from_byte(byte: u8) -> Result<Self, WireError> {
        Self::ALL
            .get(byte as usize)
            .copied()
            .ok_or(WireError::UnknownSignalType(byte))
    }
}

/// A signal as it travels the wire: a type tag plus an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSignal {
    pub signal_type: SignalType,
    pub payload: Vec<u8>,
}

impl NetworkSignal {
    pub fn new(signal_type: SignalType, payload: Vec<u8>) -> Self {
        Self {
            signal_type,
            payload,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.payload.len());
        buf.push(self.signal_type.to_byte());
        buf.extend_from_slice(&self.payload);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let (&tag, payload) = bytes.split_first().ok_or(WireError::Truncated)?;
        Ok(Self {
            signal_type: SignalType::from_byte(tag)?,
            payload: payload.to_vec(),
        })
    }
}

/// A [`NetworkSignal`] tagged with the id of the peer it arrived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeSignal {
    pub from: MemberId,
    pub signal: NetworkSignal,
}

impl IncomeSignal {
    pub fn new(from: MemberId, signal: NetworkSignal) -> Self {
        Self { from, signal }
    }

    pub fn signal_type(&self) -> SignalType {
        self.signal.signal_type
    }

    pub fn payload(&self) -> &[u8] {
        &self.signal.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_type_byte_round_trips_for_every_variant() {
        for signal_type in SignalType::ALL {
            let byte = signal_type.to_byte();
            assert_eq!(SignalType::from_byte(byte).unwrap(), signal_type);
        }
    }

    #[test]
    fn unknown_byte_is_rejected() {
        assert!(SignalType::from_byte(17).is_err());
    }

    #[test]
    fn network_signal_encode_decode_round_trips() {
        let signal = NetworkSignal::new(SignalType::Ping, vec![1, 2, 3]);
        let encoded = signal.encode();
        assert_eq!(NetworkSignal::decode(&encoded).unwrap(), signal);
    }

    #[test]
    fn decode_rejects_empty_buffer() {
        assert!(matches!(
            NetworkSignal::decode(&[]),
            Err(WireError::Truncated)
        ));
    }
}
