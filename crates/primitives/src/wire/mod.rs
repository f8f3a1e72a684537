//! Fixed-position binary codec for the structured payloads signals carry.
//!
//! Every encoder in this module is bit-exact: two peers running different
//! implementations of this protocol must be able to interoperate, so field
//! order, width and byte order are part of the contract, not an
//! implementation detail.

mod connection_sign;
mod rtc_answer;
mod rtc_offer;
mod signature;

pub use connection_sign::ConnectionSign;
pub use rtc_answer::RtcAnswer;
pub use rtc_offer::RtcOffer;
pub use signature::Signature;

use thiserror::Error;

pub use crate::id::ID_LENGTH;

/// Width in bytes of a `ConnectionSign.sign` / `RtcOffer.sign` correlation
/// token, and of the ECDSA-signature-independent `sign` field on the wire.
pub const SIGN_LENGTH: usize = 256;
/// Smallest accepted length, in bytes, of a PEM-encoded RSA public key.
pub const MIN_PUB_KEY_LENGTH: usize = 256;
/// Largest accepted length, in bytes, of a PEM-encoded RSA public key.
pub const MAX_PUB_KEY_LENGTH: usize = 512;
/// Largest accepted length, in bytes, of a STUN server URL.
pub const MAX_STUN_SERVER_LENGTH: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("message ended before the expected field could be read")]
    Truncated,

    #[error("unknown signal type byte {0}")]
    UnknownSignalType(u8),

    #[error("stun server length {0} exceeds the {max} byte maximum", max = MAX_STUN_SERVER_LENGTH)]
    StunServerTooLong(usize),

    #[error("rsa public key length {0} is outside the {min}..={max} byte range", min = MIN_PUB_KEY_LENGTH, max = MAX_PUB_KEY_LENGTH)]
    PubKeyLengthOutOfRange(usize),

    #[error("trailing bytes after the fixed fields must be exactly {expected}, got {actual}")]
    TrailingLengthMismatch { expected: usize, actual: usize },

    #[error("member id was not valid: {0}")]
    InvalidMemberId(#[from] crate::id::MemberIdError),
}

pub(crate) fn take<'a>(bytes: &mut &'a [u8], len: usize) -> Result<&'a [u8], WireError> {
    if bytes.len() < len {
        return Err(WireError::Truncated);
    }
    let (head, tail) = bytes.split_at(len);
    *bytes = tail;
    Ok(head)
}

pub(crate) fn take_u8(bytes: &mut &[u8]) -> Result<u8, WireError> {
    Ok(take(bytes, 1)?[0])
}

pub(crate) fn take_u16_be(bytes: &mut &[u8]) -> Result<u16, WireError> {
    let raw = take(bytes, 2)?;
    Ok(u16::from_be_bytes([raw[0], raw[1]]))
}
