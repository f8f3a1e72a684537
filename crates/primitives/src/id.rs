//! Member identifiers.
//!
//! A [`MemberId`] is a 52-byte printable identifier, stable for the lifetime
//! of a session. It is the correlation key used throughout the cluster
//! registry, the interaction table and the reaction registry.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed byte width of a [`MemberId`] on the wire.
pub const ID_LENGTH: usize = 52;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemberIdError {
    #[error("member id must be exactly {ID_LENGTH} bytes, got {0}")]
    WrongLength(usize),

    #[error("member id must be ASCII printable")]
    NotPrintable,
}

/// A 52-byte printable identifier.
///
/// Stored as an owned `String` rather than a fixed-size array so it can be
/// used directly as a `HashMap` key without an intermediate allocation at
/// every lookup site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(raw: impl Into<String>) -> Result<Self, MemberIdError> {
        let raw = raw.into();
        if raw.len() != ID_LENGTH {
            return Err(MemberIdError::WrongLength(raw.len()));
        }
        if !raw.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
            return Err(MemberIdError::NotPrintable);
        }
        Ok(Self(raw))
    }

    /// Parses a `MemberId` out of a fixed-width byte slice without copying
    /// more than `ID_LENGTH` bytes, used by the wire codec.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MemberIdError> {
        if bytes.len() != ID_LENGTH {
            return Err(MemberIdError::WrongLength(bytes.len()));
        }
        let raw = String::from_utf8_lossy(bytes).into_owned();
        Self::new(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MemberId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for MemberId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Deserializes through [`MemberId::new`] so a config-file or wire value
/// that isn't exactly [`ID_LENGTH`] printable bytes is rejected up front,
/// rather than producing a `MemberId` that later fails every comparison.
impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        MemberId::new(raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(c: char) -> String {
        c.to_string().repeat(ID_LENGTH)
    }

    #[test]
    fn accepts_exact_length_printable_id() {
        assert!(MemberId::new(id('A')).is_ok());
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            MemberId::new("short"),
            Err(MemberIdError::WrongLength(5))
        );
    }

    #[test]
    fn rejects_non_printable_bytes() {
        let mut raw = id('A');
        raw.replace_range(0..1, "\u{0007}");
        assert!(MemberId::new(raw).is_err());
    }

    #[test]
    fn from_bytes_round_trips_with_as_bytes() {
        let raw = id('B');
        let member = MemberId::from_bytes(raw.as_bytes()).unwrap();
        assert_eq!(member.as_bytes(), raw.as_bytes());
    }
}
