use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ClipError;

pub const TAG_LEN: usize = 4;

/// A validated ClipTag: exactly 4 ASCII alphanumerics, stored upper-case so
/// `abcd` and `ABCD` name the same room.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomTag(String);

impl RoomTag {
    pub fn parse(candidate: &str) -> Result<Self, ClipError> {
        let valid = candidate.len() == TAG_LEN
            && candidate.bytes().all(|b| b.is_ascii_alphanumeric());
        if !valid {
            return Err(ClipError::InvalidRoomTag(candidate.to_string()));
        }
        Ok(RoomTag(candidate.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomTag {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomTag::parse(s)
    }
}

impl fmt::Display for RoomTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RoomTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case() {
        assert_eq!(RoomTag::parse("abCd").unwrap().as_str(), "ABCD");
        assert_eq!(RoomTag::parse("a1b2").unwrap(), RoomTag::parse("A1B2").unwrap());
    }

    #[test]
    fn rejects_malformed_tags() {
        for bad in ["", "abc", "abcde", "ab-d", "ab d", "ÄBCD", "ab\u{0}d"] {
            assert_eq!(
                RoomTag::parse(bad),
                Err(ClipError::InvalidRoomTag(bad.to_string())),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parses_via_from_str() {
        let tag: RoomTag = "wxyz".parse().unwrap();
        assert_eq!(tag.to_string(), "WXYZ");
    }
}
