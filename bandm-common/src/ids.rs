//! Identifier utilities
//!
//! The backend is inconsistent about identifier encoding: the same role id can
//! arrive as a JSON number in one payload and as a string in another, and form
//! state hands back whatever the picker held. Every id is therefore parsed once,
//! at the boundary, into a single opaque string-backed [`Id`]. Comparisons
//! inside the client never coerce.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Opaque identifier for any backend entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

pub type BandId = Id;
pub type RoleId = Id;
pub type UserId = Id;
pub type EventId = Id;
pub type LineupId = Id;
pub type SlotId = Id;
pub type EscalationId = Id;

impl Id {
    /// Parse an identifier from free-form text
    ///
    /// Surrounding whitespace is trimmed. Empty input is rejected so that an
    /// unselected picker never turns into a real id.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidId(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parse optional picker input, treating blank as "nothing selected"
    pub fn parse_optional(raw: &str) -> Option<Self> {
        Self::parse(raw).ok()
    }

    /// Generate a fresh client-side id (UUIDv4)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = Id;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-empty string or an integer identifier")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Id, E> {
        Id::parse(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Id, E> {
        Ok(Id(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Id, E> {
        Ok(Id(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(IdVisitor)
    }
}
