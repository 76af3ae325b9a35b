//! Protocol version tags
//!
//! Headers carry a version tag (e.g. "1.0.0.2"). Rule switches compare tags
//! with a total order: dot-separated components are compared numerically when
//! both parse as integers, otherwise byte-wise; a strict prefix sorts first.
//! The empty tag (headers that never set one) sorts below every real version.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const VERSION_ALPHA: &str = "1.0.0.0";
pub const VERSION_BETA: &str = "1.0.0.1";
pub const VERSION_GAMMA: &str = "1.0.0.2";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(String);

impl ProtocolVersion {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn alpha() -> Self {
        Self::new(VERSION_ALPHA)
    }

    pub fn gamma() -> Self {
        Self::new(VERSION_GAMMA)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Check if this tag is at or above `other`
    pub fn is_at_least(&self, other: &ProtocolVersion) -> bool {
        self >= other
    }
}

impl From<&str> for ProtocolVersion {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Empty sorts first, then numeric, then anything else byte-wise.
/// Numeric ties fall back to bytes so only identical tags compare equal.
fn cmp_component(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Ord for ProtocolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut lhs = self.0.split('.');
        let mut rhs = other.0.split('.');
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match cmp_component(a, b) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
            }
        }
    }
}

impl PartialOrd for ProtocolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
