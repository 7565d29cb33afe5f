//! Gerrit server version

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Version of the Gerrit server the data was downloaded from.
///
/// Unknown components are stored as `-1`; an all `-1` version is invalid
/// (legacy data files carry no version).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GerritVersion {
    pub major: i32,
    pub minor: i32,
    pub patch: i32,
}

impl GerritVersion {
    pub fn new(major: i32, minor: i32, patch: i32) -> Self {
        Self { major, minor, patch }
    }

    pub fn invalid() -> Self {
        Self::new(-1, -1, -1)
    }

    /// Parse `"2.11.4"`, or the older `"2.8-12-gabcdef"` form
    pub fn parse(version: &str) -> Self {
        let trimmed = version.trim();
        let trimmed = trimmed.strip_prefix("gerrit version ").unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('.').collect();

        let major = match parts.first().and_then(|p| p.parse::<i32>().ok()) {
            Some(major) => major,
            None => {
                log::warn!("Unknown Gerrit version string '{}'", version);
                return Self::invalid();
            }
        };

        match parts.len() {
            n if n >= 3 => Self::new(major, safe_value_of(parts[1]), safe_value_of(parts[2])),
            2 => {
                let mut dashed = parts[1].split('-');
                let minor = dashed.next().map(safe_value_of).unwrap_or(-1);
                let patch = dashed.next().map(safe_value_of).unwrap_or(-1);
                Self::new(major, minor, patch)
            }
            _ => {
                log::warn!("Unknown Gerrit version string '{}'", version);
                Self::new(major, -1, -1)
            }
        }
    }

    /// Major/minor comparison; 3.1 is at least 2.9
    pub fn is_at_least(&self, major: i32, minor: i32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    pub fn is_invalid(&self) -> bool {
        *self == Self::invalid()
    }

    /// The lower of two versions, ignoring invalid ones
    pub fn min_valid(self, other: GerritVersion) -> GerritVersion {
        match (self.is_invalid(), other.is_invalid()) {
            (true, _) => other,
            (_, true) => self,
            _ => match self.cmp_components(&other) {
                Ordering::Greater => other,
                _ => self,
            },
        }
    }

    fn cmp_components(&self, other: &GerritVersion) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl Default for GerritVersion {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for GerritVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn safe_value_of(part: &str) -> i32 {
    part.parse::<i32>().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted_version() {
        assert_eq!(GerritVersion::parse("2.11.4"), GerritVersion::new(2, 11, 4));
        assert_eq!(GerritVersion::parse("gerrit version 3.4.1"), GerritVersion::new(3, 4, 1));
        assert_eq!(GerritVersion::parse("2.12.rc1"), GerritVersion::new(2, 12, -1));
    }

    #[test]
    fn test_parse_legacy_version() {
        assert_eq!(GerritVersion::parse("2.8-12-gabcdef"), GerritVersion::new(2, 8, 12));
        assert_eq!(GerritVersion::parse("2.9"), GerritVersion::new(2, 9, -1));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(GerritVersion::parse("").is_invalid());
        assert!(GerritVersion::parse("unknown").is_invalid());
        assert_eq!(GerritVersion::parse("3").to_string(), "3.-1.-1");
    }

    #[test]
    fn test_is_at_least() {
        assert!(GerritVersion::new(3, 1, 0).is_at_least(2, 9));
        assert!(GerritVersion::new(2, 9, 0).is_at_least(2, 9));
        assert!(!GerritVersion::new(2, 8, 5).is_at_least(2, 9));
        assert!(!GerritVersion::invalid().is_at_least(2, 9));
    }

    #[test]
    fn test_min_valid() {
        let old = GerritVersion::new(2, 8, 0);
        let new = GerritVersion::new(2, 11, 4);
        assert_eq!(old.min_valid(new), old);
        assert_eq!(new.min_valid(old), old);
        assert_eq!(GerritVersion::invalid().min_valid(new), new);
        assert_eq!(new.min_valid(GerritVersion::invalid()), new);
    }
}
