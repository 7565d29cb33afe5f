//! Contributor identity
//!
//! Gerrit records the same person with slightly different data across
//! changes (display names get edited, emails change case). All statistics
//! are keyed by a derived identifier so that such records collapse into a
//! single contributor.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier used when neither a username nor a usable email is known
pub const ANONYMOUS_IDENTIFIER: &str = "anonymous_coward";

/// A Gerrit account as it appears in review data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

impl Identity {
    /// Create an identity from its raw parts
    pub fn new(name: Option<String>, email: Option<String>, username: Option<String>) -> Self {
        Self { name, email, username }
    }

    /// Create an identity known only by email
    pub fn from_email<S: Into<String>>(email: S) -> Self {
        Self { email: Some(email.into()), ..Self::default() }
    }

    /// Create an identity known only by username
    pub fn from_username<S: Into<String>>(username: S) -> Self {
        Self { username: Some(username.into()), ..Self::default() }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        non_empty(&self.name)
    }

    pub fn email(&self) -> Option<&str> {
        non_empty(&self.email)
    }

    pub fn username(&self) -> Option<&str> {
        non_empty(&self.username)
    }

    pub fn has_email(&self) -> bool {
        self.email().is_some()
    }

    pub fn has_username(&self) -> bool {
        self.username().is_some()
    }

    /// Canonical deduplication key.
    ///
    /// The username when present; otherwise the local part of the email with
    /// dots replaced by underscores; otherwise [`ANONYMOUS_IDENTIFIER`].
    /// An email without `@` is not considered usable.
    pub fn identifier(&self) -> String {
        if let Some(username) = self.username() {
            return username.to_string();
        }
        self.email()
            .and_then(|email| email.split_once('@'))
            .map(|(local, _)| local.replace('.', "_"))
            .unwrap_or_else(|| ANONYMOUS_IDENTIFIER.to_string())
    }

    /// Ordering by raw email, falling back to raw username.
    ///
    /// This is deliberately independent of [`Identity::identifier`]: two
    /// identities that compare equal with `==` may still order differently
    /// here, and identities of different kinds (one with an email, the other
    /// with only a username) are reported as `Equal`.
    pub fn contact_cmp(&self, other: &Identity) -> Ordering {
        match (&self.email, &other.email, &self.username, &other.username) {
            (Some(left), Some(right), _, _) => left.cmp(right),
            (_, _, Some(left), Some(right)) => left.cmp(right),
            _ => Ordering::Equal,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.email()
            .or_else(|| self.name())
            .or_else(|| self.username());
        match label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "{}", ANONYMOUS_IDENTIFIER),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of(identity: &Identity) -> u64 {
        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_identifier_prefers_username() {
        let identity = Identity::from_email("jane.doe@example.com").with_username("jdoe");
        assert_eq!(identity.identifier(), "jdoe");
    }

    #[test]
    fn test_identifier_from_email_local_part() {
        let identity = Identity::from_email("jane.doe@x.com");
        assert_eq!(identity.identifier(), "jane_doe");
    }

    #[test]
    fn test_identifier_anonymous() {
        assert_eq!(Identity::default().identifier(), ANONYMOUS_IDENTIFIER);
        assert_eq!(Identity::from_email("").identifier(), ANONYMOUS_IDENTIFIER);
        assert_eq!(Identity::from_email("not-an-address").identifier(), ANONYMOUS_IDENTIFIER);
        assert_eq!(Identity::from_username("").identifier(), ANONYMOUS_IDENTIFIER);
    }

    #[test]
    fn test_equality_ignores_display_name() {
        let before = Identity::from_email("jane.doe@x.com").with_name("Jane");
        let after = Identity::from_email("jane.doe@x.com").with_name("Jane Doe-Smith");
        assert_eq!(before, after);

        let mut set = HashSet::new();
        set.insert(before);
        set.insert(after);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_username_different_email_collapse() {
        let work = Identity::from_username("jdoe").with_email("jdoe@work.com");
        let home = Identity::from_username("jdoe").with_email("jane@home.org");
        assert_eq!(work, home);
        assert_eq!(hash_of(&work), hash_of(&home));
    }

    // Equality follows the identifier while the contact ordering follows the
    // raw fields; the two disagree for these records and that is kept as is.
    #[test]
    fn test_contact_ordering_disagrees_with_equality() {
        let work = Identity::from_username("jdoe").with_email("jdoe@work.com");
        let home = Identity::from_username("jdoe").with_email("jane@home.org");
        assert_eq!(work, home);
        assert_ne!(work.contact_cmp(&home), Ordering::Equal);

        let by_email = Identity::from_email("a@x.com");
        let by_username = Identity::from_username("zed");
        assert_ne!(by_email, by_username);
        assert_eq!(by_email.contact_cmp(&by_username), Ordering::Equal);
    }

    #[test]
    fn test_contact_ordering() {
        let alice = Identity::from_email("alice@x.com");
        let bob = Identity::from_email("bob@x.com");
        assert_eq!(alice.contact_cmp(&bob), Ordering::Less);
        assert_eq!(bob.contact_cmp(&alice), Ordering::Greater);

        let carol = Identity::from_username("carol");
        let dave = Identity::from_username("dave");
        assert_eq!(carol.contact_cmp(&dave), Ordering::Less);
    }

    #[test]
    fn test_display() {
        assert_eq!(Identity::from_email("a@x.com").with_name("A").to_string(), "a@x.com");
        assert_eq!(Identity::from_username("jdoe").with_name("Jane").to_string(), "Jane");
        assert_eq!(Identity::from_username("jdoe").to_string(), "jdoe");
        assert_eq!(Identity::default().to_string(), ANONYMOUS_IDENTIFIER);
    }

    fn identity_strategy() -> impl Strategy<Value = Identity> {
        let part = prop::option::of(prop_oneof![
            Just(String::new()),
            "[a-c]{1,2}",
            "[a-c]{1,2}\\.[a-c]{1,2}@(x|y)\\.com",
        ]);
        (part.clone(), part.clone(), part).prop_map(|(name, email, username)| {
            Identity::new(name, email, username)
        })
    }

    proptest! {
        #[test]
        fn prop_equality_matches_identifier(a in identity_strategy(), b in identity_strategy()) {
            prop_assert_eq!(a == b, a.identifier() == b.identifier());
            if a == b {
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }

        #[test]
        fn prop_identifier_is_never_empty(a in identity_strategy()) {
            prop_assert!(!a.identifier().is_empty());
        }
    }
}
