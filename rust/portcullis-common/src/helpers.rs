//! Deterministic fakes for the collaborator traits.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::{AuthorizationContext, Clock};

/// A [Clock] pinned to an explicit instant, advanced manually by tests.
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a [FixedClock] reporting the given instant.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Moves the reported instant forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut instant = self.instant.write().expect("clock lock poisoned");
        *instant = *instant + duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().expect("clock lock poisoned")
    }
}

/// An [AuthorizationContext] with a fixed fingerprint and role set.
#[derive(Clone, Debug, Default)]
pub struct StaticAuthorizationContext {
    hash: String,
    roles: Vec<String>,
}

impl StaticAuthorizationContext {
    /// Creates a context reporting the given fingerprint hash and roles.
    pub fn new(hash: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            hash: hash.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// A context with an empty fingerprint and no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthorizationContext for StaticAuthorizationContext {
    fn context_hash(&self) -> String {
        self.hash.clone()
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    fn roles(&self) -> Vec<String> {
        self.roles.clone()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::Clock;

    #[test]
    fn it_reports_and_advances_a_fixed_instant() {
        let start = Utc.with_ymd_and_hms(2025, 5, 7, 5, 48, 59).unwrap();
        let clock = FixedClock::new(start);

        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn it_matches_roles_exactly() {
        let context = StaticAuthorizationContext::new("abc123", ["editor"]);

        assert!(context.has_role("editor"));
        assert!(!context.has_role("edit"));
        assert!(!context.has_role("administrator"));
        assert_eq!(context.roles(), vec!["editor".to_string()]);
    }
}
