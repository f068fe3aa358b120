//! Which roles bypass route policy, which are checked remotely, and how long
//! a remote answer stays fresh.

use std::collections::HashSet;
use std::time::Duration;

use portal_core::config::PermissionsConfig;
use portal_core::result::AppResult;
use portal_core::types::{Principal, UserRole};

const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(300);

/// Role policy of the route permission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Granted every route without a lookup.
    privileged: HashSet<UserRole>,
    /// Resolved by the permission service.
    checked: HashSet<UserRole>,
    /// Freshness of a memoized remote answer.
    memo_ttl: Duration,
}

impl RoutePolicy {
    /// Creates a policy from explicit role sets with the default memo TTL.
    pub fn new(
        privileged: impl IntoIterator<Item = UserRole>,
        checked: impl IntoIterator<Item = UserRole>,
    ) -> Self {
        Self {
            privileged: privileged.into_iter().collect(),
            checked: checked.into_iter().collect(),
            memo_ttl: DEFAULT_MEMO_TTL,
        }
    }

    pub fn with_memo_ttl(mut self, ttl: Duration) -> Self {
        self.memo_ttl = ttl;
        self
    }

    /// Parses the configured role names. Unknown names are a validation
    /// error.
    pub fn from_config(config: &PermissionsConfig) -> AppResult<Self> {
        Ok(Self {
            privileged: parse_roles(&config.privileged_roles)?,
            checked: parse_roles(&config.checked_roles)?,
            memo_ttl: Duration::from_secs(config.cache_ttl_seconds),
        })
    }

    /// Whether `principal` skips route policy: a privileged role, or the
    /// superuser flag on any role.
    pub fn is_privileged(&self, principal: &Principal) -> bool {
        principal.is_superuser || self.privileged.contains(&principal.role)
    }

    /// Whether `role` is resolved by the permission service. Roles outside
    /// this set are denied without asking.
    pub fn requires_lookup(&self, role: UserRole) -> bool {
        self.checked.contains(&role)
    }

    pub fn memo_ttl(&self) -> Duration {
        self.memo_ttl
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::new(
            [UserRole::Admin, UserRole::Superuser],
            [UserRole::Agent, UserRole::Lawyer],
        )
    }
}

fn parse_roles(names: &[String]) -> AppResult<HashSet<UserRole>> {
    names.iter().map(|name| name.parse::<UserRole>()).collect()
}
