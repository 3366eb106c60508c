//! Behavioral risk classification over roles and login-attempt counters.

use crate::store::UserRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

const INACTIVE_MAX_ATTEMPTS: u32 = 10;
const SUSPICIOUS_ADMIN_ATTEMPTS: u32 = 50;
const ACTIVE_MODERATOR_ATTEMPTS: u32 = 30;
const POWER_USER_ATTEMPTS: u32 = 100;

const ROLE_ADMIN: &str = "admin";
const ROLE_MODERATOR: &str = "moderator";

/// Risk category for an account.
///
/// `Admin` and `Moderator` exist for callers that persist categories from
/// other sources; [`classify`] itself only ever produces the rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Unknown,
    Inactive,
    NoRoles,
    Regular,
    PowerUser,
    Moderator,
    ActiveModerator,
    Admin,
    ActiveAdmin,
    SuspiciousAdmin,
}

impl Classification {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Inactive => "inactive",
            Self::NoRoles => "no_roles",
            Self::Regular => "regular",
            Self::PowerUser => "power_user",
            Self::Moderator => "moderator",
            Self::ActiveModerator => "active_moderator",
            Self::Admin => "admin",
            Self::ActiveAdmin => "active_admin",
            Self::SuspiciousAdmin => "suspicious_admin",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an account by its roles and attempt counter.
///
/// Pure and total. When an account holds several roles the highest-privilege
/// one decides: admin over moderator over anything else. The outcome never
/// depends on the iteration order of the role set.
#[must_use]
pub fn classify(user: Option<&UserRecord>) -> Classification {
    let Some(user) = user else {
        return Classification::Unknown;
    };

    let attempts = user.login_attempts();
    if attempts <= INACTIVE_MAX_ATTEMPTS {
        return Classification::Inactive;
    }

    let roles = user.roles_ref();
    if roles.is_empty() {
        return Classification::NoRoles;
    }

    if roles.contains(ROLE_ADMIN) {
        if attempts > SUSPICIOUS_ADMIN_ATTEMPTS {
            Classification::SuspiciousAdmin
        } else {
            Classification::ActiveAdmin
        }
    } else if roles.contains(ROLE_MODERATOR) {
        if attempts > ACTIVE_MODERATOR_ATTEMPTS {
            Classification::ActiveModerator
        } else {
            Classification::Moderator
        }
    } else if attempts > POWER_USER_ATTEMPTS {
        Classification::PowerUser
    } else {
        Classification::Regular
    }
}

/// Users holding `role` whose attempt counter is above `min_attempts`.
#[must_use]
pub fn with_active_role<'a>(
    users: &'a [UserRecord],
    role: &str,
    min_attempts: u32,
) -> Vec<&'a UserRecord> {
    users
        .iter()
        .filter(|user| user.has_role(role) && user.login_attempts() > min_attempts)
        .collect()
}
