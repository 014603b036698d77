use std::{borrow::Borrow, collections::HashSet, fmt::Display, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};

const MAX_ROLE_LENGTH: usize = 64;

#[derive(Debug, Hash, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Role(String);

#[derive(Debug, thiserror::Error)]
pub enum InvalidRole {
    #[error("Role name is empty")]
    Empty,
    #[error("Role name is too long")]
    TooLong,
    #[error("Role name contains invalid character {0:?}")]
    InvalidCharacter(char),
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(InvalidRole::Empty);
        }
        if name.len() > MAX_ROLE_LENGTH {
            return Err(InvalidRole::TooLong);
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(InvalidRole::InvalidCharacter(c));
        }
        Ok(Role(name.to_string()))
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for Role {
    fn borrow(&self) -> &str {
        self.as_ref()
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait TimeLimited {
    fn set_validity(&mut self, until: SystemTime);
    fn check_validity(&self) -> bool;
}

fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Claims carried by API bearer token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiClaim {
    pub sub: String,
    pub exp: u64,
    pub roles: HashSet<Role>,
}

impl ApiClaim {
    /// Claim that still needs validity to be set, before it's issued
    pub fn new_expired<R>(sub: impl Into<String>, roles: impl IntoIterator<Item = R>) -> Self
    where
        R: Into<Role>,
    {
        ApiClaim {
            sub: sub.into(),
            exp: 0,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl TimeLimited for ApiClaim {
    fn set_validity(&mut self, until: SystemTime) {
        self.exp = unix_secs(until);
    }

    fn check_validity(&self) -> bool {
        self.exp > unix_secs(SystemTime::now())
    }
}
