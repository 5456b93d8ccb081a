use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three kinds of SIMS user. Each one owns a fixed path and a dashboard shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'. Supported: admin, teacher, student")]
pub struct ParseRoleError(pub String);

/// Demo account shown under each login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoCredentials {
    pub email: &'static str,
    pub password: &'static str,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Teacher, Role::Student];

    /// Canonical lower-case name. This is what gets stored and compared.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }

    /// Upper-case label used in page headings ("SIMS - ADMIN Login").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }

    /// The fixed route this role is served on.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Teacher => "/teacher",
            Self::Student => "/student",
        }
    }

    /// Match a path segment exactly. Unlike `FromStr`, paths are case-sensitive.
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == segment)
    }

    pub fn demo_credentials(&self) -> DemoCredentials {
        match self {
            Self::Admin => DemoCredentials {
                email: "admin@sims.edu",
                password: "admin123",
            },
            Self::Teacher => DemoCredentials {
                email: "teacher@sims.edu",
                password: "teacher123",
            },
            Self::Student => DemoCredentials {
                email: "student@sims.edu",
                password: "student123",
            },
        }
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Case-insensitive: the backend answers with `"ADMIN"`, storage holds `"admin"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "student" => Ok(Self::Student),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
