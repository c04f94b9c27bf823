//! Roles and the capabilities each one grants.
//!
//! Authorization is a table lookup: a role maps to a fixed capability set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Read,
    Create,
    Update,
    Move,
    Delete,
}

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::Read,
    Capability::Create,
    Capability::Update,
    Capability::Move,
    Capability::Delete,
];

const EDITOR_CAPABILITIES: &[Capability] = &[
    Capability::Read,
    Capability::Create,
    Capability::Update,
    Capability::Move,
];

const VIEWER_CAPABILITIES: &[Capability] = &[Capability::Read];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Editor => ROLE_EDITOR,
            Role::Viewer => ROLE_VIEWER,
        }
    }

    /// The capability set granted to this role.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Admin => ADMIN_CAPABILITIES,
            Role::Editor => EDITOR_CAPABILITIES,
            Role::Viewer => VIEWER_CAPABILITIES,
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// `Ok` if the role grants `capability`, `Forbidden` otherwise.
    pub fn require(self, capability: Capability) -> Result<(), CoreError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Role '{}' lacks the '{}' capability",
                self.as_str(),
                capability.as_str()
            )))
        }
    }
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Create => "create",
            Capability::Update => "update",
            Capability::Move => "move",
            Capability::Delete => "delete",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_EDITOR => Ok(Role::Editor),
            ROLE_VIEWER => Ok(Role::Viewer),
            other => Err(CoreError::validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_ADMIN}, {ROLE_EDITOR}, {ROLE_VIEWER}"
            ))),
        }
    }
}
