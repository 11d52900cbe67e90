//! User entity, its enumerations, and construction-time validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type UserId = i32;

/// Width of the `name` column.
pub const NAME_MAX_CHARS: usize = 20;

/// Raised when a record or one of its enumerated values is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must not contain control characters")]
    ControlCharacter,
    #[error("unknown status: {0} (expected 0, 1 or 2)")]
    UnknownStatus(i16),
    #[error("unknown role: '{0}' (expected user, admin or guest)")]
    UnknownRole(String),
    #[error("{field} {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Account status. Stored and serialized as its ordinal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum Status {
    #[default]
    Pending,
    Active,
    Inactive,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::Active, Status::Inactive];

    pub fn code(self) -> i16 {
        match self {
            Status::Pending => 0,
            Status::Active => 1,
            Status::Inactive => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Active => "ACTIVE",
            Status::Inactive => "INACTIVE",
        }
    }
}

impl TryFrom<i16> for Status {
    type Error = ValidationError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Status::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(ValidationError::UnknownStatus(code))
    }
}

impl From<Status> for i16 {
    fn from(s: Status) -> i16 {
        s.code()
    }
}

/// Account role. Stored and serialized as its lowercase name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Role {
    #[default]
    User,
    Admin,
    Guest,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::Guest];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Guest => "GUEST",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for &'static str {
    fn from(r: Role) -> &'static str {
        r.as_str()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted user row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub status: Status,
    pub role: Role,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, status: Status, role: Role) -> Result<Self, ValidationError> {
        let name = validate_name(name.into())?;
        Ok(User { id, name, status, role })
    }
}

/// Input for `UserRepository::create`. Status defaults to pending, role to user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    pub status: Status,
    pub role: Role,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(NewUser {
            name: validate_name(name.into())?,
            status: Status::default(),
            role: Role::default(),
        })
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::ControlCharacter);
    }
    Ok(name)
}

/// Column comment listing every value of an enumerated column, e.g. `0: PENDING 1: ACTIVE 2: INACTIVE`.
pub fn enum_comment<I, V, N>(items: I) -> String
where
    I: IntoIterator<Item = (V, N)>,
    V: fmt::Display,
    N: fmt::Display,
{
    items
        .into_iter()
        .map(|(value, name)| format!("{}: {}", value, name))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn status_comment() -> String {
    enum_comment(Status::ALL.iter().map(|s| (s.code(), s.name())))
}

pub fn role_comment() -> String {
    enum_comment(Role::ALL.iter().map(|r| (r.as_str(), r.name())))
}
