//! Users, roles and the capability checks derived from them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::UserId;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::validate_name;

const PASSWORD_MIN_CHARS: usize = 6;

/// Errors raised while validating user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("User name must be between 2 and 100 characters (got {length})")]
    InvalidName { length: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Password could not be hashed: {0}")]
    PasswordHash(String),
}

/// Account role. The numeric ids are the ones stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Customer,
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Customer, Role::Employee];

    /// Returns the stored role id (ADMIN=1, CUSTOMER=2, EMPLOYEE=3).
    pub fn id(&self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::Customer => 2,
            Role::Employee => 3,
        }
    }

    /// Maps a stored role id back to a role.
    pub fn from_id(id: i64) -> Option<Role> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Customer),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Human-readable name for role pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Customer => "Customer",
            Role::Employee => "Employee",
        }
    }

    /// Admins and employees.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee)
    }

    /// May drive orders through processing, completion and delivery.
    pub fn can_manage_orders(&self) -> bool {
        self.is_staff()
    }

    /// May place orders at all (customers only for themselves, see [`Actor`]).
    pub fn can_create_order(&self) -> bool {
        true
    }

    /// May create, edit and deactivate categories and products.
    pub fn can_manage_catalog(&self) -> bool {
        self.is_staff()
    }

    /// May create, edit and deactivate user accounts.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is neither a role name nor a role id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Accepts role names (any case) or numeric role ids.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Role::from_id(id).ok_or_else(|| ParseRoleError(s.to_string()));
        }
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "CUSTOMER" => Ok(Role::Customer),
            "EMPLOYEE" => Ok(Role::Employee),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Staff may place orders for anyone; customers only for themselves.
    pub fn can_create_order_for(&self, user_id: UserId) -> bool {
        self.role.can_create_order() && (self.role.is_staff() || self.user_id == user_id)
    }

    /// Staff sees every order; customers only their own.
    pub fn can_view_order(&self, owner: UserId) -> bool {
        self.role.is_staff() || self.user_id == owner
    }

    /// Staff may cancel any order; customers only their own.
    pub fn can_cancel_order(&self, owner: UserId) -> bool {
        self.can_view_order(owner)
    }

    /// Staff may file, read, edit and withdraw any report; customers only their own.
    pub fn can_access_report(&self, owner: UserId) -> bool {
        self.role.is_staff() || self.user_id == owner
    }
}

/// A user account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration input, including the clear-text password.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Validated registration, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    /// Validates the input and hashes the password.
    pub fn into_record(self) -> Result<UserRecord, UserError> {
        let name = validate_user_name(&self.name)?;
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(UserError::PasswordTooShort);
        }

        Ok(UserRecord {
            name,
            email,
            password_hash: hash_password(&self.password)?,
            role: self.role,
        })
    }
}

/// Editable fields of an existing user. The email cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserChanges {
    pub name: String,
    pub role: Role,
    pub active: bool,
}

impl UserChanges {
    pub fn validate(self) -> Result<Self, UserError> {
        Ok(Self {
            name: validate_user_name(&self.name)?,
            role: self.role,
            active: self.active,
        })
    }
}

fn validate_user_name(raw: &str) -> Result<String, UserError> {
    validate_name("User", raw).map_err(|_| UserError::InvalidName {
        length: raw.trim().chars().count(),
    })
}

/// Lowercases and checks an email address of the form `local@domain.tld`.
pub fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = raw.trim().to_lowercase();
    let invalid = || UserError::InvalidEmail(raw.trim().to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }
    Ok(email)
}

/// Hashes a password with Argon2id and a random salt, in PHC string format.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

/// Checks a password against a hash produced by [`hash_password`].
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
