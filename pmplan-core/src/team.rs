//! Plan manager and collaborator records
//!
//! These are local stand-ins: names and emails are validated for shape
//! only and nothing is sent anywhere.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("valid regex"))
}

/// Whether `email` looks like an email address
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email.trim())
}

/// Reject anything that does not look like an email address
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(Error::Validation(
            "Please enter a valid email address.".to_string(),
        ))
    }
}

/// Reject blank display names, returning the trimmed name
pub fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Please enter your name.".to_string()));
    }
    Ok(name.to_string())
}

/// The person the plan is being written by
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl UserProfile {
    /// Build a profile from sign-in input
    pub fn sign_in(name: &str, email: &str) -> Result<Self> {
        validate_email(email)?;
        let name = validate_name(name)?;
        Ok(Self {
            name,
            email: email.trim().to_string(),
        })
    }
}

/// Access level of a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Editor,
    #[default]
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        write!(f, "{}", name)
    }
}

/// Someone with access to the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Collaborators of one plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    collaborators: Vec<Collaborator>,
}

impl Roster {
    /// An empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// A roster whose owner is the signed-in user
    pub fn with_owner(owner: &UserProfile) -> Self {
        Self {
            collaborators: vec![Collaborator {
                id: Uuid::new_v4().to_string(),
                name: owner.name.clone(),
                email: owner.email.clone(),
                role: Role::Owner,
            }],
        }
    }

    /// All collaborators in invitation order
    pub fn collaborators(&self) -> &[Collaborator] {
        &self.collaborators
    }

    /// Add a viewer by email; the display name is the email's local part
    pub fn invite(&mut self, email: &str) -> Result<&Collaborator> {
        validate_email(email)?;
        let email = email.trim();

        if self
            .collaborators
            .iter()
            .any(|c| c.email.eq_ignore_ascii_case(email))
        {
            return Err(Error::Validation(
                "This user is already a collaborator.".to_string(),
            ));
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        self.collaborators.push(Collaborator {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.to_string(),
            role: Role::Viewer,
        });
        tracing::info!(email, "Invited collaborator");

        Ok(&self.collaborators[self.collaborators.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email(" bob@team.example.org "));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@example"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_sign_in() {
        let user = UserProfile::sign_in(" Alice ", "alice@example.com").unwrap();
        assert_eq!(user.name, "Alice");

        assert!(UserProfile::sign_in("Alice", "not-an-email").is_err());
        assert!(UserProfile::sign_in("   ", "alice@example.com").is_err());
    }

    #[test]
    fn test_invite() {
        let owner = UserProfile::sign_in("Alice", "alice@example.com").unwrap();
        let mut roster = Roster::with_owner(&owner);

        let invited = roster.invite("carol@example.com").unwrap();
        assert_eq!(invited.name, "carol");
        assert_eq!(invited.role, Role::Viewer);
        assert_eq!(roster.collaborators().len(), 2);
    }

    #[test]
    fn test_invite_duplicate_rejected() {
        let owner = UserProfile::sign_in("Alice", "alice@example.com").unwrap();
        let mut roster = Roster::with_owner(&owner);

        let err = roster.invite("Alice@Example.com").unwrap_err();
        assert!(err.to_string().contains("already a collaborator"));
        assert_eq!(roster.collaborators().len(), 1);
    }

    #[test]
    fn test_invite_invalid_email() {
        let mut roster = Roster::new();
        assert!(matches!(roster.invite("nope"), Err(Error::Validation(_))));
        assert!(roster.collaborators().is_empty());
    }
}
