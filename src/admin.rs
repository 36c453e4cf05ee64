//! Admin promotion. The same rules back both the CLI `promote` command and
//! the HTTP endpoint, so the error messages here are the wire messages.

use tracing::info;

use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{Actor, Role};

/// Grant the admin role to the profile registered under `email`. The caller
/// must already be an admin.
pub fn promote(db: &Database, actor: &Actor, email: &str) -> Result<(i64, String)> {
    if actor.role != Role::Admin {
        return Err(TrackerError::Permission(
            "Unauthorized: Admin access required".to_string(),
        ));
    }

    let email = email.trim();
    if email.is_empty() {
        return Err(TrackerError::Validation("Email is required".to_string()));
    }
    if !is_valid_email(email) {
        return Err(TrackerError::Validation(
            "Invalid email format".to_string(),
        ));
    }

    let target = db
        .get_profile_by_email(email)?
        .ok_or_else(|| TrackerError::NotFound("User with this email not found".to_string()))?;

    if db.role_of(target.id)? == Role::Admin {
        return Err(TrackerError::Conflict(
            "User is already an admin".to_string(),
        ));
    }

    db.grant_admin(target.id)?;
    info!(user_id = target.id, %email, "admin role granted");

    Ok((
        target.id,
        format!("Successfully added admin role to {}", email),
    ))
}

/// Shape check only: one `@`, no whitespace, a dot somewhere in the domain
/// with something on both sides.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
