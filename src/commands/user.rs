use anyhow::{bail, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::admin::is_valid_email;
use crate::db::Database;
use crate::error::TrackerError;
use crate::models::Role;

const TOKEN_LENGTH: usize = 32;

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Register a profile. Modeled on the sign-up flow: anyone can register a
/// student; `--admin` exists to bootstrap the first administrator.
pub fn add(db: &Database, email: &str, full_name: Option<&str>, admin: bool) -> Result<()> {
    let email = email.trim();
    if !is_valid_email(email) {
        bail!("Invalid email format");
    }

    let token = generate_token();
    let id = db.create_profile(email, full_name, &token)?;
    if admin {
        db.grant_admin(id)?;
    }

    println!(
        "Registered {} as {}",
        email,
        if admin { "admin" } else { "student" }
    );
    println!("API token: {}", token);
    Ok(())
}

pub fn list(db: &Database) -> Result<()> {
    let profiles = db.list_profiles()?;

    if profiles.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    for profile in profiles {
        let role = db.role_of(profile.id)?;
        let status = if profile.is_active {
            "active"
        } else {
            "suspended"
        };
        println!(
            "#{:<4} {:8} {:9} {:<30} {}",
            profile.id,
            role,
            status,
            profile.email,
            profile.full_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

pub fn suspend(db: &Database, actor_email: &str, target_email: &str) -> Result<()> {
    set_active(db, actor_email, target_email, false)
}

pub fn activate(db: &Database, actor_email: &str, target_email: &str) -> Result<()> {
    set_active(db, actor_email, target_email, true)
}

fn set_active(db: &Database, actor_email: &str, target_email: &str, active: bool) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    if actor.role != Role::Admin {
        return Err(TrackerError::Permission(
            "Only admins can manage accounts".to_string(),
        )
        .into());
    }

    let target = match db.get_profile_by_email(target_email)? {
        Some(profile) => profile,
        None => bail!("No profile for {}", target_email),
    };

    db.set_profile_active(target.id, active)?;
    println!(
        "{} has been {}",
        target.email,
        if active { "activated" } else { "suspended" }
    );
    Ok(())
}
