use std::path::Path;

use anyhow::{bail, Result};

use crate::db::Database;
use crate::storage::BlobStore;

pub fn show(db: &Database, email: &str) -> Result<()> {
    let profile = match db.get_profile_by_email(email)? {
        Some(profile) => profile,
        None => bail!("No profile for {}", email),
    };
    let role = db.role_of(profile.id)?;

    println!("{} ({})", profile.email, role);
    println!("  Name:    {}", profile.full_name.as_deref().unwrap_or("-"));
    println!("  Bio:     {}", profile.bio.as_deref().unwrap_or("-"));
    println!("  Contact: {}", profile.contact_number.as_deref().unwrap_or("-"));
    println!("  Avatar:  {}", profile.avatar_ref.as_deref().unwrap_or("-"));
    println!(
        "  Status:  {}",
        if profile.is_active { "active" } else { "suspended" }
    );
    println!("  Joined:  {}", profile.created_at.format("%Y-%m-%d"));

    Ok(())
}

/// Update the caller's own profile fields. A new avatar replaces the stored
/// one; the old object is removed once the upload succeeds so the store
/// never accumulates orphans.
pub fn edit(
    db: &Database,
    store: &BlobStore,
    email: &str,
    bio: Option<&str>,
    contact_number: Option<&str>,
    avatar: Option<&Path>,
) -> Result<()> {
    let actor = db.resolve_actor_by_email(email)?;
    let profile = db
        .get_profile(actor.id)?
        .ok_or_else(|| anyhow::anyhow!("No profile for {}", email))?;

    let avatar_ref = match avatar {
        Some(path) => {
            let new_ref = store.put_avatar(actor.id, path)?;
            if let Some(old) = &profile.avatar_ref {
                store.delete(old)?;
            }
            Some(new_ref)
        }
        None => None,
    };

    let changed = db.update_profile(actor.id, bio, contact_number, avatar_ref.as_deref())?;
    if changed {
        println!("Profile updated.");
    } else {
        println!("Nothing to update.");
    }

    Ok(())
}
