use std::path::Path;

use anyhow::Result;

use crate::db::Database;
use crate::lifecycle;
use crate::models::Mood;
use crate::storage::BlobStore;

pub fn run(
    db: &Database,
    store: &BlobStore,
    actor_email: &str,
    text: &str,
    mood: Mood,
    attach: Option<&Path>,
) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;

    let attachment_ref = match attach {
        Some(path) => Some(store.put("attachments", actor.id, path)?),
        None => None,
    };

    let ticket = lifecycle::create(db, &actor, text, mood, attachment_ref.as_deref())?;

    println!("Submitted {} {}", ticket.display_id, ticket.mood.map(|m| m.emoji()).unwrap_or(""));
    println!("  Title:    {}", ticket.title);
    println!("  Category: {}", ticket.category);
    println!("  Priority: {}", ticket.priority);
    println!("  Stage:    {}", ticket.stage.label());
    if let Some(reference) = &ticket.attachment_ref {
        println!("  Attached: {}", reference);
    }

    Ok(())
}
