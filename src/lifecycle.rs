//! Ticket lifecycle operations. Every operation takes the acting identity
//! explicitly, gates through the access policy, then mutates through the
//! database. A ticket always has exactly one current stage and is never
//! deleted.

use tracing::info;

use crate::classify::classify;
use crate::db::Database;
use crate::error::{Result, TrackerError};
use crate::models::{Actor, Mood, Stage, Ticket};
use crate::policy;

/// Create a ticket from a free-text submission. Classification is frozen at
/// creation; the ticket starts at `committed` with the creator's implicit
/// upvote.
pub fn create(
    db: &Database,
    actor: &Actor,
    text: &str,
    mood: Mood,
    attachment_ref: Option<&str>,
) -> Result<Ticket> {
    if !policy::can_create(actor) {
        return Err(TrackerError::Permission(
            "Not allowed to submit tickets".to_string(),
        ));
    }

    let title = text.trim();
    if title.is_empty() {
        return Err(TrackerError::Validation(
            "Ticket text must not be empty".to_string(),
        ));
    }

    let (category, priority) = classify(title, mood);
    let ticket = db.insert_ticket(title, category, priority, Some(mood), actor.id, attachment_ref)?;

    info!(
        display_id = %ticket.display_id,
        category = %ticket.category,
        priority = %ticket.priority,
        "ticket created"
    );
    Ok(ticket)
}

/// Move a ticket to any stage. There is deliberately no adjacency check:
/// this is an admin override control, so backward jumps and repeats are
/// allowed, and repeating the current stage is a no-op that still succeeds.
pub fn change_stage(db: &Database, actor: &Actor, ticket_id: i64, new_stage: Stage) -> Result<Ticket> {
    if !policy::can_mutate_stage(actor) {
        return Err(TrackerError::Permission(
            "Only admins can change ticket stage".to_string(),
        ));
    }

    let ticket = db
        .get_ticket(ticket_id)?
        .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", ticket_id)))?;

    db.set_ticket_stage(ticket.id, new_stage)?;

    info!(display_id = %ticket.display_id, stage = %new_stage, "stage changed");
    db.get_ticket(ticket.id)?
        .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", ticket_id)))
}

/// Increment a ticket's upvote count. This is a read-modify-write with no
/// atomic increment and no per-actor ledger: the same actor may upvote
/// repeatedly, and concurrent upvotes can lose updates (last write wins).
pub fn upvote(db: &Database, actor: &Actor, ticket_id: i64) -> Result<Ticket> {
    if !policy::can_upvote(actor) {
        return Err(TrackerError::Permission(
            "Not allowed to upvote".to_string(),
        ));
    }

    let count = db
        .ticket_upvotes(ticket_id)?
        .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", ticket_id)))?;
    db.set_ticket_upvotes(ticket_id, count + 1)?;

    db.get_ticket(ticket_id)?
        .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", ticket_id)))
}

/// Tickets visible to the actor, newest first: everything for admins, only
/// their own for students.
pub fn list(db: &Database, actor: &Actor) -> Result<Vec<Ticket>> {
    match actor.role {
        crate::models::Role::Admin => db.list_tickets(None),
        crate::models::Role::Student => db.list_tickets(Some(actor.id)),
    }
}

/// Full detail of one ticket, policy-gated.
pub fn get(db: &Database, actor: &Actor, ticket_id: i64) -> Result<Ticket> {
    let ticket = db
        .get_ticket(ticket_id)?
        .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", ticket_id)))?;

    if !policy::can_view(actor, &ticket) {
        return Err(TrackerError::Permission(
            "Not allowed to view this ticket".to_string(),
        ));
    }

    Ok(ticket)
}
