use anyhow::Result;

use crate::commands::find_ticket;
use crate::db::Database;
use crate::lifecycle;

pub fn run(db: &Database, actor_email: &str, reference: &str) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    let ticket = find_ticket(db, reference)?;

    let updated = lifecycle::upvote(db, &actor, ticket.id)?;
    println!(
        "{} now has {} upvote{}",
        updated.display_id,
        updated.upvotes,
        if updated.upvotes == 1 { "" } else { "s" }
    );

    Ok(())
}
