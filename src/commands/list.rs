use anyhow::Result;

use crate::db::Database;
use crate::lifecycle;
use crate::models::{Category, Priority, Stage};

pub fn run(
    db: &Database,
    actor_email: &str,
    category: Option<Category>,
    priority: Option<Priority>,
    stage: Option<Stage>,
) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    let tickets = lifecycle::list(db, &actor)?;

    let tickets: Vec<_> = tickets
        .into_iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .filter(|t| priority.map_or(true, |p| t.priority == p))
        .filter(|t| stage.map_or(true, |s| t.stage == s))
        .collect();

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    println!(
        "{:<9} {:<40} {:<15} {:<9} {:<10} {:>5}",
        "ID", "TITLE", "CATEGORY", "PRIORITY", "STAGE", "VOTES"
    );
    for ticket in &tickets {
        println!(
            "{:<9} {:<40} {:<15} {:<9} {:<10} {:>5}",
            ticket.display_id,
            truncate(&ticket.title, 40),
            ticket.category,
            ticket.priority,
            ticket.stage,
            ticket.upvotes,
        );
    }
    println!(
        "\n{} ticket{}",
        tickets.len(),
        if tickets.len() == 1 { "" } else { "s" }
    );

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
