use anyhow::Result;

use crate::commands::find_ticket;
use crate::db::Database;
use crate::lifecycle;
use crate::models::{Stage, Ticket};

pub fn run(db: &Database, actor_email: &str, reference: &str) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    let found = find_ticket(db, reference)?;
    let ticket = lifecycle::get(db, &actor, found.id)?;

    let creator = db
        .get_profile(ticket.created_by)?
        .map(|p| p.email)
        .unwrap_or_else(|| format!("#{}", ticket.created_by));

    println!("{} {}", ticket.display_id, ticket.title);
    println!();
    println!("  Category:  {}", ticket.category);
    println!("  Priority:  {}", ticket.priority);
    println!("  Upvotes:   {}", ticket.upvotes);
    if let Some(mood) = ticket.mood {
        println!("  Mood:      {} {}", mood.emoji(), mood);
    }
    println!("  Opened by: {}", creator);
    println!("  Opened at: {}", ticket.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(reference) = &ticket.attachment_ref {
        println!("  Attached:  {}", reference);
    }
    println!();
    println!("{}", render_pipeline(&ticket));

    Ok(())
}

/// Four-stage progress tracker, current stage highlighted with its icon and
/// overall completion as a percentage.
fn render_pipeline(ticket: &Ticket) -> String {
    let mut line = String::from("  ");
    for (i, stage) in Stage::ALL.iter().enumerate() {
        if i > 0 {
            line.push_str(" ── ");
        }
        if *stage == ticket.stage {
            line.push_str(&format!("[{} {}]", stage.icon(), stage.label()));
        } else if stage.index() < ticket.stage.index() {
            line.push_str(&format!("({})", stage.label()));
        } else {
            line.push_str(&format!(" {} ", stage.label()));
        }
    }
    line.push_str(&format!(
        "\n  {:.0}% of the way to resolved",
        ticket.stage.progress() * 100.0
    ));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle;
    use crate::models::{Actor, Mood, Role};
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        (db, dir)
    }

    fn student(db: &Database, email: &str) -> Actor {
        let id = db.create_profile(email, None, &format!("tok-{}", email)).unwrap();
        Actor {
            id,
            role: Role::Student,
            is_active: true,
        }
    }

    #[test]
    fn test_render_pipeline_positions() {
        let (db, _dir) = setup_test_db();
        let actor = student(&db, "s@campus.edu");
        let mut ticket = lifecycle::create(&db, &actor, "wifi down", Mood::Neutral, None).unwrap();

        let committed = render_pipeline(&ticket);
        assert!(committed.contains("[✓ Committed]"));
        assert!(committed.contains("0% of the way"));

        ticket.stage = Stage::Resolved;
        let resolved = render_pipeline(&ticket);
        assert!(resolved.contains("[🔀 Resolved]"));
        assert!(resolved.contains("(Committed)"));
        assert!(resolved.contains("100% of the way"));
    }

    #[test]
    fn test_run_by_display_id() {
        let (db, _dir) = setup_test_db();
        let actor = student(&db, "s@campus.edu");
        let ticket = lifecycle::create(&db, &actor, "wifi down", Mood::Neutral, None).unwrap();

        assert!(run(&db, "s@campus.edu", &ticket.display_id).is_ok());
        assert!(run(&db, "s@campus.edu", &ticket.id.to_string()).is_ok());
    }

    #[test]
    fn test_run_foreign_ticket_denied() {
        let (db, _dir) = setup_test_db();
        let owner = student(&db, "a@campus.edu");
        student(&db, "b@campus.edu");
        let ticket = lifecycle::create(&db, &owner, "wifi down", Mood::Neutral, None).unwrap();

        assert!(run(&db, "b@campus.edu", &ticket.display_id).is_err());
    }

    #[test]
    fn test_run_missing_ticket() {
        let (db, _dir) = setup_test_db();
        student(&db, "s@campus.edu");
        assert!(run(&db, "s@campus.edu", "BUG-042").is_err());
    }
}
