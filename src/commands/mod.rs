pub mod init;
pub mod list;
pub mod profile;
pub mod promote;
pub mod show;
pub mod stage;
pub mod submit;
pub mod upvote;
pub mod user;

use anyhow::{bail, Result};

use crate::db::Database;
use crate::models::Ticket;

/// Look a ticket up by display id (`BUG-007`) or bare row id (`7`).
pub(crate) fn find_ticket(db: &Database, reference: &str) -> Result<Ticket> {
    let ticket = if let Ok(id) = reference.parse::<i64>() {
        db.get_ticket(id)?
    } else {
        db.get_ticket_by_display_id(reference)?
    };

    match ticket {
        Some(ticket) => Ok(ticket),
        None => bail!("Ticket {} not found", reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use tempfile::tempdir;

    #[test]
    fn test_find_ticket_by_either_reference() {
        let dir = tempdir().unwrap();
        let db = Database::open(&dir.path().join("test.db")).unwrap();
        let creator = db.create_profile("a@campus.edu", None, "tok").unwrap();
        let ticket = db
            .insert_ticket("One", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        assert_eq!(find_ticket(&db, "BUG-001").unwrap().id, ticket.id);
        assert_eq!(find_ticket(&db, "1").unwrap().id, ticket.id);
        assert!(find_ticket(&db, "BUG-999").is_err());
    }
}
