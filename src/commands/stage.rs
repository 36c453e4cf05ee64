use anyhow::Result;

use crate::commands::find_ticket;
use crate::db::Database;
use crate::lifecycle;
use crate::models::Stage;

pub fn run(db: &Database, actor_email: &str, reference: &str, new_stage: Stage) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    let ticket = find_ticket(db, reference)?;
    let previous = ticket.stage;

    let updated = lifecycle::change_stage(db, &actor, ticket.id, new_stage)?;

    if previous == updated.stage {
        println!("{} already at {}", updated.display_id, updated.stage.label());
    } else {
        println!(
            "{} moved {} -> {} {}",
            updated.display_id,
            previous.label(),
            updated.stage.label(),
            updated.stage.icon()
        );
    }

    Ok(())
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

    fn register(db: &Database, email: &str, role: Role) -> Actor {
        let id = db.create_profile(email, None, &format!("tok-{}", email)).unwrap();
        if role == Role::Admin {
            db.grant_admin(id).unwrap();
        }
        Actor {
            id,
            role,
            is_active: true,
        }
    }

    #[test]
    fn test_run_moves_stage() {
        let (db, _dir) = setup_test_db();
        let student = register(&db, "s@campus.edu", Role::Student);
        register(&db, "a@campus.edu", Role::Admin);
        let ticket = lifecycle::create(&db, &student, "wifi down", Mood::Neutral, None).unwrap();

        run(&db, "a@campus.edu", &ticket.display_id, Stage::Reviewing).unwrap();
        let reread = db.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(reread.stage, Stage::Reviewing);
    }

    #[test]
    fn test_run_student_denied() {
        let (db, _dir) = setup_test_db();
        let student = register(&db, "s@campus.edu", Role::Student);
        let ticket = lifecycle::create(&db, &student, "wifi down", Mood::Neutral, None).unwrap();

        assert!(run(&db, "s@campus.edu", &ticket.display_id, Stage::Resolved).is_err());
    }

    #[test]
    fn test_run_missing_ticket() {
        let (db, _dir) = setup_test_db();
        register(&db, "a@campus.edu", Role::Admin);
        assert!(run(&db, "a@campus.edu", "BUG-404", Stage::Reviewing).is_err());
    }
}
