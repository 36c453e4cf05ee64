//! Role- and ownership-gated access rules. Suspension is not checked here:
//! the actor-resolution boundary rejects suspended accounts before any of
//! these functions run.

use crate::models::{Actor, Role, Ticket};

/// Full ticket detail is visible to admins and to the ticket's creator.
pub fn can_view(actor: &Actor, ticket: &Ticket) -> bool {
    actor.role == Role::Admin || actor.id == ticket.created_by
}

/// Only admins move tickets through the pipeline.
pub fn can_mutate_stage(actor: &Actor) -> bool {
    actor.role == Role::Admin
}

/// Any authenticated actor may upvote.
pub fn can_upvote(_actor: &Actor) -> bool {
    true
}

/// Any authenticated actor may submit a ticket.
pub fn can_create(_actor: &Actor) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Mood, Priority, Stage};
    use chrono::Utc;

    fn student(id: i64) -> Actor {
        Actor {
            id,
            role: Role::Student,
            is_active: true,
        }
    }

    fn admin(id: i64) -> Actor {
        Actor {
            id,
            role: Role::Admin,
            is_active: true,
        }
    }

    fn ticket_owned_by(creator: i64) -> Ticket {
        Ticket {
            id: 1,
            display_id: "BUG-001".to_string(),
            title: "Wifi down".to_string(),
            category: Category::Infrastructure,
            priority: Priority::High,
            stage: Stage::Committed,
            upvotes: 1,
            mood: Some(Mood::Neutral),
            created_by: creator,
            created_at: Utc::now(),
            attachment_ref: None,
        }
    }

    #[test]
    fn test_student_views_own_ticket() {
        assert!(can_view(&student(7), &ticket_owned_by(7)));
    }

    #[test]
    fn test_student_cannot_view_other_students_ticket() {
        assert!(!can_view(&student(7), &ticket_owned_by(8)));
    }

    #[test]
    fn test_admin_views_any_ticket() {
        assert!(can_view(&admin(1), &ticket_owned_by(7)));
        assert!(can_view(&admin(1), &ticket_owned_by(1)));
    }

    #[test]
    fn test_only_admin_mutates_stage() {
        assert!(can_mutate_stage(&admin(1)));
        assert!(!can_mutate_stage(&student(1)));
    }

    #[test]
    fn test_any_role_can_upvote_and_create() {
        assert!(can_upvote(&student(1)));
        assert!(can_upvote(&admin(1)));
        assert!(can_create(&student(1)));
        assert!(can_create(&admin(1)));
    }
}
