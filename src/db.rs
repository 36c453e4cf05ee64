use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Result, TrackerError};
use crate::models::{Actor, Category, Mood, Priority, Profile, Role, Stage, Ticket};

const SCHEMA_VERSION: i32 = 1;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS profiles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL UNIQUE,
                    full_name TEXT,
                    bio TEXT,
                    contact_number TEXT,
                    avatar_ref TEXT,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    api_token TEXT NOT NULL UNIQUE,
                    created_at TEXT NOT NULL
                );

                -- Roles live apart from profiles; a profile with no row is a
                -- student.
                CREATE TABLE IF NOT EXISTS user_roles (
                    user_id INTEGER NOT NULL,
                    role TEXT NOT NULL,
                    PRIMARY KEY (user_id, role),
                    FOREIGN KEY (user_id) REFERENCES profiles(id) ON DELETE CASCADE
                );

                CREATE TABLE IF NOT EXISTS tickets (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    display_id TEXT NOT NULL UNIQUE,
                    title TEXT NOT NULL,
                    category TEXT NOT NULL,
                    priority TEXT NOT NULL,
                    stage TEXT NOT NULL DEFAULT 'committed',
                    upvotes INTEGER NOT NULL DEFAULT 1 CHECK (upvotes >= 1),
                    mood TEXT,
                    created_by INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    attachment_ref TEXT,
                    FOREIGN KEY (created_by) REFERENCES profiles(id)
                );

                CREATE INDEX IF NOT EXISTS idx_tickets_created_by ON tickets(created_by);
                CREATE INDEX IF NOT EXISTS idx_tickets_stage ON tickets(stage);
                CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
                CREATE INDEX IF NOT EXISTS idx_user_roles_user ON user_roles(user_id);
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        // Enable foreign keys
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(())
    }

    // Profiles

    pub fn create_profile(
        &self,
        email: &str,
        full_name: Option<&str>,
        api_token: &str,
    ) -> Result<i64> {
        if self.get_profile_by_email(email)?.is_some() {
            return Err(TrackerError::Conflict(format!(
                "A profile for {} already exists",
                email
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO profiles (email, full_name, api_token, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![email, full_name, api_token, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_profile(&self, id: i64) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, full_name, bio, contact_number, avatar_ref, is_active, created_at
                 FROM profiles WHERE id = ?1",
                [id],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    pub fn get_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, full_name, bio, contact_number, avatar_ref, is_active, created_at
                 FROM profiles WHERE email = ?1",
                [email],
                row_to_profile,
            )
            .optional()?;
        Ok(profile)
    }

    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, email, full_name, bio, contact_number, avatar_ref, is_active, created_at
             FROM profiles ORDER BY created_at DESC, id DESC",
        )?;
        let profiles = stmt
            .query_map([], row_to_profile)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    pub fn set_profile_active(&self, id: i64, active: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE profiles SET is_active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(rows > 0)
    }

    pub fn update_profile(
        &self,
        id: i64,
        bio: Option<&str>,
        contact_number: Option<&str>,
        avatar_ref: Option<&str>,
    ) -> Result<bool> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(b) = bio {
            updates.push(format!("bio = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(b.to_string()));
        }

        if let Some(c) = contact_number {
            updates.push(format!("contact_number = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(c.to_string()));
        }

        if let Some(a) = avatar_ref {
            updates.push(format!("avatar_ref = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(a.to_string()));
        }

        if updates.is_empty() {
            return Ok(false);
        }

        params_vec.push(Box::new(id));
        let sql = format!(
            "UPDATE profiles SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let rows = self.conn.execute(&sql, params_refs.as_slice())?;
        Ok(rows > 0)
    }

    // Roles

    pub fn role_of(&self, user_id: i64) -> Result<Role> {
        let is_admin: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM user_roles WHERE user_id = ?1 AND role = 'admin'",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(if is_admin.is_some() {
            Role::Admin
        } else {
            Role::Student
        })
    }

    pub fn grant_admin(&self, user_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, 'admin')",
            [user_id],
        )?;
        Ok(())
    }

    // Actor resolution. This is the access boundary: a suspended account is
    // rejected here, once, before any policy check runs.

    pub fn resolve_actor_by_email(&self, email: &str) -> Result<Actor> {
        let profile = self
            .get_profile_by_email(email)?
            .ok_or_else(|| TrackerError::NotFound(format!("No profile for {}", email)))?;
        self.actor_from_profile(&profile)
    }

    /// Token-based resolution for the HTTP API. An unknown token is `None`
    /// (the caller answers 401); a known but suspended account is an error.
    pub fn resolve_actor_by_token(&self, api_token: &str) -> Result<Option<Actor>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, email, full_name, bio, contact_number, avatar_ref, is_active, created_at
                 FROM profiles WHERE api_token = ?1",
                [api_token],
                row_to_profile,
            )
            .optional()?;

        match profile {
            Some(profile) => Ok(Some(self.actor_from_profile(&profile)?)),
            None => Ok(None),
        }
    }

    fn actor_from_profile(&self, profile: &Profile) -> Result<Actor> {
        if !profile.is_active {
            return Err(TrackerError::SuspendedAccount);
        }
        Ok(Actor {
            id: profile.id,
            role: self.role_of(profile.id)?,
            is_active: true,
        })
    }

    // Tickets

    /// Insert a fully classified ticket. The display id is derived from the
    /// row id inside the same transaction, so it is unique and strictly
    /// increasing under concurrent submissions without a client-side count.
    pub fn insert_ticket(
        &self,
        title: &str,
        category: Category,
        priority: Priority,
        mood: Option<Mood>,
        created_by: i64,
        attachment_ref: Option<&str>,
    ) -> Result<Ticket> {
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tickets (display_id, title, category, priority, stage, upvotes, mood, created_by, created_at, attachment_ref)
             VALUES ('', ?1, ?2, ?3, 'committed', 1, ?4, ?5, ?6, ?7)",
            params![
                title,
                category.as_str(),
                priority.as_str(),
                mood.map(Mood::as_str),
                created_by,
                now,
                attachment_ref
            ],
        )?;
        let id = tx.last_insert_rowid();
        let display_id = format_display_id(id);
        tx.execute(
            "UPDATE tickets SET display_id = ?1 WHERE id = ?2",
            params![display_id, id],
        )?;
        tx.commit()?;

        self.get_ticket(id)?
            .ok_or_else(|| TrackerError::NotFound(format!("Ticket #{}", id)))
    }

    pub fn get_ticket(&self, id: i64) -> Result<Option<Ticket>> {
        let ticket = self
            .conn
            .query_row(
                "SELECT id, display_id, title, category, priority, stage, upvotes, mood, created_by, created_at, attachment_ref
                 FROM tickets WHERE id = ?1",
                [id],
                row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    pub fn get_ticket_by_display_id(&self, display_id: &str) -> Result<Option<Ticket>> {
        let ticket = self
            .conn
            .query_row(
                "SELECT id, display_id, title, category, priority, stage, upvotes, mood, created_by, created_at, attachment_ref
                 FROM tickets WHERE display_id = ?1",
                [display_id],
                row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    /// All tickets, or only one creator's, newest first. Admin dashboards
    /// pass `None`; students pass their own id.
    pub fn list_tickets(&self, created_by: Option<i64>) -> Result<Vec<Ticket>> {
        let sql = "SELECT id, display_id, title, category, priority, stage, upvotes, mood, created_by, created_at, attachment_ref
             FROM tickets";

        let tickets = match created_by {
            Some(creator) => {
                let mut stmt = self.conn.prepare(&format!(
                    "{} WHERE created_by = ?1 ORDER BY created_at DESC, id DESC",
                    sql
                ))?;
                let rows = stmt
                    .query_map([creator], row_to_ticket)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("{} ORDER BY created_at DESC, id DESC", sql))?;
                let rows = stmt
                    .query_map([], row_to_ticket)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(tickets)
    }

    pub fn set_ticket_stage(&self, id: i64, stage: Stage) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE tickets SET stage = ?1 WHERE id = ?2",
            params![stage.as_str(), id],
        )?;
        Ok(rows > 0)
    }

    /// Current upvote count, read on its own. Paired with
    /// `set_ticket_upvotes` this is a read-modify-write with no atomicity:
    /// concurrent upvoters can read the same count and lose an update. Known
    /// weakness, kept as last-write-wins.
    pub fn ticket_upvotes(&self, id: i64) -> Result<Option<i64>> {
        let count = self
            .conn
            .query_row("SELECT upvotes FROM tickets WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(count)
    }

    pub fn set_ticket_upvotes(&self, id: i64, upvotes: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE tickets SET upvotes = ?1 WHERE id = ?2",
            params![upvotes, id],
        )?;
        Ok(rows > 0)
    }
}

pub fn format_display_id(id: i64) -> String {
    format!("BUG-{:03}", id)
}

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        bio: row.get(3)?,
        contact_number: row.get(4)?,
        avatar_ref: row.get(5)?,
        is_active: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    Ok(Ticket {
        id: row.get(0)?,
        display_id: row.get(1)?,
        title: row.get(2)?,
        category: parse_enum(row, 3)?,
        priority: parse_enum(row, 4)?,
        stage: parse_enum(row, 5)?,
        upvotes: row.get(6)?,
        mood: row
            .get::<_, Option<String>>(7)?
            .map(|s| parse_enum_str(&s, 7))
            .transpose()?,
        created_by: row.get(8)?,
        created_at: parse_datetime(row.get::<_, String>(9)?),
        attachment_ref: row.get(10)?,
    })
}

fn parse_enum<T: FromStr>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse_enum_str(&raw, idx)
}

fn parse_enum_str<T: FromStr>(raw: &str, idx: usize) -> rusqlite::Result<T> {
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognized value '{}'", raw).into(),
        )
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn setup_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).unwrap();
        (db, dir)
    }

    fn add_student(db: &Database, email: &str) -> i64 {
        db.create_profile(email, Some("Test Student"), &format!("tok-{}", email))
            .unwrap()
    }

    #[test]
    fn test_create_and_get_profile() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "rhea@campus.edu");

        let profile = db.get_profile(id).unwrap().unwrap();
        assert_eq!(profile.email, "rhea@campus.edu");
        assert_eq!(profile.full_name, Some("Test Student".to_string()));
        assert!(profile.is_active);
        assert!(profile.avatar_ref.is_none());
    }

    #[test]
    fn test_duplicate_email_conflicts() {
        let (db, _dir) = setup_test_db();
        add_student(&db, "dup@campus.edu");

        let result = db.create_profile("dup@campus.edu", None, "other-token");
        assert!(matches!(result, Err(TrackerError::Conflict(_))));
    }

    #[test]
    fn test_role_defaults_to_student() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");
        assert_eq!(db.role_of(id).unwrap(), Role::Student);
    }

    #[test]
    fn test_grant_admin_is_idempotent() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");

        db.grant_admin(id).unwrap();
        db.grant_admin(id).unwrap();
        assert_eq!(db.role_of(id).unwrap(), Role::Admin);
    }

    #[test]
    fn test_resolve_actor_by_email() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");

        let actor = db.resolve_actor_by_email("a@campus.edu").unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, Role::Student);
        assert!(actor.is_active);
    }

    #[test]
    fn test_resolve_unknown_email_not_found() {
        let (db, _dir) = setup_test_db();
        let result = db.resolve_actor_by_email("ghost@campus.edu");
        assert!(matches!(result, Err(TrackerError::NotFound(_))));
    }

    #[test]
    fn test_suspended_account_rejected_at_boundary() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");
        db.set_profile_active(id, false).unwrap();

        let result = db.resolve_actor_by_email("a@campus.edu");
        assert!(matches!(result, Err(TrackerError::SuspendedAccount)));
    }

    #[test]
    fn test_resolve_actor_by_token() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");

        let actor = db.resolve_actor_by_token("tok-a@campus.edu").unwrap();
        assert_eq!(actor.unwrap().id, id);

        assert!(db.resolve_actor_by_token("bogus").unwrap().is_none());
    }

    #[test]
    fn test_suspended_token_is_error_not_none() {
        let (db, _dir) = setup_test_db();
        let id = add_student(&db, "a@campus.edu");
        db.set_profile_active(id, false).unwrap();

        let result = db.resolve_actor_by_token("tok-a@campus.edu");
        assert!(matches!(result, Err(TrackerError::SuspendedAccount)));
    }

    #[test]
    fn test_insert_ticket_defaults() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");

        let ticket = db
            .insert_ticket(
                "Wifi down",
                Category::Infrastructure,
                Priority::High,
                Some(Mood::Frustrated),
                creator,
                None,
            )
            .unwrap();

        assert_eq!(ticket.stage, Stage::Committed);
        assert_eq!(ticket.upvotes, 1);
        assert_eq!(ticket.display_id, "BUG-001");
        assert_eq!(ticket.created_by, creator);
        assert_eq!(ticket.mood, Some(Mood::Frustrated));
    }

    #[test]
    fn test_display_ids_strictly_increase() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");

        let first = db
            .insert_ticket("One", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();
        let second = db
            .insert_ticket("Two", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        assert_eq!(first.display_id, "BUG-001");
        assert_eq!(second.display_id, "BUG-002");
        assert!(second.id > first.id);
    }

    #[test]
    fn test_display_id_grows_past_three_digits() {
        assert_eq!(format_display_id(7), "BUG-007");
        assert_eq!(format_display_id(999), "BUG-999");
        assert_eq!(format_display_id(1000), "BUG-1000");
    }

    #[test]
    fn test_get_ticket_by_display_id() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");
        let ticket = db
            .insert_ticket("One", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        let found = db.get_ticket_by_display_id("BUG-001").unwrap().unwrap();
        assert_eq!(found.id, ticket.id);
        assert!(db.get_ticket_by_display_id("BUG-999").unwrap().is_none());
    }

    #[test]
    fn test_list_tickets_filters_by_creator() {
        let (db, _dir) = setup_test_db();
        let a = add_student(&db, "a@campus.edu");
        let b = add_student(&db, "b@campus.edu");

        db.insert_ticket("From a", Category::Other, Priority::Medium, None, a, None)
            .unwrap();
        db.insert_ticket("From b", Category::Other, Priority::Medium, None, b, None)
            .unwrap();

        let all = db.list_tickets(None).unwrap();
        assert_eq!(all.len(), 2);

        let only_a = db.list_tickets(Some(a)).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].title, "From a");
    }

    #[test]
    fn test_list_tickets_newest_first() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");

        db.insert_ticket("First", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();
        db.insert_ticket("Second", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        let tickets = db.list_tickets(None).unwrap();
        assert_eq!(tickets[0].title, "Second");
        assert_eq!(tickets[1].title, "First");
    }

    #[test]
    fn test_stage_update_roundtrip() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");
        let ticket = db
            .insert_ticket("One", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        assert!(db.set_ticket_stage(ticket.id, Stage::Patching).unwrap());
        let reread = db.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(reread.stage, Stage::Patching);

        assert!(!db.set_ticket_stage(99999, Stage::Patching).unwrap());
    }

    #[test]
    fn test_upvote_read_then_write() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");
        let ticket = db
            .insert_ticket("One", Category::Other, Priority::Medium, None, creator, None)
            .unwrap();

        let count = db.ticket_upvotes(ticket.id).unwrap().unwrap();
        assert_eq!(count, 1);
        db.set_ticket_upvotes(ticket.id, count + 1).unwrap();
        assert_eq!(db.ticket_upvotes(ticket.id).unwrap().unwrap(), 2);
    }

    #[test]
    fn test_enum_encoding_survives_sqlite() {
        let (db, _dir) = setup_test_db();
        let creator = add_student(&db, "a@campus.edu");
        let ticket = db
            .insert_ticket(
                "Counseling backlog",
                Category::MentalHealth,
                Priority::Critical,
                Some(Mood::Panicking),
                creator,
                Some("attachments/1/170000.png"),
            )
            .unwrap();

        let reread = db.get_ticket(ticket.id).unwrap().unwrap();
        assert_eq!(reread.category, Category::MentalHealth);
        assert_eq!(reread.priority, Priority::Critical);
        assert_eq!(reread.mood, Some(Mood::Panicking));
        assert_eq!(
            reread.attachment_ref,
            Some("attachments/1/170000.png".to_string())
        );
    }
}
