use anyhow::Result;

use crate::admin;
use crate::db::Database;

pub fn run(db: &Database, actor_email: &str, target_email: &str) -> Result<()> {
    let actor = db.resolve_actor_by_email(actor_email)?;
    let (_, message) = admin::promote(db, &actor, target_email)?;
    println!("{}", message);
    Ok(())
}
