use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::Database;
use crate::storage::BlobStore;

pub fn run(path: &Path) -> Result<()> {
    let data_dir = path.join(".broresolve");

    if data_dir.exists() {
        println!("Already initialized at {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(&data_dir).context("Failed to create .broresolve directory")?;

    let db_path = data_dir.join("tracker.db");
    Database::open(&db_path)?;
    BlobStore::open(&data_dir)?;

    println!("Created {}", data_dir.display());
    println!("\nNext steps:");
    println!("  broresolve user add you@campus.edu --admin   # Create the first admin");
    println!("  broresolve submit \"wifi is down\" --as you@campus.edu");

    Ok(())
}
