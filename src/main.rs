use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use broresolve::commands;
use broresolve::db::Database;
use broresolve::models::{Category, Mood, Priority, Stage};
use broresolve::server;
use broresolve::storage::BlobStore;

#[derive(Parser)]
#[command(name = "broresolve")]
#[command(about = "A campus issue tracker with keyword triage")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize broresolve in the current directory
    Init,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Submit an issue; category and priority are assigned automatically
    Submit {
        /// Free-text description of the issue
        text: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
        /// How you feel about it (frustrated, panicking, neutral, sick)
        #[arg(short, long, default_value = "neutral")]
        mood: Mood,
        /// Attach a local file to the ticket
        #[arg(short, long)]
        attach: Option<PathBuf>,
    },

    /// List tickets visible to you
    List {
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
        /// Filter by category
        #[arg(short, long)]
        category: Option<Category>,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Filter by stage
        #[arg(short, long)]
        stage: Option<Stage>,
    },

    /// Show ticket details and pipeline progress
    Show {
        /// Ticket reference (BUG-007 or 7)
        reference: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },

    /// Move a ticket to a pipeline stage (admin only)
    Stage {
        /// Ticket reference (BUG-007 or 7)
        reference: String,
        /// Target stage (committed, reviewing, patching, resolved)
        stage: Stage,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },

    /// Upvote a ticket
    Upvote {
        /// Ticket reference (BUG-007 or 7)
        reference: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },

    /// Grant the admin role to another user (admin only)
    Promote {
        /// Email of the user to promote
        email: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },

    /// View or edit a profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Run the HTTP admin API
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "BRORESOLVE_PORT", default_value_t = 8090)]
        port: u16,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user and print their API token
    Add {
        /// Email address
        email: String,
        /// Full name
        #[arg(short, long)]
        name: Option<String>,
        /// Grant the admin role at creation (bootstrap)
        #[arg(long)]
        admin: bool,
    },
    /// List all registered users
    List,
    /// Suspend an account (admin only)
    Suspend {
        /// Email of the account to suspend
        email: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },
    /// Reactivate a suspended account (admin only)
    Activate {
        /// Email of the account to reactivate
        email: String,
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show a profile
    Show {
        /// Email address
        email: String,
    },
    /// Edit your own profile
    Edit {
        /// Acting user's email
        #[arg(long = "as", env = "BRORESOLVE_USER")]
        actor: String,
        /// Short bio
        #[arg(short, long)]
        bio: Option<String>,
        /// Contact number
        #[arg(short, long)]
        contact: Option<String>,
        /// Path to a new avatar image (png, jpg, jpeg, gif, webp; max 2MB)
        #[arg(short, long)]
        avatar: Option<PathBuf>,
    },
}

fn find_data_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(".broresolve");
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a broresolve directory (or any parent). Run 'broresolve init' first.");
        }
    }
}

fn get_db() -> Result<Database> {
    let data_dir = find_data_dir()?;
    let db_path = data_dir.join("tracker.db");
    Database::open(&db_path).context("Failed to open database")
}

fn get_store() -> Result<BlobStore> {
    let data_dir = find_data_dir()?;
    Ok(BlobStore::open(&data_dir)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::User { action } => {
            let db = get_db()?;
            match action {
                UserCommands::Add { email, name, admin } => {
                    commands::user::add(&db, &email, name.as_deref(), admin)
                }
                UserCommands::List => commands::user::list(&db),
                UserCommands::Suspend { email, actor } => {
                    commands::user::suspend(&db, &actor, &email)
                }
                UserCommands::Activate { email, actor } => {
                    commands::user::activate(&db, &actor, &email)
                }
            }
        }

        Commands::Submit {
            text,
            actor,
            mood,
            attach,
        } => {
            let db = get_db()?;
            let store = get_store()?;
            commands::submit::run(&db, &store, &actor, &text, mood, attach.as_deref())
        }

        Commands::List {
            actor,
            category,
            priority,
            stage,
        } => {
            let db = get_db()?;
            commands::list::run(&db, &actor, category, priority, stage)
        }

        Commands::Show { reference, actor } => {
            let db = get_db()?;
            commands::show::run(&db, &actor, &reference)
        }

        Commands::Stage {
            reference,
            stage,
            actor,
        } => {
            let db = get_db()?;
            commands::stage::run(&db, &actor, &reference, stage)
        }

        Commands::Upvote { reference, actor } => {
            let db = get_db()?;
            commands::upvote::run(&db, &actor, &reference)
        }

        Commands::Promote { email, actor } => {
            let db = get_db()?;
            commands::promote::run(&db, &actor, &email)
        }

        Commands::Profile { action } => {
            let db = get_db()?;
            match action {
                ProfileCommands::Show { email } => commands::profile::show(&db, &email),
                ProfileCommands::Edit {
                    actor,
                    bio,
                    contact,
                    avatar,
                } => {
                    let store = get_store()?;
                    commands::profile::edit(
                        &db,
                        &store,
                        &actor,
                        bio.as_deref(),
                        contact.as_deref(),
                        avatar.as_deref(),
                    )
                }
            }
        }

        Commands::Serve { port } => {
            let db = get_db()?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime
                .block_on(server::serve(db, port))
                .context("Server error")
        }
    }
}
