//! CLI entry point for storefront-admin: admin account management tool.
//!
//! Operates on the SQLite database directly, without going through the
//! HTTP API. Useful for initial provisioning and lockout recovery.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storefront::auth;
use storefront::store::store::now_rfc3339;
use storefront::store::{AdminRecord, DocumentStore, SqliteStore};

#[derive(Parser)]
#[command(name = "storefront-admin", about = "Storefront admin account tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account if its username does not exist yet
    Seed {
        #[arg(long, default_value = "storefront.example.yaml")]
        config: PathBuf,
        #[arg(long)]
        db: Option<String>,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Reset an existing admin's password
    SetPassword {
        #[arg(long, default_value = "storefront.example.yaml")]
        config: PathBuf,
        #[arg(long)]
        db: Option<String>,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

fn resolve_db_path(config_path: &PathBuf) -> Result<String, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(config_path)?;
    let raw: serde_yaml::Value = serde_yaml::from_str(&content)?;
    let path = raw
        .get("database")
        .and_then(|d| d.get("path"))
        .and_then(|p| p.as_str())
        .unwrap_or("./data/storefront.db");
    Ok(path.to_string())
}

fn open_store(config: &PathBuf, db: Option<String>) -> Result<SqliteStore, i32> {
    let db_path = match db {
        Some(p) => p,
        None => match resolve_db_path(config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error reading config: {}", e);
                return Err(1);
            }
        },
    };
    match SqliteStore::new(&db_path) {
        Ok(store) => Ok(store),
        Err(e) => {
            eprintln!("Error opening database: {}", e);
            Err(1)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let rc = match cli.command {
        Commands::Seed {
            config,
            db,
            username,
            password,
        } => run_seed(config, db, username, password).await,
        Commands::SetPassword {
            config,
            db,
            username,
            password,
        } => run_set_password(config, db, username, password).await,
    };
    std::process::exit(rc);
}

async fn run_seed(config: PathBuf, db: Option<String>, username: String, password: String) -> i32 {
    if password.len() < auth::MIN_PASSWORD_LENGTH {
        eprintln!(
            "Error: password must be at least {} characters",
            auth::MIN_PASSWORD_LENGTH
        );
        return 1;
    }

    let store = match open_store(&config, db) {
        Ok(s) => s,
        Err(rc) => return rc,
    };

    let password_hash = match auth::hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            return 1;
        }
    };

    let now = now_rfc3339();
    let record = AdminRecord {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.clone(),
        password_hash,
        created_at: now.clone(),
        updated_at: now,
    };
    if let Err(e) = store.seed_admin(record).await {
        eprintln!("Error seeding admin: {}", e);
        return 1;
    }

    eprintln!("Admin '{}' is present", username);
    0
}

async fn run_set_password(
    config: PathBuf,
    db: Option<String>,
    username: String,
    password: String,
) -> i32 {
    if password.len() < auth::MIN_PASSWORD_LENGTH {
        eprintln!(
            "Error: password must be at least {} characters",
            auth::MIN_PASSWORD_LENGTH
        );
        return 1;
    }

    let store = match open_store(&config, db) {
        Ok(s) => s,
        Err(rc) => return rc,
    };

    let mut admin = match store.get_admin_by_username(&username).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            eprintln!("Error: no admin named '{}'", username);
            return 1;
        }
        Err(e) => {
            eprintln!("Error loading admin: {}", e);
            return 1;
        }
    };

    admin.password_hash = match auth::hash_password(&password) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            return 1;
        }
    };
    admin.updated_at = now_rfc3339();

    if let Err(e) = store.update_admin(admin).await {
        eprintln!("Error updating admin: {}", e);
        return 1;
    }

    eprintln!("Password updated for '{}'", username);
    0
}
