// Calculations API - operator CLI
// Schema setup and user maintenance against the configured database

use anyhow::{bail, Context, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use calculations_api::{
    delete_user, find_user_by_username, list_users, CalculationRepository, Config, Database,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env()?;

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(&config),
        Some("users") => run_list_users(&config),
        Some("delete-user") => {
            let Some(username) = args.get(2) else {
                bail!("usage: calculations-api delete-user <username>");
            };
            run_delete_user(&config, username)
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("Calculations API {}", calculations_api::VERSION);
    println!();
    println!("USAGE:");
    println!("    calculations-api init                    Create the database schema");
    println!("    calculations-api users                   List users and their calculation counts");
    println!("    calculations-api delete-user <username>  Delete a user and all their calculations");
    println!();
    println!("The database path comes from DATABASE_PATH (default: calculations.db).");
}

fn run_init(config: &Config) -> Result<()> {
    println!("🔧 Setting up database...");
    Database::open(&config.database_path)?;
    println!("✓ Schema ready at {}", config.database_path.display());

    Ok(())
}

fn run_list_users(config: &Config) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    let rows = db.transaction(|tx| {
        let mut rows = Vec::new();
        for user in list_users(tx)? {
            let count = CalculationRepository::for_owner(tx, user.id).count()?;
            rows.push((user, count));
        }
        Ok(rows)
    })?;

    if rows.is_empty() {
        println!("No users registered.");
        return Ok(());
    }

    println!("{:<6} {:<24} {:<32} {:>12}", "ID", "USERNAME", "EMAIL", "CALCULATIONS");
    for (user, count) in rows {
        println!("{:<6} {:<24} {:<32} {:>12}", user.id, user.username, user.email, count);
    }

    Ok(())
}

fn run_delete_user(config: &Config, username: &str) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    let removed = db
        .transaction(|tx| match find_user_by_username(tx, username)? {
            Some(user) => delete_user(tx, user.id).map(Some),
            None => Ok(None),
        })
        .with_context(|| format!("Failed to delete user '{username}'"))?;

    let Some(removed) = removed else {
        bail!("No user named '{username}'");
    };

    println!("✓ Deleted user '{}' and {} calculation(s)", username, removed);

    Ok(())
}
