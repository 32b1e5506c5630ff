//! the `users` subcommand - manage users.

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail};

use super::DbArgs;
use skycourier_db::Database;
use skycourier_types::Role;

/// manage users
#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// create a new user
    Create(CreateUserArgs),

    /// grant or revoke the admin role
    Promote(PromoteUserArgs),

    /// list users
    List(ListUsersArgs),
}

/// create a new user
#[derive(Args, Debug)]
pub struct CreateUserArgs {
    #[command(flatten)]
    db: DbArgs,

    /// username
    name: String,
}

/// set a user's role
#[derive(Args, Debug)]
pub struct PromoteUserArgs {
    #[command(flatten)]
    db: DbArgs,

    /// username
    name: String,

    /// demote back to end user instead of promoting
    #[arg(long, default_value_t = false)]
    demote: bool,
}

/// list users
#[derive(Args, Debug)]
pub struct ListUsersArgs {
    #[command(flatten)]
    db: DbArgs,

    /// maximum number of users to print
    #[arg(long, default_value_t = 100)]
    limit: u64,
}

impl UsersCommand {
    /// run the users command
    pub async fn run(self) -> Result<()> {
        match self {
            UsersCommand::Create(args) => create_user(args).await,
            UsersCommand::Promote(args) => promote_user(args).await,
            UsersCommand::List(args) => list_users(args).await,
        }
    }
}

async fn create_user(args: CreateUserArgs) -> Result<()> {
    let db = args.db.connect().await?;

    if db
        .get_user_by_username(&args.name)
        .await
        .context("failed to check for existing user")?
        .is_some()
    {
        bail!("user '{}' already exists", args.name);
    }

    let created = db
        .create_user(&args.name)
        .await
        .context("failed to create user")?;

    println!("Created user:");
    println!("  ID:       {}", created.id);
    println!("  Username: {}", created.username);
    println!("  Role:     {}", created.role);
    Ok(())
}

async fn promote_user(args: PromoteUserArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let role = if args.demote { Role::EndUser } else { Role::Admin };
    db.update_role_by_username(&args.name, role)
        .await
        .with_context(|| format!("failed to update role for '{}'", args.name))?;

    println!("User '{}' now has role '{}'", args.name, role);
    Ok(())
}

async fn list_users(args: ListUsersArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let users = db
        .list_users(args.limit, 0)
        .await
        .context("failed to list users")?;

    println!("{:<8} {:<24} {:<10}", "ID", "USERNAME", "ROLE");
    for user in users {
        println!("{:<8} {:<24} {:<10}", user.id, user.username, user.role);
    }
    Ok(())
}
