//! the `drones` subcommand - manage the fleet.

use clap::{Args, Subcommand};
use color_eyre::eyre::{Context, Result, bail};

use super::DbArgs;
use skycourier_db::{Database, ListDronesAdminParams};
use skycourier_types::{Coordinates, Drone, DroneId};

/// manage drones
#[derive(Subcommand, Debug)]
pub enum DronesCommand {
    /// register a new drone
    Create(CreateDroneArgs),

    /// list drones
    List(ListDronesArgs),
}

/// register a new drone
#[derive(Args, Debug)]
pub struct CreateDroneArgs {
    #[command(flatten)]
    db: DbArgs,

    /// display name
    name: String,

    /// unique serial number
    serial: String,

    /// initial latitude
    #[arg(long, default_value_t = 0.0)]
    lat: f64,

    /// initial longitude
    #[arg(long, default_value_t = 0.0)]
    lng: f64,
}

/// list drones
#[derive(Args, Debug)]
pub struct ListDronesArgs {
    #[command(flatten)]
    db: DbArgs,

    /// maximum number of drones to print
    #[arg(long, default_value_t = 100)]
    limit: u64,
}

impl DronesCommand {
    /// run the drones command
    pub async fn run(self) -> Result<()> {
        match self {
            DronesCommand::Create(args) => create_drone(args).await,
            DronesCommand::List(args) => list_drones(args).await,
        }
    }
}

async fn create_drone(args: CreateDroneArgs) -> Result<()> {
    let db = args.db.connect().await?;

    if db
        .get_drone_by_serial(&args.serial)
        .await
        .context("failed to check for existing drone")?
        .is_some()
    {
        bail!("drone with serial '{}' already exists", args.serial);
    }

    let drone = Drone::new(
        DroneId(0),
        args.name,
        args.serial,
        Coordinates::new(args.lat, args.lng),
    );
    let created = db
        .create_drone(&drone)
        .await
        .context("failed to create drone")?;

    println!("Created drone:");
    println!("  ID:     {}", created.id);
    println!("  Name:   {}", created.name);
    println!("  Serial: {}", created.serial_number);
    println!("  Status: {}", created.status);
    Ok(())
}

async fn list_drones(args: ListDronesArgs) -> Result<()> {
    let db = args.db.connect().await?;

    let drones = db
        .list_drones_admin(ListDronesAdminParams {
            page_size: args.limit,
            ..Default::default()
        })
        .await
        .context("failed to list drones")?;

    println!(
        "{:<8} {:<20} {:<16} {:<10} {:<10}",
        "ID", "NAME", "SERIAL", "STATUS", "ASSIGNED"
    );
    for drone in drones {
        println!(
            "{:<8} {:<20} {:<16} {:<10} {:<10}",
            drone.id,
            drone.name,
            drone.serial_number,
            drone.status,
            drone
                .assigned_job
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}
