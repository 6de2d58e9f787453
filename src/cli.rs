use crate::{render, review};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dealership_inventory::app::InventoryContext;
use dealership_inventory::config::AppConfig;
use dealership_inventory::error::AppError;
use dealership_inventory::inventory::{Dealership, Field, Record};
use dealership_inventory::storage::StorageError;
use dealership_inventory::telemetry;
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "dealership-inventory",
    about = "Manage vehicle inventory across the company's dealerships",
    version
)]
struct Cli {
    /// Override the configured master inventory file
    #[arg(long, global = true)]
    inventory: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show dealerships and the vehicles they hold
    List(ListArgs),
    /// Ingest a JSON, CSV or XML file into the existing dealerships
    Import {
        path: PathBuf,
        /// Correct rejected records interactively before exiting
        #[arg(long)]
        review: bool,
    },
    /// Correct records rejected while loading the inventory file
    Rejects,
    /// Write every vehicle of every dealership to a JSON file
    Export {
        path: PathBuf,
    },
    /// Create and configure dealerships
    Dealership {
        #[command(subcommand)]
        command: DealershipCommand,
    },
    /// Add, remove and rent out vehicles
    Vehicle {
        #[command(subcommand)]
        command: VehicleCommand,
    },
    /// Move a vehicle from one dealership to another
    Transfer(TransferArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Only show this dealership
    #[arg(long)]
    dealer: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum DealershipCommand {
    /// Register a new dealership
    Add {
        id: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Change a dealership's display name
    Rename { id: String, name: String },
    /// Turn acceptance of incoming vehicles on or off
    Receiving { id: String, state: Switch },
    /// Turn rental services on or off
    Renting { id: String, state: Switch },
}

#[derive(Subcommand, Debug)]
enum VehicleCommand {
    /// Add a vehicle through the manual entry path
    Add(VehicleArgs),
    /// Remove a vehicle from a dealership
    Remove {
        #[arg(long)]
        dealer: String,
        id: String,
    },
    /// Toggle whether a vehicle is offered for rent
    Rent {
        #[arg(long)]
        dealer: String,
        id: String,
    },
    /// Add a vehicle straight into a dealership's rental inventory
    AddRental(VehicleArgs),
}

#[derive(Args, Debug)]
struct VehicleArgs {
    #[arg(long)]
    dealer: String,
    #[arg(long)]
    id: String,
    /// SUV, sedan, pickup or sports car
    #[arg(long = "type")]
    kind: String,
    #[arg(long)]
    model: String,
    #[arg(long)]
    price: i64,
    #[arg(long)]
    manufacturer: Option<String>,
    /// Unit the price is expressed in, such as dollars
    #[arg(long)]
    unit: Option<String>,
    /// Acquisition date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    acquired: Option<NaiveDate>,
}

impl VehicleArgs {
    fn to_record(&self) -> Record {
        let mut record = Record::new()
            .with(Field::DealershipId, self.dealer.as_str())
            .with(Field::VehicleId, self.id.as_str())
            .with(Field::VehicleType, self.kind.as_str())
            .with(Field::VehicleModel, self.model.as_str())
            .with(Field::Price, self.price);
        record.put_valid_opt(Field::VehicleManufacturer, self.manufacturer.clone());
        record.put_valid_opt(Field::PriceUnit, self.unit.clone());
        record.put_valid_opt(
            Field::AcquisitionDate,
            self.acquired
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc().timestamp_millis()),
        );
        record
    }
}

#[derive(Args, Debug)]
struct TransferArgs {
    from: String,
    to: String,
    vehicle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    const fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(path) = cli.inventory {
        config.storage.inventory_path = path;
    }

    telemetry::init(&config.telemetry)?;
    info!(
        ?config.environment,
        path = %config.storage.inventory_path.display(),
        transfer_mode = config.storage.transfer_mode.label(),
        "inventory context starting"
    );

    let mut context = InventoryContext::open(&config.storage)?;

    match cli.command {
        Command::List(args) => list(&context, args),
        Command::Import { path, review } => {
            let outcome = context.import(&path)?;
            render::import_outcome(&outcome, context.rejects());
            if review {
                review_rejects(&mut context)?;
            }
            Ok(())
        }
        Command::Rejects => review_rejects(&mut context),
        Command::Export { path } => {
            let written = context.export(&path)?;
            println!("Exported {written} records to {}", path.display());
            Ok(())
        }
        Command::Dealership { command } => run_dealership(&mut context, command),
        Command::Vehicle { command } => run_vehicle(&mut context, command),
        Command::Transfer(TransferArgs { from, to, vehicle }) => {
            let channel = context.transfer_vehicle(&from, &to, &vehicle)?;
            println!(
                "Vehicle {vehicle} moved from {from} to the {} inventory of {to}",
                channel.label()
            );
            Ok(())
        }
    }
}

fn review_rejects(context: &mut InventoryContext) -> Result<(), AppError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    review::run(context, stdin.lock(), &mut stdout).map_err(StorageError::from)?;
    Ok(())
}

fn list(context: &InventoryContext, args: ListArgs) -> Result<(), AppError> {
    let dealerships: Vec<&Dealership> = match &args.dealer {
        Some(id) => vec![context.company().dealership(id)?],
        None => context.company().dealerships().iter().collect(),
    };

    if args.json {
        render::dealerships_json(&dealerships);
    } else {
        render::dealerships(&dealerships);
    }
    Ok(())
}

fn run_dealership(
    context: &mut InventoryContext,
    command: DealershipCommand,
) -> Result<(), AppError> {
    match command {
        DealershipCommand::Add { id, name } => {
            context.add_dealership(&id, &name)?;
            println!("Dealership {id} added");
        }
        DealershipCommand::Rename { id, name } => {
            context.rename_dealership(&id, &name)?;
            println!("Dealership {id} renamed to {name}");
        }
        DealershipCommand::Receiving { id, state } => {
            context.set_receiving(&id, state.enabled())?;
            println!("Dealership {id} receiving: {}", render::on_off(state.enabled()));
        }
        DealershipCommand::Renting { id, state } => {
            context.set_renting(&id, state.enabled())?;
            println!("Dealership {id} renting: {}", render::on_off(state.enabled()));
        }
    }
    Ok(())
}

fn run_vehicle(context: &mut InventoryContext, command: VehicleCommand) -> Result<(), AppError> {
    match command {
        VehicleCommand::Add(args) => {
            let channel = context.manual_vehicle_add(&args.to_record())?;
            println!(
                "Vehicle {} added to the {} inventory of {}",
                args.id,
                channel.label(),
                args.dealer
            );
        }
        VehicleCommand::Remove { dealer, id } => {
            if context.remove_vehicle(&dealer, &id)? {
                println!("Vehicle {id} removed from {dealer}");
            } else {
                println!("Vehicle {id} is not held by {dealer}; nothing removed");
            }
        }
        VehicleCommand::Rent { dealer, id } => {
            let channel = context.toggle_rental(&dealer, &id)?;
            println!("Vehicle {id} now in the {} inventory of {dealer}", channel.label());
        }
        VehicleCommand::AddRental(args) => {
            context.add_rental_vehicle(&args.dealer, &args.to_record())?;
            println!("Vehicle {} added to the rental inventory of {}", args.id, args.dealer);
        }
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
