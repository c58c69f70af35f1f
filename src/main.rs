mod commands;
mod config;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use satchel_inventory::persist::DEFAULT_SAVE_CLASS;
use satchel_inventory::{
    DiskStore, Inventory, InventorySettings, LoadSource, PersistenceStrategy, SaveContext,
    SaveTarget,
};
use tracing::info;

use crate::commands::{execute_command, parse_script, render_slots, CommandContext};
use crate::config::{CliConfig, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and edit satchel inventory saves", long_about = None)]
struct Args {
    /// Configuration file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Save directory; overrides the config file
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Inventory settings file (TOML); replaces the config's `[settings]`
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Save class (sub-directory of the save directory)
    #[arg(long, default_value = DEFAULT_SAVE_CLASS)]
    class: String,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved inventories
    List,
    /// Print the slots of a saved inventory
    Show { slot: String },
    /// Delete a saved inventory
    Remove { slot: String },
    /// Apply a command script to a saved inventory and save it back
    Run {
        slot: String,
        script: PathBuf,
        /// Slot count when the inventory does not exist yet
        #[arg(long)]
        capacity: Option<usize>,
    },
    /// Write the effective configuration to the config path (and the
    /// settings to `--settings`, when given)
    InitConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = CliConfig::load_from_path(&args.config);
    if let Some(dir) = args.save_dir.clone() {
        config.save_dir = dir;
    }
    if let Some(path) = &args.settings {
        config.settings = InventorySettings::load_from_path(path);
    }

    match args.command {
        Command::List => {
            let store = open_store(&config, &args.class)?;
            for slot in store.list_slots()? {
                println!("{slot}");
            }
        }
        Command::Show { slot } => {
            let store = open_store(&config, &args.class)?;
            let payload = store
                .load(&slot)
                .with_context(|| format!("failed to read slot {slot}"))?
                .with_context(|| format!("no saved inventory named {slot}"))?;
            println!("{slot}: {} slots", payload.capacity);
            for line in render_slots(&payload.slots) {
                println!("  {line}");
            }
        }
        Command::Remove { slot } => {
            let store = open_store(&config, &args.class)?;
            if !store.delete(&slot)? {
                bail!("no saved inventory named {slot}");
            }
            println!("Removed {slot}");
        }
        Command::Run {
            slot,
            script,
            capacity,
        } => run_script(&config, &args.class, &slot, &script, capacity)?,
        Command::InitConfig => {
            config.save_to_path(&args.config)?;
            println!("Wrote {}", args.config.display());
            if let Some(path) = &args.settings {
                config
                    .settings
                    .save_to_path(path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn open_store(config: &CliConfig, class: &str) -> Result<DiskStore> {
    let root = DiskStore::new(&config.save_dir).with_context(|| {
        format!("failed to open save directory {}", config.save_dir.display())
    })?;
    Ok(root.scoped(class)?)
}

fn run_script(
    config: &CliConfig,
    class: &str,
    slot: &str,
    script: &Path,
    capacity: Option<usize>,
) -> Result<()> {
    let text = fs::read_to_string(script)
        .with_context(|| format!("failed to read script {}", script.display()))?;
    let commands = parse_script(&text)?;
    let catalog = config.load_catalog()?;
    let settings = Arc::new(config.settings.clone());

    let disk = DiskStore::new(&config.save_dir)?;
    let strategy = PersistenceStrategy::disk()
        .with_save_id(slot)
        .with_save_class(class);
    let mut inventory = Inventory::with_settings(
        capacity.unwrap_or(config.default_capacity),
        Arc::clone(&settings),
    )
    .with_persistence(strategy);

    let mut ctx = SaveContext::detached().with_disk(&disk);
    match inventory.activate(&mut ctx) {
        Some(LoadSource::Disk) => info!(slot, "loaded existing inventory"),
        _ => info!(slot, capacity = inventory.capacity(), "starting new inventory"),
    }

    let cmd_ctx = CommandContext {
        catalog: &catalog,
        settings: &settings,
    };
    for cmd in commands {
        for line in execute_command(&mut inventory, &cmd_ctx, cmd).lines {
            println!("{line}");
        }
    }

    if !inventory.save_to(SaveTarget::Disk, &mut ctx) {
        bail!("failed to save {slot} (see log; auto_save_on_transition may be off)");
    }
    println!("Saved {slot}");
    Ok(())
}
