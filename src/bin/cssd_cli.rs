use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use cssd_api::{
    config::{self, AppConfig},
    resources::Resource,
    services::{
        search::ListFilter,
        seed::{reset, seed},
        RecordService, ReportService,
    },
    store::{FileStore, ResourceStore},
};

#[derive(Parser)]
#[command(name = "cssd-cli", about = "Maintenance tool for the CSSD data files", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[arg(long, global = true, help = "Data directory (overrides configuration)")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing collection files as empty arrays
    Init,
    /// Write sample data into empty collections
    Seed {
        #[arg(long, action = ArgAction::SetTrue, help = "Overwrite collections that already hold data")]
        force: bool,
    },
    /// Empty every collection
    Reset,
    /// Print one collection
    List {
        #[arg(value_parser = parse_resource)]
        resource: Resource,
    },
    /// Print the dashboard counters
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize(cli.data_dir.clone())?;

    match cli.command {
        Commands::Init => handle_init(&context, cli.json).await?,
        Commands::Seed { force } => handle_seed(&context, force, cli.json).await?,
        Commands::Reset => handle_reset(&context).await?,
        Commands::List { resource } => handle_list(&context, resource).await?,
        Commands::Stats => handle_stats(&context, cli.json).await?,
    }

    Ok(())
}

struct CliContext {
    config: AppConfig,
    file_store: Option<FileStore>,
    records: RecordService,
}

impl CliContext {
    fn initialize(data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        if let Some(dir) = data_dir {
            config.data_dir = dir;
        }

        let file_store =
            (!config.uses_memory_store()).then(|| FileStore::new(config.data_dir.clone()));
        let store: Arc<dyn ResourceStore> = match &file_store {
            Some(store) => Arc::new(store.clone()),
            None => cssd_api::build_store(&config),
        };
        debug!(
            target: "cssd_cli",
            backend = store.kind(),
            data_dir = %config.data_dir.display(),
            "store ready"
        );

        Ok(Self {
            records: RecordService::new(store),
            file_store,
            config,
        })
    }

    /// Creates missing files so later reads do not fail.
    async fn ensure_files(&self) -> Result<Vec<Resource>> {
        match &self.file_store {
            Some(store) => store.init().await.with_context(|| {
                format!("failed to initialise {}", self.config.data_dir.display())
            }),
            None => Ok(Vec::new()),
        }
    }
}

async fn handle_init(context: &CliContext, json: bool) -> Result<()> {
    let created = context.ensure_files().await?;
    let names: Vec<&str> = created.iter().map(|resource| resource.name()).collect();

    if json {
        print_json(&names)?;
    } else if names.is_empty() {
        println!("All collections already exist in {}", context.config.data_dir.display());
    } else {
        for name in names {
            println!("Created {}.json", name);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct SeededCollection<'a> {
    resource: &'a str,
    records: usize,
}

async fn handle_seed(context: &CliContext, force: bool, json: bool) -> Result<()> {
    context.ensure_files().await?;
    let seeded = seed(&context.records, force)
        .await
        .context("failed to seed sample data")?;

    if json {
        let rows: Vec<_> = seeded
            .iter()
            .map(|(resource, records)| SeededCollection {
                resource: resource.name(),
                records: *records,
            })
            .collect();
        print_json(&rows)?;
    } else if seeded.is_empty() {
        println!("Nothing seeded; collections already hold data (use --force to overwrite)");
    } else {
        for (resource, count) in seeded {
            println!("- {} • {} records", resource, count);
        }
    }
    Ok(())
}

async fn handle_reset(context: &CliContext) -> Result<()> {
    context.ensure_files().await?;
    reset(&context.records)
        .await
        .context("failed to clear collections")?;
    println!("All collections cleared");
    Ok(())
}

async fn handle_list(context: &CliContext, resource: Resource) -> Result<()> {
    let records = context
        .records
        .list(resource, &ListFilter::default())
        .await
        .with_context(|| format!("failed to read {}", resource))?;
    print_json(&records)
}

async fn handle_stats(context: &CliContext, json: bool) -> Result<()> {
    let stats = ReportService::new(context.records.clone())
        .dashboard()
        .await
        .context("failed to compute dashboard stats")?;

    if json {
        return print_json(&stats);
    }
    println!("Active requests:            {}", stats.active_requests);
    println!("Sterilization in progress:  {}", stats.sterilization_in_progress);
    println!("Items ready:                {}", stats.items_ready);
    println!("Low stock items:            {}", stats.low_stock_items);
    println!("Total requests:             {}", stats.total_requests);
    println!("Total received:             {}", stats.total_received);
    println!("Total issued:               {}", stats.total_issued);
    Ok(())
}

fn parse_resource(raw: &str) -> Result<Resource> {
    Resource::from_str(raw).map_err(|_| {
        let names: Vec<&str> = Resource::all().map(Resource::name).collect();
        anyhow!("unknown resource '{}'; expected one of: {}", raw, names.join(", "))
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
