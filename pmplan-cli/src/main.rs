//! pmplan CLI - author PMBOK-style project management plans
//!
//! Keeps one plan in a local database and exports it as JSON, CSV, a Word
//! document or a paginated layout for PDF tools.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pmplan_core::{Catalog, Config, TemplateLibrary};
use pmplan_store::Database;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    AddArgs, CatalogArgs, DetailsArgs, EditArgs, ExportArgs, ImportArgs, InitArgs, ManagerArgs,
    SectionAction, SectionArgs, Session, ShowArgs, TeamArgs, TemplatesArgs,
};

/// pmplan: project management plan authoring
#[derive(Parser, Debug)]
#[command(name = "pmplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Plan database file (overrides config and env)
    #[arg(long, global = true, env = "PMPLAN_DB")]
    db: Option<PathBuf>,

    /// Section catalog TOML (overrides config and env)
    #[arg(long, global = true, env = "PMPLAN_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Show current configuration
    Config,

    /// List the section catalog
    Catalog(CatalogArgs),

    /// List plan templates
    Templates(TemplatesArgs),

    /// Start a new plan from a template
    Init(InitArgs),

    /// Restore the default template
    Reset,

    /// Show the plan or one section
    #[command(visible_alias = "s")]
    Show(ShowArgs),

    /// Edit title, description, methodology or status
    Details(DetailsArgs),

    /// Set section field values
    #[command(visible_alias = "e")]
    Edit(EditArgs),

    /// Add a custom section
    Add(AddArgs),

    /// Hide a section, keeping its content
    Delete(SectionArgs),

    /// Remove a section and its content
    Purge(SectionArgs),

    /// Show or hide a section
    Toggle(SectionArgs),

    /// Show or set the plan manager
    Manager(ManagerArgs),

    /// Sign in, invite and list collaborators
    Team(TeamArgs),

    /// Export the plan
    #[command(visible_alias = "x")]
    Export(ExportArgs),

    /// Replace the plan with a JSON export
    Import(ImportArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.db.clone(), cli.catalog.clone())?;

    if cli.verbose {
        tracing::info!(
            database = ?config.storage.database_path,
            catalog = ?config.catalog.path,
            output_dir = %config.export.output_dir.display(),
            "Configuration loaded"
        );
    }

    let Some(command) = cli.command else {
        println!("pmplan - project management plan authoring");
        println!();
        println!("Use --help for usage information");
        return Ok(());
    };

    match command {
        Commands::Version => {
            println!("pmplan {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Config => print_config(&config)?,
        Commands::Catalog(args) => {
            let catalog = Catalog::load(config.catalog.path.as_deref())?;
            args.execute(&catalog)?;
        }
        Commands::Templates(args) => {
            args.execute(&TemplateLibrary::builtin()?)?;
        }
        command => {
            let session = Session::open(&config, cli.verbose).await?;
            run(command, &session, cli.verbose).await?;
        }
    }

    Ok(())
}

/// Commands that work on the stored plan
async fn run(command: Commands, session: &Session, verbose: bool) -> anyhow::Result<()> {
    match command {
        Commands::Init(args) => args.execute(session).await,
        Commands::Reset => commands::plan::reset(session).await,
        Commands::Show(args) => args.execute(session, verbose).await,
        Commands::Details(args) => args.execute(session).await,
        Commands::Edit(args) => args.execute(session).await,
        Commands::Add(args) => args.execute(session).await,
        Commands::Delete(args) => args.execute(session, SectionAction::Delete).await,
        Commands::Purge(args) => args.execute(session, SectionAction::Purge).await,
        Commands::Toggle(args) => args.execute(session, SectionAction::Toggle).await,
        Commands::Manager(args) => args.execute(session).await,
        Commands::Team(args) => args.execute(session, verbose).await,
        Commands::Export(args) => args.execute(session, verbose).await,
        Commands::Import(args) => args.execute(session).await,
        Commands::Version | Commands::Config | Commands::Catalog(_) | Commands::Templates(_) => {
            Ok(())
        }
    }
}

fn print_config(config: &Config) -> anyhow::Result<()> {
    println!("pmplan Configuration");
    println!("====================");
    println!();
    println!("Storage:");
    match &config.storage.database_path {
        Some(path) => println!("  database_path: {}", path.display()),
        None => println!("  database_path: {} (default)", Database::default_path()?.display()),
    }
    println!();
    println!("Export:");
    println!("  output_dir: {}", config.export.output_dir.display());
    println!("  file_stem: {}", config.export.file_stem);
    println!("  wrap_width: {}", config.export.wrap_width);
    println!(
        "  author: {}",
        config.export.author.as_deref().unwrap_or("(manager name)")
    );
    println!();
    println!("Catalog:");
    match &config.catalog.path {
        Some(path) => println!("  path: {}", path.display()),
        None => println!("  path: (built-in)"),
    }
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
    Ok(())
}
