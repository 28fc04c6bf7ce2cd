//! Skillgraph CLI - profession coverage trees and skill status reports

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use skillgraph_core::commands::{
    self, CoverageExport, ImportSummary, PlannedDocument, StatusExport,
};
use skillgraph_core::config::Config;
use skillgraph_core::domain::progress::{ClassifiedSkill, ProgressSource, UserProgress};
use skillgraph_core::domain::taxonomy::HierarchyEntry;
use skillgraph_core::infrastructure::age::AgeGraphClient;
use skillgraph_core::infrastructure::progress::PgProgressRepository;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "skillgraph")]
#[command(author, version, about = "Profession skill coverage over Apache AGE", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a profession's coverage tree
    Tree {
        /// Profession ID
        #[arg(short, long)]
        profession: i64,
        /// Annotate with this user's proficiency (omit for a plain export)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Classify a user's skills against a profession
    Status {
        /// Profession ID
        #[arg(short, long)]
        profession: i64,
        /// User ID
        #[arg(short, long)]
        user: i64,
    },

    /// Import taxonomy documents into the graph
    Import {
        /// A single JSON document
        #[arg(short, long, conflicts_with = "dir", required_unless_present = "dir")]
        file: Option<PathBuf>,
        /// A directory of JSON documents
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Plan only, don't write to the graph
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
    /// Reset to defaults
    Reset,
    /// Show the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skillgraph=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(err) = &result {
        if let Some(core) = err.downcast_ref::<skillgraph_core::Error>() {
            eprintln!("error[{}]: {}", core.code(), core);
            if let Some(hint) = core.suggestion() {
                eprintln!("  try: {}", hint);
            }
            std::process::exit(1);
        }
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Tree { profession, user } => {
            cmd_tree(profession, user, cli.format, cli.quiet).await
        }
        Commands::Status { profession, user } => {
            cmd_status(profession, user, cli.format, cli.quiet).await
        }
        Commands::Import { file, dir, dry_run } => {
            cmd_import(file, dir, dry_run, cli.format, cli.quiet).await
        }
        Commands::Config { action } => cmd_config(action, cli.quiet),
        Commands::Doctor => cmd_doctor(cli.quiet).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn connect(config: &Config) -> anyhow::Result<AgeGraphClient> {
    let url = config.graph.require_database_url()?;
    Ok(AgeGraphClient::connect(&config.graph, &url).await?)
}

async fn load_progress(client: &AgeGraphClient, user: i64) -> anyhow::Result<UserProgress> {
    let pool = client.database().pool().clone();
    let repo = PgProgressRepository::new(pool, client.query_timeout());
    Ok(repo.load_user_progress(user).await?)
}

async fn cmd_tree(
    profession: i64,
    user: Option<i64>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = connect(&config).await?;

    let fetched = async {
        let snapshot = commands::load_taxonomy(&client, profession).await?;
        let progress = match user {
            Some(user) => load_progress(&client, user).await?,
            None => UserProgress::empty(),
        };
        Ok::<_, anyhow::Error>((snapshot, progress))
    }
    .await;
    client.close().await;
    let (snapshot, progress) = fetched?;
    let export = commands::coverage_tree_of(snapshot, &progress)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&export)?),
        OutputFormat::Text => print_tree(&export, quiet),
    }
    Ok(())
}

async fn cmd_status(
    profession: i64,
    user: i64,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = connect(&config).await?;

    let fetched = async {
        let snapshot = commands::load_taxonomy(&client, profession).await?;
        let progress = load_progress(&client, user).await?;
        Ok::<_, anyhow::Error>((snapshot, progress))
    }
    .await;
    client.close().await;
    let (snapshot, progress) = fetched?;
    let export = commands::classify_snapshot(snapshot, &progress, config.progress.unknown_status)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&export)?),
        OutputFormat::Text => print_status(&export, quiet),
    }
    Ok(())
}

async fn cmd_import(
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    dry_run: bool,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let documents = match (file, dir) {
        (Some(file), _) => vec![commands::plan_file(&file)?],
        (None, Some(dir)) => commands::plan_directory(&dir)?,
        (None, None) => anyhow::bail!("Pass --file or --dir"),
    };

    if dry_run {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&documents)?),
            OutputFormat::Text => print_plan(&documents, quiet),
        }
        return Ok(());
    }

    let config = Config::load()?;
    let client = connect(&config).await?;
    let result = commands::import_documents(&client, &documents).await;
    client.close().await;
    let summary = result?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print_import(&summary, quiet),
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("Skillgraph Health Check");
        println!("=======================");
        println!();
    }

    let mut all_ok = true;

    let config = match Config::load() {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            Some(config)
        }
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
            }
            None
        }
    };

    let url = match config.as_ref().map(|c| c.graph.resolved_database_url()) {
        Some(Ok(Some(url))) => {
            if !quiet {
                let redacted = skillgraph_core::config::redact_url(&url);
                println!("[OK] Database URL: Configured ({})", redacted);
            }
            Some(url)
        }
        Some(Ok(None)) => {
            all_ok = false;
            if !quiet {
                warn!("Database URL: Not configured");
                println!("[!!] Database URL: Not configured");
                println!("     Set SKILLGRAPH_DATABASE_URL or DATABASE_URL environment variable");
            }
            None
        }
        Some(Err(e)) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database URL: Error - {}", e);
            }
            None
        }
        None => None,
    };

    if let (Some(config), Some(url)) = (config.as_ref(), url) {
        match AgeGraphClient::connect(&config.graph, &url).await {
            Ok(client) => {
                match client.database().health_check().await {
                    Ok(()) => {
                        if !quiet {
                            println!("[OK] Database: Connected");
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Health check failed - {}", e);
                        }
                    }
                }
                match client.graph_exists().await {
                    Ok(true) => {
                        if !quiet {
                            println!("[OK] Graph: '{}' exists", client.graph_name());
                        }
                    }
                    Ok(false) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Graph: '{}' not found", client.graph_name());
                            println!("     Run `skillgraph import` to create it");
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Graph: Check failed - {}", e);
                        }
                    }
                }
                client.close().await;
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Failed to connect - {}", e);
                }
            }
        }
    }

    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}

// ============================================================================
// Text Output
// ============================================================================

fn print_tree(export: &CoverageExport, quiet: bool) {
    if export.tree.is_empty() {
        if !quiet {
            println!("No professions found.");
        }
        return;
    }
    for (name, entry) in export.tree.professions() {
        print_entry(name, entry, 0);
    }
    if !export.degraded.is_empty() && !quiet {
        println!();
        println!("{} row(s) could not be decoded and were skipped.", export.degraded.len());
    }
}

fn print_entry(name: &str, entry: &HierarchyEntry, depth: usize) {
    println!(
        "{}{}  {}/{} ({}%)",
        "  ".repeat(depth),
        name,
        entry.user_proficiency,
        entry.count,
        entry.percent
    );
    for (child_name, child) in entry.children() {
        print_entry(child_name, child, depth + 1);
    }
}

fn print_status(export: &StatusExport, quiet: bool) {
    let report = &export.report;
    let sections: [(&str, &[ClassifiedSkill]); 3] = [
        ("In progress", &report.process),
        ("Not started", &report.inactive),
        ("Completed", &report.complete),
    ];
    for (title, skills) in sections {
        println!("{} ({})", title, skills.len());
        for skill in skills {
            println!(
                "  {}  {}/{} ({}%)",
                skill.name, skill.proficiency, skill.count, skill.percent
            );
        }
    }
    println!("Gray zone ({})", report.gray_zone.len());
    for skill in &report.gray_zone {
        println!("  {}  0/{}", skill.name, skill.count);
    }
    if !quiet && !report.rejected.is_empty() {
        println!();
        println!("{} skill(s) with an unknown status were left out:", report.rejected.len());
        for skill in &report.rejected {
            println!("  {} (status '{}')", skill.name, skill.status);
        }
    }
}

fn print_plan(documents: &[PlannedDocument], quiet: bool) {
    for document in documents {
        println!("{}", document.path.display());
        for profession in &document.plan.professions {
            println!(
                "  {}: {} node(s), {} link(s)",
                profession.name,
                profession.nodes.len() + 1,
                profession.links.len()
            );
        }
    }
    if !quiet {
        println!();
        println!("Dry run: nothing was written.");
    }
}

fn print_import(summary: &ImportSummary, quiet: bool) {
    if summary.graph_created {
        info!("Graph created");
    }
    for profession in &summary.professions {
        println!(
            "{} (id {}): {} node(s), {} link(s)",
            profession.name, profession.profession_id, profession.nodes, profession.links
        );
    }
    if !quiet {
        println!();
        println!(
            "Imported {} profession(s): {} node(s), {} link(s).",
            summary.professions.len(),
            summary.node_count(),
            summary.link_count()
        );
    }
}
