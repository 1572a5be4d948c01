//! rpgtrack - command line access to a conversation's character tracker.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rpgtrack_domain::create_empty_state;
use rpgtrack_engine::infrastructure::settings::{SaveMode, Settings};
use rpgtrack_engine::App;

#[derive(Parser)]
#[command(
    name = "rpgtrack",
    version,
    about = "Inspect and edit the character tracker stored with a conversation"
)]
struct Cli {
    /// Directory holding conversation files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Conversation to open
    #[arg(short, long)]
    conversation: Option<String>,

    /// Metadata key the tracker document lives under
    #[arg(long)]
    storage_key: Option<String>,

    /// Save mode: immediate or debounced
    #[arg(long)]
    save_mode: Option<SaveMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the document, or the value at a dotted path
    Show { path: Option<String> },

    /// Set the value at a dotted path (JSON, or a bare string)
    Set { path: String, value: String },

    /// Deep-merge a JSON object into the document
    Merge { json: String },

    /// Replace the document with a fresh default one
    Reset,

    /// Recompute derived stats from the current attributes
    Recalc,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpgtrack_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = apply_overrides(Settings::from_env(), &cli);

    let app = App::open(settings)
        .await
        .context("Failed to open conversation storage")?;
    let result = run(&app, cli.command).await;
    app.shutdown().await;
    result
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    let state = &app.state;

    match command {
        Command::Show { path: None } => {
            let document = state.get_state().await;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Show { path: Some(path) } => match state.get_field(&path).await {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => bail!("Nothing stored at '{path}'"),
        },
        Command::Set { path, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            if !state.update_field(&path, value).await {
                bail!("Update of '{path}' was not applied");
            }
        }
        Command::Merge { json } => {
            let partial: Value =
                serde_json::from_str(&json).context("Merge input is not valid JSON")?;
            if !partial.is_object() {
                bail!("Merge input must be a JSON object");
            }
            if !state.update_state(partial).await {
                bail!("Merge was not applied");
            }
        }
        Command::Reset => {
            if !state.set_state(create_empty_state()).await {
                bail!("Reset was not applied");
            }
        }
        Command::Recalc => {
            let stats = state.recalculate_derived_stats().await;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(data_dir) = &cli.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(conversation) = &cli.conversation {
        settings.conversation = conversation.clone();
    }
    if let Some(storage_key) = &cli.storage_key {
        settings.storage_key = storage_key.clone();
    }
    if let Some(save_mode) = cli.save_mode {
        settings.save_mode = save_mode;
    }
    settings
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides, then the working directory.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
    let _ = dotenvy::dotenv();
}
