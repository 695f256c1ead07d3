//! Command handlers behind the CLI.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{Cli, Command};
use crate::config::{self, Config, ConfigStore};
use crate::error::{Result, SyncError};
use crate::fs::local::{current_username, default_saves_dir, OsFamily};
use crate::fs::{ObjectStore, OpendalStore};
use crate::prompt::{prompt_value, run_blocking, PromptSelector};
use crate::sync::{summary, EngineConfig, Selector, SyncEngine, SyncOutcome};

/// Paths resolved from the global options.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config_file: PathBuf,
    pub saves_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Paths {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_file: cli.config.clone().unwrap_or_else(config::default_config_path),
            saves_dir: cli
                .saves_dir
                .clone()
                .unwrap_or_else(|| default_saves_dir(OsFamily::current(), &current_username())),
            scratch_dir: cli.scratch_dir.clone().unwrap_or_else(std::env::temp_dir),
        }
    }
}

/// Run the chosen command against real stdin/stdout and S3.
pub async fn run(cli: &Cli) -> Result<()> {
    let paths = Paths::from_cli(cli);
    let store = ConfigStore::new(&paths.config_file);
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::GetConfig => print_config(&store, &mut stdout),
        Command::SetupConfig => {
            run_blocking(move || {
                let stdin = std::io::stdin();
                setup_config(&store, &mut stdin.lock(), &mut std::io::stdout())
            })
            .await
        }
        Command::Save => {
            let engine = engine_for(&store, &paths)?;
            save(&engine, &PromptSelector, &mut stdout).await
        }
        Command::Pull => {
            let engine = engine_for(&store, &paths)?;
            pull(&engine, &PromptSelector, &mut stdout).await
        }
    }
}

fn engine_for(store: &ConfigStore, paths: &Paths) -> Result<SyncEngine> {
    let config = store.load()?;
    let object_store: Arc<dyn ObjectStore> = Arc::new(OpendalStore::from_config(&config)?);
    Ok(SyncEngine::new(
        object_store,
        EngineConfig::new(&paths.saves_dir, &paths.scratch_dir),
    ))
}

/// Print the stored config verbatim, or "Not configured!".
pub fn print_config<W: Write>(store: &ConfigStore, out: &mut W) -> Result<()> {
    let text = store.read_raw()?;
    let line = text.as_deref().unwrap_or("Not configured!");
    writeln!(out, "{}", line).map_err(|e| SyncError::from_io_error(e, "writing output", None))
}

/// Ask for each config value in turn and persist the result.
///
/// An empty answer at any required prompt stops without writing anything.
/// The endpoint prompt is optional: an empty answer there means AWS.
pub fn setup_config<R: BufRead, W: Write>(store: &ConfigStore, input: &mut R, out: &mut W) -> Result<()> {
    let Some(access_key_id) = prompt_value(input, out, "Provide AWS Access Key Id", config::validate_access_key_id)? else {
        return Ok(());
    };
    let Some(secret_access_key) =
        prompt_value(input, out, "Provide AWS Secret Access Key", config::validate_secret_access_key)?
    else {
        return Ok(());
    };
    let Some(region) = prompt_value(input, out, "Provide AWS region", config::validate_region)? else {
        return Ok(());
    };
    let Some(bucket) = prompt_value(input, out, "Provide AWS bucket", config::validate_bucket)? else {
        return Ok(());
    };

    let endpoint = prompt_value(
        input,
        out,
        "Provide S3 endpoint (empty for AWS)",
        config::validate_endpoint,
    )?;

    let config = Config::new(&access_key_id, &secret_access_key, &region, &bucket)?.with_endpoint(endpoint);
    store.save(&config)?;
    writeln!(out, "Config has been saved!").map_err(|e| SyncError::from_io_error(e, "writing output", None))
}

/// Save flow plus its user-facing messages.
pub async fn save<W: Write>(engine: &SyncEngine, selector: &dyn Selector, out: &mut W) -> Result<()> {
    let outcome = engine.save(selector).await?;
    report(out, outcome, "Saved worlds", || {
        format!("No worlds found in {}", engine.config().saves_dir.display())
    })
}

/// Pull flow plus its user-facing messages.
pub async fn pull<W: Write>(engine: &SyncEngine, selector: &dyn Selector, out: &mut W) -> Result<()> {
    let outcome = engine.pull(selector).await?;
    report(out, outcome, "Pulled worlds", || "No worlds found in bucket".to_string())
}

fn report<W: Write>(out: &mut W, outcome: SyncOutcome, title: &str, nothing: impl FnOnce() -> String) -> Result<()> {
    let text = match outcome {
        SyncOutcome::Completed(names) => summary(title, &names),
        SyncOutcome::NothingFound => nothing(),
        SyncOutcome::Cancelled => return Ok(()),
    };
    writeln!(out, "{}", text).map_err(|e| SyncError::from_io_error(e, "writing output", None))
}
