//! CLI command handler: build the request, run it, reply to the invoking user.

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::engine::arg_parser::{Cli, Commands};
use crate::engine::handlers::{request_from_args, request_from_config};
use crate::engine::progress::{create_counter, set_counter};
use crate::engine::replies::{list_chunks, progress_reply, summary_reply};
use crate::notify::{BotNotifier, NotificationGateway};
use crate::pipeline::{CancelToken, RunParams, run};
use crate::store::{ChannelStore, open_db};
use crate::types::{ExitReason, RunMode, RunResult};
use crate::utils::config::PackagePaths;
use crate::utils::{Colors, load_archiver_toml, setup_logging};

/// Ephemeral replies from the CLI go to the terminal; these stand in for the invoking channel/user.
const CLI_CHANNEL: &str = "cli";

fn cli_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "admin".to_string())
}

/// `--db`, else `CHANARCHIVER_DB` from the process env or a `.env` in the working directory.
fn resolve_db_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref p) = cli.db {
        return Ok(p.clone());
    }
    let _ = dotenvy::dotenv();
    let key = PackagePaths::get().env_db_key();
    std::env::var(key)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("no database given: pass --db or set {key}"))
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| Path::new(".").join(PackagePaths::get().config_filename()))
}

/// Run the selected command. Returns false when the run ended with an error (reply already sent).
pub fn handle_run(cli: &Cli) -> Result<bool> {
    setup_logging(cli.verbose);
    let config = load_archiver_toml(&config_path(cli))?.archiver;

    let request = match cli.command {
        Commands::Archive(ref args) => request_from_args(args, false, &config),
        Commands::List(ref args) => request_from_args(args, true, &config),
        Commands::Scheduled => request_from_config(&config)?,
    };

    let db_path = resolve_db_path(cli)?;
    debug!("Database: {}", db_path.display());
    let store = open_db(&db_path)?;
    let notifier = BotNotifier::new(&store);
    let user = cli_user();

    // Refuse to run with a report destination that does not exist.
    let admin_name = match request.criteria.admin_channel_id {
        Some(ref id) => Some(
            store
                .get_channel(id)
                .with_context(|| format!("failed to get admin channel {id}"))?
                .name,
        ),
        None => None,
    };

    if request.mode == RunMode::Archive {
        warn!(
            "Archiving channels inactive for more than {} days. Press Ctrl+C to stop after the current channel.",
            request.criteria.age_in_days
        );
    }

    let cancel = CancelToken::new();
    cancel.install_ctrlc_handler()?;

    let on_progress: Option<Box<dyn FnMut(&RunResult) + '_>> = match request.mode {
        RunMode::List => None,
        RunMode::Archive => {
            let mut counter = cli.verbose.then(|| create_counter("Archiving"));
            let notifier = &notifier;
            let user = user.as_str();
            Some(Box::new(move |result: &RunResult| {
                debug!("archived_count={}", result.count());
                if let Some(ref mut bar) = counter {
                    set_counter(bar, result.count());
                }
                let _ = notifier.send_ephemeral_reply(CLI_CHANNEL, user, &progress_reply(result.count()));
            }))
        }
    };

    let outcome = run(
        &request,
        RunParams {
            store: &store,
            gateway: Some(&notifier),
            cancel: &cancel,
            on_progress,
        },
    );

    if request.mode == RunMode::List && admin_name.is_none() && outcome.is_ok() {
        for chunk in list_chunks(&outcome.result.channels) {
            notifier.send_ephemeral_reply(CLI_CHANNEL, &user, &chunk)?;
        }
    }

    let reply = summary_reply(request.mode, &outcome, admin_name.as_deref());
    let color = match (outcome.result.exit_reason, request.mode) {
        (ExitReason::Cancelled, _) => Colors::CANCELLED,
        (_, RunMode::Archive) => Colors::ARCHIVED,
        (_, RunMode::List) => Colors::LISTED,
    };
    notifier.send_ephemeral_reply(
        CLI_CHANNEL,
        &user,
        &Colors::colorize(color, &reply).to_string(),
    )?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.result).context("serialize run result")?
        );
    }

    Ok(outcome.is_ok())
}
