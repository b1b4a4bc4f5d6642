//! Sync command implementation.
//!
//! Node operations go to `--output` or stdout. When they go to stdout the
//! run summary is printed to stderr so the two never interleave.

use colored::Colorize;
use std::path::Path;
use tracing::warn;

use crate::cache::SqliteCache;
use crate::cli::SyncArgs;
use crate::config::{load_config_or_default, resolve_settings, Overrides, SyncSettings};
use crate::error::{Error, Result};
use crate::fetch::TrelloClient;
use crate::media::HttpFileStore;
use crate::store::{JsonlNodeStore, MemoryNodeStore, NodeStore};
use crate::sync::{SyncPipeline, SyncReport};

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error if settings are incomplete, the cache cannot be opened,
/// or the node store rejects a write.
pub fn execute(
    args: &SyncArgs,
    config_path: Option<&Path>,
    cache_dir: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let file = load_config_or_default(config_path)?;
    let overrides = Overrides {
        key: args.board.key.clone(),
        token: args.board.token.clone(),
        board_id: args.board.board_id.clone(),
        api_url: args.board.api_url.clone(),
        cache_dir: cache_dir.map(Path::to_path_buf),
    };
    let settings = resolve_settings(overrides, file)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create tokio runtime: {e}")))?;

    let report = if args.dry_run {
        let store = MemoryNodeStore::new();
        rt.block_on(run(&settings, &store))?
    } else {
        let store = match &args.output {
            Some(output) => JsonlNodeStore::to_file(output)?,
            None => JsonlNodeStore::stdout(),
        };
        let result = rt.block_on(run(&settings, &store));
        finish_or_discard(store, result)?
    };

    let to_stdout = args.dry_run || args.output.is_some();
    if json {
        let payload = serde_json::json!({
            "success": !report.degraded,
            "dry_run": args.dry_run,
            "output": args.output.as_ref().map(|p| p.display().to_string()),
            "report": report,
        });
        if to_stdout {
            println!("{payload}");
        } else {
            eprintln!("{payload}");
        }
    } else if !quiet {
        let text = render_report(&report, args.dry_run);
        if to_stdout {
            println!("{text}");
        } else {
            eprintln!("{text}");
        }
    }

    Ok(())
}

async fn run(settings: &SyncSettings, store: &dyn NodeStore) -> Result<SyncReport> {
    let cache = SqliteCache::open(&settings.cache_db_path())?;
    let client = TrelloClient::with_api_url(
        settings.api_url.clone(),
        settings.key.clone(),
        settings.token.clone(),
    );
    let files = HttpFileStore::new(settings.files_dir());

    SyncPipeline::new(&client, &files, &cache, store)
        .run(&settings.board_id)
        .await
}

/// Move the output into place after a successful run. After a failed run
/// the partial output is dropped and the previous file, if any, survives.
fn finish_or_discard(store: JsonlNodeStore, result: Result<SyncReport>) -> Result<SyncReport> {
    match result {
        Ok(report) => {
            store.finish()?;
            Ok(report)
        }
        Err(e) => {
            if let Err(cleanup) = store.discard() {
                warn!(error = %cleanup, "Failed to remove partial node output");
            }
            Err(e)
        }
    }
}

fn render_report(report: &SyncReport, dry_run: bool) -> String {
    let mut out = String::new();

    if report.degraded {
        out.push_str(&format!(
            "{} could not fetch board {} (see log above)\n",
            "Sync degraded:".yellow().bold(),
            report.board_id
        ));
        return out;
    }

    let title = if dry_run { "Dry run complete" } else { "Sync complete" };
    out.push_str(&format!("{} for board {}\n\n", title.green().bold(), report.board_id));
    out.push_str(&format!("  Cards:           {}\n", report.cards));
    out.push_str(&format!("  Checklists:      {}\n", report.checklists));
    out.push_str(&format!("  Checklist items: {}\n", report.items));
    if report.skipped_cards > 0 {
        out.push_str(&format!(
            "  Skipped cards:   {} {}\n",
            report.skipped_cards,
            "(list not open)".dimmed()
        ));
    }
    out.push_str(&format!(
        "  Media:           {} cached, {} downloaded",
        report.media.hits, report.media.downloads
    ));
    if report.media.failures > 0 {
        out.push_str(&format!(", {}", format!("{} failed", report.media.failures).red()));
    }
    out.push('\n');
    out.push_str(&format!(
        "\n  Total: {} nodes, {} links",
        report.nodes, report.links
    ));

    out
}
