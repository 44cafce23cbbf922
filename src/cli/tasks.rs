//! The six commands, as composable async tasks.
//!
//! ```text
//! default = clean → transpile → (watch ‖ inject) → serve
//! ```
//!
//! `watch` and `serve` never return on their own. Every other task logs its
//! failures and completes, so the next task in `default` always runs.

use std::sync::Arc;

use anyhow::Result;

use super::Commands;
use crate::actor::Coordinator;
use crate::config::ProjectConfig;
use crate::freshness::Caches;
use crate::log;
use crate::pipeline::{
    DeleteReport, DeleteTarget, InjectOutcome, StageContext, TranspileReport, delete_paths, inject,
    transpile_all,
};
use crate::reload::Reloader;

/// Dispatch one command.
pub async fn run(command: Commands, config: ProjectConfig) -> Result<()> {
    let ctx = StageContext::from_config(&config, Caches::new())?;

    match command {
        Commands::Clean => {
            run_clean(&ctx).await;
            Ok(())
        }
        Commands::Transpile => {
            run_transpile(&ctx).await;
            Ok(())
        }
        Commands::Watch => run_watch(&ctx, &config).await,
        Commands::Inject => {
            run_inject(&ctx).await;
            Ok(())
        }
        Commands::Serve(_) => run_serve(&config).await,
        Commands::Default(_) => run_default(&ctx, &config).await,
    }
}

/// Empty the output directory, keeping the directory itself.
///
/// The transpile cache is dropped too: its entries describe outputs that
/// no longer exist.
pub async fn run_clean(ctx: &Arc<StageContext>) -> DeleteReport {
    let report = delete_paths(&ctx.root, &[DeleteTarget::from(ctx.clean_glob.clone())]).await;
    ctx.caches.transpile.clear();
    log!("clean"; "{}: {} removed, {} failed", ctx.display(&ctx.output_dir), report.removed, report.failed);
    report
}

pub async fn run_transpile(ctx: &Arc<StageContext>) -> TranspileReport {
    transpile_all(ctx).await
}

/// Run the injector once. Failures are logged, never returned.
pub async fn run_inject(ctx: &Arc<StageContext>) -> Option<InjectOutcome> {
    let index = ctx.display(&ctx.entry_path);
    match inject(ctx).await {
        Ok(outcome) => {
            match outcome {
                InjectOutcome::Written(n) => log!("inject"; "{}: {} link(s) written", index, n),
                InjectOutcome::Unchanged(n) => log!("inject"; "{}: {} link(s), unchanged", index, n),
                InjectOutcome::Cached => log!("inject"; "{}: up to date", index),
            }
            Some(outcome)
        }
        Err(err) => {
            log!("inject"; "{:#}", anyhow::Error::new(err));
            None
        }
    }
}

/// Watch without a server: reloads only show up in verbose logs.
pub async fn run_watch(ctx: &Arc<StageContext>, config: &ProjectConfig) -> Result<()> {
    Coordinator::new(Arc::clone(ctx), Reloader::disabled(), config.watch.debounce())
        .run()
        .await
}

pub async fn run_serve(config: &ProjectConfig) -> Result<()> {
    let (reloader, ws_rx) = Reloader::channel();
    super::serve::serve(config, reloader, ws_rx).await
}

/// clean → transpile → (watch ‖ inject) → serve
///
/// The watcher is attached before the injector runs, so edits made while
/// the server is starting are still picked up. Their reloads queue until
/// the WebSocket side is up.
pub async fn run_default(ctx: &Arc<StageContext>, config: &ProjectConfig) -> Result<()> {
    run_clean(ctx).await;
    run_transpile(ctx).await;

    let (reloader, ws_rx) = Reloader::channel();
    let watch = Coordinator::new(Arc::clone(ctx), reloader.clone(), config.watch.debounce())
        .start()?;
    let watch_handle = tokio::spawn(watch.run());

    run_inject(ctx).await;

    let served = super::serve::serve(config, reloader, ws_rx).await;
    watch_handle.abort();
    served
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::test_config_at;
    use crate::utils::path::normalize_path;

    const INDEX: &str = "<body>\n<ul>\n  <!-- inject:html -->\n  <!-- endinject -->\n</ul>\n</body>\n";

    fn setup() -> (TempDir, Arc<StageContext>) {
        let temp = TempDir::new().unwrap();
        let root = normalize_path(temp.path());
        fs::create_dir_all(root.join("docs/api")).unwrap();
        fs::create_dir_all(root.join("dist/stale")).unwrap();
        fs::write(root.join("dist/stale/old.html"), "old").unwrap();
        fs::write(root.join("docs/intro.md"), "# Intro\n").unwrap();
        fs::write(root.join("docs/api/users.apib"), "FORMAT: 1A\n\n# Users API\n").unwrap();
        fs::write(root.join("index.html"), INDEX).unwrap();
        let ctx = StageContext::from_config(&test_config_at(&root), Caches::new()).unwrap();
        (temp, ctx)
    }

    #[tokio::test]
    async fn test_clean_transpile_inject_sequence() {
        let (_temp, ctx) = setup();

        let cleaned = run_clean(&ctx).await;
        assert_eq!(cleaned.failed, 0);
        assert!(ctx.output_dir.is_dir());
        assert!(!ctx.output_dir.join("stale").exists());

        let report = run_transpile(&ctx).await;
        assert_eq!(report.written, 2);
        assert_eq!(report.failed, 0);

        // A second clean must not leave the cache pointing at deleted pages.
        run_clean(&ctx).await;
        assert!(ctx.caches.transpile.is_empty());
        assert_eq!(run_transpile(&ctx).await.written, 2);

        assert_eq!(run_inject(&ctx).await, Some(InjectOutcome::Written(2)));
        let index = fs::read_to_string(&ctx.entry_path).unwrap();
        assert_eq!(
            index,
            "<body>\n<ul>\n  <!-- inject:html -->\n  \
             <li><a href=\"dist/api/users.html\">api/users.html</a></li>\n  \
             <li><a href=\"dist/intro.html\">intro.html</a></li>\n  \
             <!-- endinject -->\n</ul>\n</body>\n"
        );
    }

    #[tokio::test]
    async fn test_inject_failure_is_not_an_error() {
        let (_temp, ctx) = setup();
        fs::remove_file(&ctx.entry_path).unwrap();
        assert_eq!(run_inject(&ctx).await, None);
    }
}
