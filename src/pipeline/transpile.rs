//! Transpile stage: source documents → generated documents.
//!
//! Per document:
//!
//! ```text
//! read ─► cache hit? ─► transpile ─► same as on disk? ─► write ─► record hash
//!           │ Cached       │ Failed       │ Unchanged
//! ```
//!
//! The hash is recorded only once the generated document on disk matches,
//! so a failed document is retried on the next event even if its bytes
//! did not change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;

use super::StageContext;
use crate::freshness::hash_bytes;
use crate::transpiler;
use crate::{debug, log};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranspileOutcome {
    /// Generated document (re)written.
    Written(PathBuf),
    /// Transpiled, but the generated document already had these bytes.
    Unchanged(PathBuf),
    /// Source bytes identical to the last successful run; skipped.
    Cached,
    /// Read, transpile or write failed. Carries the rendered error.
    Failed(String),
}

impl TranspileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranspileReport {
    pub written: usize,
    pub unchanged: usize,
    pub cached: usize,
    pub failed: usize,
}

impl TranspileReport {
    fn add(&mut self, outcome: &TranspileOutcome) {
        match outcome {
            TranspileOutcome::Written(_) => self.written += 1,
            TranspileOutcome::Unchanged(_) => self.unchanged += 1,
            TranspileOutcome::Cached => self.cached += 1,
            TranspileOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.written + self.unchanged + self.cached + self.failed
    }
}

/// Transpile every document matching the source glob.
pub async fn transpile_all(ctx: &Arc<StageContext>) -> TranspileReport {
    let walker = Arc::clone(ctx);
    let paths = tokio::task::spawn_blocking(move || walker.source_glob.walk_files(&walker.root))
        .await
        .unwrap_or_else(|err| {
            log!("transpile"; "source scan failed: {}", err);
            Vec::new()
        });

    debug!("transpile"; "{} source document(s) matching {}", paths.len(), ctx.source_glob.as_str());
    let report = transpile_paths(ctx, paths).await;
    log!(
        "transpile";
        "{} document(s): {} written, {} unchanged, {} cached, {} failed",
        report.total(), report.written, report.unchanged, report.cached, report.failed
    );

    let cache = &ctx.caches.transpile;
    if !cache.is_empty() {
        debug!("cache"; "{}: {} entries", cache.name(), cache.len());
    }
    report
}

/// Transpile the given documents concurrently, one task each.
pub async fn transpile_paths(ctx: &Arc<StageContext>, paths: Vec<PathBuf>) -> TranspileReport {
    let mut tasks = JoinSet::new();
    for path in paths {
        let ctx = Arc::clone(ctx);
        tasks.spawn(async move { transpile_one(&ctx, &path).await });
    }

    let mut report = TranspileReport::default();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.unwrap_or_else(|err| TranspileOutcome::Failed(err.to_string()));
        report.add(&outcome);
    }
    report
}

/// Run the stage for a single document.
pub async fn transpile_one(ctx: &Arc<StageContext>, source: &Path) -> TranspileOutcome {
    let outcome = run(ctx, source).await;
    match &outcome {
        TranspileOutcome::Written(output) => {
            debug!("transpile"; "{} -> {}", ctx.display(source), ctx.display(output));
        }
        TranspileOutcome::Failed(err) => {
            log!("transpile"; "failed {}: {}", ctx.display(source), err);
        }
        _ => {}
    }
    outcome
}

async fn run(ctx: &Arc<StageContext>, source: &Path) -> TranspileOutcome {
    let Some(output) = ctx.output_for(source) else {
        return TranspileOutcome::Failed(format!(
            "{} is outside the source directory",
            source.display()
        ));
    };

    let bytes = match tokio::fs::read(source).await {
        Ok(bytes) => bytes,
        Err(err) => return TranspileOutcome::Failed(format!("read error: {err}")),
    };

    let hash = hash_bytes(&bytes);
    let cache = &ctx.caches.transpile;
    if cache.is_unchanged(source, &hash) {
        return TranspileOutcome::Cached;
    }

    let html = {
        let options = ctx.options.clone();
        let path = source.to_path_buf();
        match tokio::task::spawn_blocking(move || {
            transpiler::transpile_bytes(&path, &bytes, &options)
        })
        .await
        {
            Ok(Ok(html)) => html,
            Ok(Err(err)) => return TranspileOutcome::Failed(err.to_string()),
            Err(err) => return TranspileOutcome::Failed(err.to_string()),
        }
    };

    let outcome = match tokio::fs::read(&output).await {
        Ok(existing) if existing == html.as_bytes() => TranspileOutcome::Unchanged(output),
        _ => {
            if let Err(err) = write_output(&output, html.as_bytes()).await {
                return TranspileOutcome::Failed(format!(
                    "write error for {}: {err}",
                    output.display()
                ));
            }
            TranspileOutcome::Written(output)
        }
    };

    cache.record(source, hash);
    outcome
}

async fn write_output(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}
