use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, DebouncedEvents};
use crate::pipeline::StageContext;

/// Turns folded raw events into dispatchable source-document events.
///
/// Pipeline: correct_by_existence → filter_sources
pub(super) struct EventClassifier;

impl EventClassifier {
    pub(super) fn classify(
        raw: FxHashMap<PathBuf, ChangeKind>,
        ctx: &StageContext,
    ) -> Option<DebouncedEvents> {
        let mut changes = raw;

        Self::correct_by_existence(&mut changes);
        Self::filter_sources(&mut changes, ctx);

        if changes.is_empty() {
            return None;
        }
        Some(DebouncedEvents::sorted(changes.into_iter().collect()))
    }

    /// Reconcile event kinds with what is on disk now.
    ///
    /// Atomic saves (write temp, rename over) surface as Removed for a file
    /// that exists again, or Added for one already gone.
    pub(super) fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        changes.retain(|path, kind| {
            let exists = path.exists();
            match *kind {
                ChangeKind::Added if !exists => {
                    crate::debug!("watch"; "discard added (gone): {}", path.display());
                    false
                }
                ChangeKind::Changed if !exists => {
                    *kind = ChangeKind::Removed;
                    true
                }
                ChangeKind::Removed if exists => {
                    crate::debug!("watch"; "removed but present, treating as changed: {}", path.display());
                    *kind = ChangeKind::Changed;
                    true
                }
                _ => true,
            }
        });
    }

    /// Keep only paths matching the source glob. Added/Changed must be
    /// regular files; directories are never dispatched.
    pub(super) fn filter_sources(changes: &mut FxHashMap<PathBuf, ChangeKind>, ctx: &StageContext) {
        changes.retain(|path, kind| {
            if !ctx.is_source(path) {
                return false;
            }
            match kind {
                ChangeKind::Added | ChangeKind::Changed => path.is_file(),
                ChangeKind::Removed => true,
            }
        });
    }
}
