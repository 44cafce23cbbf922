use std::path::PathBuf;

/// What happened to a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Removed => "removed",
        }
    }
}

/// Debounced events, sorted by path for stable dispatch order
pub(super) struct DebouncedEvents(pub(super) Vec<(PathBuf, ChangeKind)>);

impl DebouncedEvents {
    pub(super) fn sorted(mut events: Vec<(PathBuf, ChangeKind)>) -> Self {
        events.sort_by(|a, b| a.0.cmp(&b.0));
        Self(events)
    }
}
