//! notify-backed change source.
//!
//! Wraps a recursive watch on a directory tree and reduces the raw backend
//! stream to the qualifying changes the debounce loop cares about: events
//! aimed at files, not directories, and not pure noise such as metadata
//! updates or reads. Classification lives in free functions so it can be
//! tested without touching a real file system.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::event::{AccessKind, AccessMode, CreateKind, ModifyKind, RemoveKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{ChangeEvent, ChangeKind};

/// Errors establishing the file system subscription.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The recursive watch on the root could not be established.
    #[error("failed to watch {path}: {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    /// The platform watch backend could not be initialized.
    #[error(transparent)]
    Backend(#[from] notify::Error),
}

/// A live recursive watch on a directory tree.
///
/// Qualifying changes arrive on the channel returned by
/// [`EventSource::subscribe`]; the backend invokes the classifier from its
/// own thread, so the receiver side never blocks delivery. Dropping the
/// source releases the watch and closes the channel.
pub struct EventSource {
    watcher: RecommendedWatcher,
    root: PathBuf,
}

impl EventSource {
    /// Start watching `root` and everything beneath it.
    pub fn subscribe(root: &Path) -> Result<(Self, Receiver<ChangeEvent>), SourceError> {
        let (tx, rx) = unbounded();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => forward(&tx, event),
                Err(err) => warn!("watch backend error: {err}"),
            },
            Config::default(),
        )?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| SourceError::Watch {
                path: root.to_path_buf(),
                source,
            })?;
        debug!(root = %root.display(), "recursive watch established");

        Ok((
            Self {
                watcher,
                root: root.to_path_buf(),
            },
            rx,
        ))
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        let _ = self.watcher.unwatch(&self.root);
    }
}

/// Classify one raw event and forward whatever qualifies.
fn forward(tx: &Sender<ChangeEvent>, event: Event) {
    let at = Instant::now();
    for change in classify(event, at) {
        debug!(path = %change.path.display(), kind = ?change.kind, "qualifying change");
        // Receiver gone means the loop is shutting down; nothing to forward.
        let _ = tx.send(change);
    }
}

/// Reduce a raw backend event to qualifying changes, one per affected path.
///
/// Directory-level events, metadata-only modifications, access events other
/// than close-after-write, and unclassified backend chatter produce nothing.
pub fn classify(event: Event, at: Instant) -> Vec<ChangeEvent> {
    let Event { kind, paths, .. } = event;
    let change = match change_kind(&kind) {
        Some(change) => change,
        None => return Vec::new(),
    };
    paths
        .into_iter()
        .filter(|path| !targets_directory(&kind, path))
        .map(|path| ChangeEvent {
            path,
            kind: change,
            at,
        })
        .collect()
}

/// Map a raw event kind to its change kind, or `None` for noise.
fn change_kind(kind: &EventKind) -> Option<ChangeKind> {
    match kind {
        EventKind::Create(_) => Some(ChangeKind::Created),
        EventKind::Remove(_) => Some(ChangeKind::Removed),
        EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Moved),
        // Permission and timestamp churn does not qualify.
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(ChangeKind::Written),
        // Close-after-write is the write-completion signal on backends that
        // report it; every other access event is a read or an open.
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => Some(ChangeKind::Written),
        EventKind::Access(_) => None,
        EventKind::Any => Some(ChangeKind::Written),
        EventKind::Other => None,
    }
}

/// Whether the event is aimed at a directory rather than a file.
///
/// The backend tags folder creates and removes; for untagged kinds fall back
/// to asking the file system. A removed path cannot be probed, so a removed
/// directory with an untagged kind counts as a file change, which at worst
/// widens the current burst by one notification.
fn targets_directory(kind: &EventKind, path: &Path) -> bool {
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => false,
        EventKind::Remove(_) => false,
        _ => path.is_dir(),
    }
}
