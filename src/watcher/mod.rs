/*!
Configuration file watcher.

Watches the directory holding the configuration file and calls a reload
callback for every create/modify event naming the file. Watching the
directory rather than the file keeps reloads working for editors that save
by writing a new file and renaming it over the old one. When the file is a
symlink, the directory of its target is watched as well, so edits made
through the link's target still reload.

Behavior:
- Events are not debounced: a burst of writes produces a burst of reloads.
- The callback runs on the blocking pool and completes before the next
  event is read.
- The task stops when [`WatchHandle::shutdown`] is called or the event
  channel closes (the underlying notify watcher was dropped).
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

pub mod error;

pub use error::WatchError;

/// Capacity of the channel between the notify thread and the watch task.
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Receiver side of a notify event stream.
pub type EventReceiver = mpsc::Receiver<notify::Result<Event>>;

pub struct ConfigWatcher;

impl ConfigWatcher {
    /// Start watching `path`, calling `on_change` whenever it is created or modified.
    ///
    /// Must be called from within a Tokio runtime; without one this reports
    /// [`WatchError::InitFailed`].
    pub fn spawn<F>(path: &Path, on_change: F) -> Result<WatchHandle, WatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = current_runtime()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let files = watched_files(path)?;
        let mut dirs: Vec<&Path> = files.iter().filter_map(|f| f.parent()).collect();
        dirs.dedup();
        for dir in dirs {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                })?;
            debug!(target: "gestured::watcher", dir = %dir.display(), "Registered watch");
        }

        let mut handle = spawn_loop(&runtime, path, files, rx, on_change);
        handle._watcher = Some(watcher);
        Ok(handle)
    }

    /// Run the watch loop over an already existing event stream.
    pub fn spawn_with_events<F>(
        path: &Path,
        events: EventReceiver,
        on_change: F,
    ) -> Result<WatchHandle, WatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let runtime = current_runtime()?;
        let files = watched_files(path)?;
        Ok(spawn_loop(&runtime, path, files, events, on_change))
    }
}

/// Handle to a running watch task.
pub struct WatchHandle {
    path: PathBuf,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    _watcher: Option<RecommendedWatcher>,
}

impl WatchHandle {
    /// The configuration file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the watch task and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(target: "gestured::watcher", error = %e, "Watch task ended abnormally");
        }
        info!(target: "gestured::watcher", path = %self.path.display(), "Stopped watching configuration");
    }
}

fn current_runtime() -> Result<Handle, WatchError> {
    Handle::try_current().map_err(|e| WatchError::InitFailed {
        reason: format!("no Tokio runtime available: {e}"),
    })
}

/// `path` as its directory joined with its file name.
fn dir_and_name(path: &Path) -> Result<PathBuf, WatchError> {
    let name = path.file_name().ok_or_else(|| WatchError::PathWatchFailed {
        path: path.to_path_buf(),
        reason: "path does not name a file".into(),
    })?;
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.join(name)),
        Some(_) => Ok(Path::new(".").join(name)),
        None => Err(WatchError::PathWatchFailed {
            path: path.to_path_buf(),
            reason: "path has no parent directory".into(),
        }),
    }
}

/// Files whose changes trigger a reload: the configuration path itself and,
/// when it is a symlink, the file it resolves to.
fn watched_files(path: &Path) -> Result<Vec<PathBuf>, WatchError> {
    let mut files = vec![dir_and_name(path)?];
    let is_symlink = fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink());
    if is_symlink {
        let target = fs::canonicalize(path).map_err(|e| WatchError::PathWatchFailed {
            path: path.to_path_buf(),
            reason: format!("cannot resolve symlink: {e}"),
        })?;
        debug!(
            target: "gestured::watcher",
            link = %path.display(),
            resolved = %target.display(),
            "Configuration is a symlink; watching its target too"
        );
        files.push(dir_and_name(&target)?);
    }
    Ok(files)
}

/// Whether `event` creates or modifies one of `files`.
fn is_config_change(event: &Event, files: &[PathBuf]) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| files.iter().any(|f| f == p))
}

fn spawn_loop<F>(
    runtime: &Handle,
    path: &Path,
    files: Vec<PathBuf>,
    mut events: EventReceiver,
    on_change: F,
) -> WatchHandle
where
    F: Fn() + Send + Sync + 'static,
{
    let on_change = Arc::new(on_change);
    let cancel = CancellationToken::new();
    let task_cancel = cancel.clone();
    let task_path = path.to_path_buf();

    let task = runtime.spawn(async move {
        info!(
            target: "gestured::watcher",
            path = %task_path.display(),
            "Watching configuration for changes"
        );

        loop {
            tokio::select! {
                _ = task_cancel.cancelled() => break,
                msg = events.recv() => match msg {
                    Some(Ok(event)) if is_config_change(&event, &files) => {
                        info!(
                            target: "gestured::watcher",
                            kind = ?event.kind,
                            "Your configuration file changed, reloading your settings"
                        );
                        let reload = Arc::clone(&on_change);
                        if let Err(e) = tokio::task::spawn_blocking(move || reload()).await {
                            warn!(target: "gestured::watcher", error = %e, "Reload callback failed");
                        }
                    }
                    Some(Ok(event)) => {
                        trace!(target: "gestured::watcher", ?event, "Ignoring unrelated event");
                    }
                    Some(Err(e)) => {
                        warn!(target: "gestured::watcher", error = %e, "File watch error");
                    }
                    None => {
                        debug!(target: "gestured::watcher", "Event channel closed");
                        break;
                    }
                },
            }
        }
    });

    WatchHandle {
        path: path.to_path_buf(),
        cancel,
        task,
        _watcher: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, ModifyKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_create_and_modify_of_the_file_count() {
        let files = vec![PathBuf::from("/h/.config/gestured/gestured.conf")];
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        assert!(is_config_change(&event(modify, "/h/.config/gestured/gestured.conf"), &files));
        assert!(is_config_change(
            &event(EventKind::Create(CreateKind::File), "/h/.config/gestured/gestured.conf"),
            &files
        ));
        assert!(!is_config_change(&event(modify, "/h/.config/gestured/other.conf"), &files));
        assert!(!is_config_change(&event(modify, "/elsewhere/gestured.conf"), &files));
        assert!(!is_config_change(
            &event(EventKind::Access(AccessKind::Read), "/h/.config/gestured/gestured.conf"),
            &files
        ));
    }

    #[test]
    fn bare_file_name_is_watched_in_current_dir() {
        let files = watched_files(Path::new("gestured.conf")).unwrap();
        assert_eq!(files, vec![PathBuf::from("./gestured.conf")]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_config_also_watches_its_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let real_dir = fs::canonicalize(tmp.path()).unwrap();
        let dotfiles = real_dir.join("dotfiles");
        let config_dir = real_dir.join("config");
        fs::create_dir_all(&dotfiles).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        let target = dotfiles.join("mine.conf");
        fs::write(&target, "<root/>").unwrap();
        let link = config_dir.join("gestured.conf");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let files = watched_files(&link).unwrap();

        assert_eq!(files, vec![link.clone(), target.clone()]);
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert!(is_config_change(&event(modify, target.to_str().unwrap()), &files));
    }

    #[test]
    fn spawn_without_runtime_is_init_failure() {
        let err = ConfigWatcher::spawn(Path::new("/tmp/gestured.conf"), || {}).err().unwrap();
        assert!(matches!(err, WatchError::InitFailed { .. }));
    }

    #[tokio::test]
    async fn missing_directory_is_registration_failure() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nope").join("gestured.conf");
        let err = ConfigWatcher::spawn(&path, || {}).err().unwrap();
        assert!(matches!(err, WatchError::PathWatchFailed { .. }), "{err}");
    }

    #[tokio::test]
    async fn every_relevant_event_triggers_a_reload() {
        let (tx, rx) = mpsc::channel(8);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle = ConfigWatcher::spawn_with_events(Path::new("/cfg/gestured.conf"), rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        tx.send(Ok(event(modify, "/cfg/gestured.conf"))).await.unwrap();
        tx.send(Ok(event(modify, "/cfg/unrelated"))).await.unwrap();
        tx.send(Ok(event(modify, "/cfg/gestured.conf"))).await.unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), async {
            while handle.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reload_runs_off_the_async_thread() {
        let (tx, rx) = mpsc::channel(1);
        let runtime_thread = std::thread::current().id();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let record = seen.clone();
        let handle = ConfigWatcher::spawn_with_events(Path::new("/cfg/gestured.conf"), rx, move || {
            *record.lock() = Some(std::thread::current().id());
        })
        .unwrap();

        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        tx.send(Ok(event(modify, "/cfg/gestured.conf"))).await.unwrap();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), async {
            while handle.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let reload_thread = seen.lock().expect("reload callback did not run");
        assert_ne!(reload_thread, runtime_thread);
    }

    #[tokio::test]
    async fn shutdown_stops_the_task() {
        let (_tx, rx) = mpsc::channel(1);
        let handle = ConfigWatcher::spawn_with_events(Path::new("/cfg/gestured.conf"), rx, || {}).unwrap();
        assert!(handle.is_running());
        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .unwrap();
    }
}
