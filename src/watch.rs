//! Watch mode: re-render when notes change or a refresh interval elapses.

use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lock::LOCK_DIR;

const WATCH_DEBOUNCE_MS: u64 = 200;

/// Why a render happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Initial,
    FileChange,
    Interval,
}

enum WatchMsg {
    Changed,
    Failed(notify::Error),
}

/// Render once, then again after every debounced change and every
/// `refresh_interval` seconds (0 disables timed refresh).
///
/// Returns when `render` fails or the watcher stops.
pub fn run<F>(vault_root: &Path, refresh_interval: u64, mut render: F) -> Result<()>
where
    F: FnMut(Trigger) -> Result<()>,
{
    let changes = spawn_watch(vault_root)?;
    render(Trigger::Initial)?;

    let interval = (refresh_interval > 0).then(|| Duration::from_secs(refresh_interval));
    let mut next_tick = interval.map(|every| Instant::now() + every);

    loop {
        let timeout = next_tick
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_secs(3600));
        match changes.recv_timeout(timeout) {
            Ok(WatchMsg::Changed) => {
                debug!("vault changed, re-rendering");
                render(Trigger::FileChange)?;
            }
            Ok(WatchMsg::Failed(err)) => return Err(Error::Watch(err)),
            Err(RecvTimeoutError::Timeout) => {
                if let Some(every) = interval {
                    render(Trigger::Interval)?;
                    next_tick = Some(Instant::now() + every);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::OperationFailed("file watcher stopped".to_string()));
            }
        }
    }
}

/// Clear the terminal and home the cursor.
pub fn clear_screen() -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    stdout.flush()?;
    Ok(())
}

/// Whether an event touches a markdown note outside the lock directory.
pub fn is_relevant_event(event: &Event) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    let lock_root = Path::new(LOCK_DIR)
        .components()
        .next()
        .map(|component| component.as_os_str().to_owned());

    event.paths.iter().any(|path| {
        let is_note = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        let in_lock_dir = lock_root
            .as_ref()
            .is_some_and(|root| path.components().any(|c| c.as_os_str() == root));
        is_note && !in_lock_dir
    })
}

/// Watch the vault on a background thread, delivering one message per
/// burst of relevant events.
fn spawn_watch(vault_root: &Path) -> Result<Receiver<WatchMsg>> {
    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    })?;
    watcher.watch(vault_root, RecursiveMode::Recursive)?;

    let (msg_tx, msg_rx) = mpsc::channel();
    thread::spawn(move || {
        // The watcher stops when dropped.
        let _watcher = watcher;
        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if is_relevant_event(&event) {
                        pending = Some(Instant::now() + debounce);
                    }
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "file watcher error");
                    if msg_tx.send(WatchMsg::Failed(err)).is_err() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && msg_tx.send(WatchMsg::Changed).is_err() {
                        break;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    Ok(msg_rx)
}
