use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::process::Command;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::{BuildCommand, DevConfig};

/// Coarse view of a source tree: enough to notice edits, additions and
/// deletions between polls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub files: usize,
    pub latest: Option<SystemTime>,
}

/// Rebuilds the client bundle once at startup and again after every change
/// under `watch_root`. Builds run one at a time; changes made during a build
/// are picked up by the next poll.
pub async fn watch_and_rebuild(dev: DevConfig) {
    let mut last = snapshot(&dev.watch_root).await;
    log_build(&dev.build_cmd, run_build(&dev.build_cmd).await);

    let mut ticker = tokio::time::interval(dev.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let current = snapshot(&dev.watch_root).await;
        if current == last {
            continue;
        }
        info!("change detected under {}", dev.watch_root.display());
        last = current;
        log_build(&dev.build_cmd, run_build(&dev.build_cmd).await);
    }
}

pub async fn snapshot(root: &Path) -> TreeSnapshot {
    let mut snap = TreeSnapshot::default();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot read {}: {err}", dir.display());
                continue;
            }
        };
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    warn!("cannot list {}: {err}", dir.display());
                    break;
                }
            };
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(err) => {
                    debug!("skipping {}: {err}", entry.path().display());
                    continue;
                }
            };
            if meta.is_dir() {
                pending.push(entry.path());
                continue;
            }
            snap.files += 1;
            if let Ok(modified) = meta.modified() {
                snap.latest = snap.latest.max(Some(modified));
            }
        }
    }
    snap
}

pub async fn run_build(cmd: &BuildCommand) -> Result<(), String> {
    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .output()
        .await
        .map_err(|e| format!("{} failed to start: {e}", cmd.program))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(format!("{cmd} exited with {}: {}", output.status, stderr.trim()))
}

fn log_build(cmd: &BuildCommand, result: Result<(), String>) {
    match result {
        Ok(()) => info!("bundle build finished: {cmd}"),
        Err(err) => error!("bundle build finished with errors: {err}"),
    }
}
