//! Debug channel discovery and tailing.
//!
//! Periodically re-scans the fifo root for named pipes (plain files work
//! too, which keeps this testable), attaches a reader task to each new one,
//! and funnels decoded events through one mpsc channel into the single
//! consumer that owns the pipeline — at most one event is ever being
//! rendered at a time.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use mctail_core::event::{MessageEvent, TraceSink};
use mctail_core::pattern::Pattern;

use crate::decode::Decoder;

const SCAN_INTERVAL: Duration = Duration::from_secs(1);
const IDLE_WAIT: Duration = Duration::from_millis(200);
const EVENT_QUEUE: usize = 256;
const READ_CHUNK: usize = 8 * 1024;

/// Watches `root` for channels and drives `sink` until the stream ends.
///
/// Runs until an accept fails (fatal I/O on the output stream) or the
/// process is terminated externally.
pub async fn watch(
    root: &Path,
    filename_pattern: Option<Pattern>,
    mut sink: impl TraceSink,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE);
    tokio::spawn(discover(root.to_path_buf(), filename_pattern, tx));

    while let Some(event) = rx.recv().await {
        sink.accept(&event)?;
    }
    Ok(())
}

/// Re-scans the root directory and spawns a tail task per new channel.
async fn discover(root: PathBuf, pattern: Option<Pattern>, tx: mpsc::Sender<MessageEvent>) {
    let mut attached: HashSet<PathBuf> = HashSet::new();
    let mut ticker = tokio::time::interval(SCAN_INTERVAL);

    loop {
        ticker.tick().await;
        if tx.is_closed() {
            return;
        }

        let mut dir = match tokio::fs::read_dir(&root).await {
            Ok(dir) => dir,
            Err(err) => {
                tracing::warn!(root = %root.display(), error = %err, "cannot scan fifo root");
                continue;
            }
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if attached.contains(&path) {
                continue;
            }
            if let Some(pattern) = &pattern {
                let name = entry.file_name();
                if !pattern.is_match(&name.to_string_lossy()) {
                    continue;
                }
            }
            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            if !is_streamable(&file_type) {
                continue;
            }
            attached.insert(path.clone());
            tracing::info!(channel = %path.display(), "attaching to channel");
            tokio::spawn(tail(path, tx.clone()));
        }
    }
}

fn is_streamable(file_type: &std::fs::FileType) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return true;
        }
    }
    file_type.is_file()
}

/// Tails one channel, decoding its bytes and forwarding events.
async fn tail(path: PathBuf, tx: mpsc::Sender<MessageEvent>) {
    // Opening a fifo blocks until a writer appears; that happens on the
    // blocking pool, so only this task waits.
    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(channel = %path.display(), error = %err, "cannot open channel");
            return;
        }
    };

    let mut decoder = Decoder::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut events = Vec::new();

    loop {
        match file.read(&mut buf).await {
            // EOF: the writer went away. Keep the channel attached and wait
            // for the next writer, like a tail -f.
            Ok(0) => tokio::time::sleep(IDLE_WAIT).await,
            Ok(n) => {
                decoder.feed(&buf[..n], &mut events);
                for event in events.drain(..) {
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(channel = %path.display(), error = %err, "read failed");
                return;
            }
        }
    }
}
