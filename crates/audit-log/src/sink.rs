use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::entry::AuditEntry;
use crate::writer::{AuditWriteError, AuditWriter};

/// Channel buffer size used between producers and the background writer task.
const CHANNEL_BUFFER: usize = 1024;

/// Flush after this long without a new entry.
const FLUSH_INTERVAL_SECS: u64 = 1;

/// Cloneable handle that submits [`AuditEntry`] values to the background
/// writer.
///
/// Any number of request handlers may log concurrently.  A single task owns
/// the file, so lines from different requests never interleave, though their
/// relative order is whatever order they reached the channel in.
#[derive(Clone)]
pub struct AuditSink {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditSink {
    /// Open the log at `path` and spawn the writer task.
    ///
    /// The task exits after a final flush once every `AuditSink` clone has
    /// been dropped; await the returned handle to be sure everything is on
    /// disk.
    pub async fn start(
        path: impl AsRef<Path>,
    ) -> Result<(Self, JoinHandle<()>), AuditWriteError> {
        let (tx, rx) = mpsc::channel::<AuditEntry>(CHANNEL_BUFFER);
        let writer = AuditWriter::new(path).await?;

        let handle = tokio::spawn(run_writer_loop(writer, rx));

        Ok((Self { tx }, handle))
    }

    /// Queue `entry` for writing.
    ///
    /// Waits if the channel is full.  If the writer task is gone the entry is
    /// dropped with a warning; logging never fails the caller.
    pub async fn log(&self, entry: AuditEntry) {
        if let Err(err) = self.tx.send(entry).await {
            tracing::warn!(
                level = %err.0.level,
                "audit sink channel closed, entry dropped"
            );
        }
    }
}

async fn run_writer_loop(mut writer: AuditWriter, mut rx: mpsc::Receiver<AuditEntry>) {
    let flush_interval = tokio::time::Duration::from_secs(FLUSH_INTERVAL_SECS);
    let mut dirty = false;

    loop {
        match tokio::time::timeout(flush_interval, rx.recv()).await {
            Ok(Some(entry)) => match writer.write(&entry).await {
                Ok(()) => dirty = true,
                Err(err) => tracing::error!(%err, "failed to write audit entry"),
            },
            Ok(None) => {
                if dirty {
                    if let Err(err) = writer.flush().await {
                        tracing::error!(%err, "failed to flush audit log on shutdown");
                    }
                }
                tracing::debug!("audit writer shutting down");
                return;
            }
            // Idle.
            Err(_) if dirty => match writer.flush().await {
                Ok(()) => dirty = false,
                Err(err) => tracing::error!(%err, "periodic audit log flush failed"),
            },
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_producers_write_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let (sink, handle) = AuditSink::start(&path).await.unwrap();

        let mut tasks = Vec::new();
        for worker in 0..8 {
            let sink = sink.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..25 {
                    sink.log(AuditEntry::info(format!("worker {worker} entry {i}")))
                        .await;
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        drop(sink);
        handle.await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            let entry = AuditEntry::parse(line).expect("every line parses");
            assert!(entry.message.starts_with("worker "));
        }
    }
}
