//! Non-blocking audit writer: producers (risk gate, executor, ingest) call
//! `submit` and return immediately; a dedicated thread serializes, frames,
//! and appends to the audit file. Grounded on
//! `bog-core::execution::journal::AsyncJournal`'s bounded-channel-plus-writer-
//! thread shape.

use crate::audit::frame_record;
use crate::core::types::RecordType;
use crossbeam::channel::{self, Sender};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, warn};

const CHANNEL_CAPACITY: usize = 4096;
const MAX_WRITE_RETRIES: u32 = 3;

struct WriteRequest {
    timestamp: i64,
    record_type: RecordType,
    payload: Vec<u8>,
}

#[derive(Default)]
pub struct AuditWriterStats {
    pub io_errors: AtomicU64,
    pub dropped: AtomicU64,
}

pub struct AuditWriter {
    sender: Option<Sender<WriteRequest>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<AuditWriterStats>,
}

impl AuditWriter {
    pub fn new(path: impl AsRef<Path>, hmac_key: [u8; 32]) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::bounded::<WriteRequest>(CHANNEL_CAPACITY);
        let stats = Arc::new(AuditWriterStats::default());
        let stats_thread = Arc::clone(&stats);

        let handle = std::thread::Builder::new()
            .name("audit-writer".into())
            .spawn(move || {
                let mut file = file;
                for req in receiver.iter() {
                    let frame = frame_record(&hmac_key, req.timestamp, req.record_type, &req.payload);
                    if let Err(e) = write_with_retries(&mut file, &frame) {
                        error!(error = %e, "audit writer giving up on record after retries");
                        stats_thread.io_errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
                if let Err(e) = file.sync_all() {
                    error!(error = %e, "audit file fsync on close failed");
                }
            })
            .expect("failed to spawn audit-writer thread");

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
            stats,
        })
    }

    /// Non-blocking: drops the record and bumps a counter rather than
    /// stalling the calling stage when the channel is full.
    pub fn submit(&self, timestamp: i64, record_type: RecordType, payload: Vec<u8>) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender
            .try_send(WriteRequest {
                timestamp,
                record_type,
                payload,
            })
            .is_err()
        {
            warn!("audit writer channel full, dropping record");
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn io_error_count(&self) -> u64 {
        self.stats.io_errors.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }
}

fn write_with_retries(file: &mut File, frame: &[u8]) -> io::Result<()> {
    let mut attempt = 0;
    loop {
        match file.write_all(frame) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < MAX_WRITE_RETRIES => {
                attempt += 1;
                warn!(attempt, error = %e, "audit write failed, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

impl Drop for AuditWriter {
    fn drop(&mut self) {
        self.sender.take(); // closes the channel so the writer thread's `for` loop ends
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::replay::AuditReplay;

    #[test]
    fn submitted_records_are_written_and_flushed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.bin");
        let key = [9u8; 32];
        {
            let writer = AuditWriter::new(&path, key).unwrap();
            writer.submit(1, RecordType::Tick, vec![1, 2, 3]);
            writer.submit(2, RecordType::Fill, vec![4, 5, 6, 7]);
        } // Drop joins the writer thread.

        let records = AuditReplay::open(&path, key).unwrap().read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, vec![1, 2, 3]);
        assert_eq!(records[1].payload, vec![4, 5, 6, 7]);
    }
}
