//! Append-only HMAC-signed audit log with exact binary framing (§4.7):
//!
//! ```text
//! offset  len  field
//!   0      4   marker = ASCII "AUDT"
//!   4      1   version = 1
//!   5      8   timestamp (i64, 100-ns ticks, little-endian)
//!  13      1   record type
//!  14      4   payload length L (u32, little-endian)
//!  18      L   payload (packed fixed-layout entity for the type)
//!  18+L   32   HMAC-SHA256 over bytes [0 .. 18+L)
//! ```
//!
//! The write side is a dedicated thread fed through a bounded channel,
//! grounded on the teacher's `execution::journal::AsyncJournal` (which does
//! the same non-blocking-producer/dedicated-writer-thread shape for
//! newline-delimited JSON); this generalizes it to the spec's exact binary
//! record format and adds the HMAC tag.

pub mod replay;
pub mod writer;

use crate::core::types::RecordType;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub use replay::{AuditReplay, ReplayCounts, ReplayedRecord};
pub use writer::AuditWriter;

pub const MARKER: [u8; 4] = *b"AUDT";
pub const CURRENT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 18;
pub const HMAC_LEN: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Builds the full on-disk frame (header + payload + tag) for one record.
pub fn frame_record(key: &[u8], timestamp: i64, record_type: RecordType, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + HMAC_LEN);
    buf.extend_from_slice(&MARKER);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.push(record_type as u8);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(&buf);
    let tag = mac.finalize().into_bytes();
    buf.extend_from_slice(&tag);
    buf
}
