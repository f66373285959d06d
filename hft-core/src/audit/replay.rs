//! Deterministic replay and forensic query over an audit file.
//!
//! Verifies every record's HMAC before trusting it; the first mismatch
//! halts replay with a tamper error (§4.7, scenario S5). A truncated final
//! record (crash mid-write) is tolerated silently rather than treated as
//! tamper.

use crate::audit::{CURRENT_VERSION, HEADER_LEN, HMAC_LEN, MARKER};
use crate::core::errors::AuditError;
use crate::core::types::{Fill, RecordType};
use crate::position::PositionTable;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fs;
use std::path::Path;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayedRecord {
    pub index: u64,
    pub offset: u64,
    pub timestamp: i64,
    pub record_type: RecordType,
    pub payload: Vec<u8>,
}

pub struct AuditReplay {
    bytes: Vec<u8>,
    key: [u8; 32],
}

impl AuditReplay {
    pub fn open(path: impl AsRef<Path>, key: [u8; 32]) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self { bytes, key })
    }

    /// Reads and verifies every complete record, halting on the first HMAC
    /// mismatch. Returns the records verified before the halt (if any) along
    /// with the error, or `Ok` with all records if the file is clean.
    pub fn read_all(&self) -> Result<Vec<ReplayedRecord>, AuditError> {
        let mut out = Vec::new();
        let mut offset = 0u64;
        let mut index = 0u64;

        loop {
            match self.read_one(offset, index)? {
                Some((record, next_offset)) => {
                    out.push(record);
                    offset = next_offset;
                    index += 1;
                }
                None => return Ok(out),
            }
        }
    }

    /// Like `read_all`, but on tamper/corruption returns the records
    /// verified before the halt instead of discarding them, matching S5's
    /// "records 0,1 are reported as valid" expectation.
    pub fn read_all_tolerant(&self) -> (Vec<ReplayedRecord>, Option<AuditError>) {
        // read_all already accumulates into a local Vec and only returns it
        // on success; re-walk here so a failure still yields the prefix.
        let mut out = Vec::new();
        let mut offset = 0u64;
        let mut index = 0u64;

        loop {
            match self.read_one(offset, index) {
                Ok(Some((record, next_offset))) => {
                    out.push(record);
                    offset = next_offset;
                    index += 1;
                }
                Ok(None) => return (out, None),
                Err(e) => return (out, Some(e)),
            }
        }
    }

    fn read_one(&self, offset: u64, index: u64) -> Result<Option<(ReplayedRecord, u64)>, AuditError> {
        let start = offset as usize;
        if start + HEADER_LEN > self.bytes.len() {
            return Ok(None);
        }
        let header = &self.bytes[start..start + HEADER_LEN];
        if &header[0..4] != MARKER {
            return Err(AuditError::BadMarker { offset });
        }
        if header[4] != CURRENT_VERSION {
            return Err(AuditError::Corrupt {
                offset,
                reason: "unsupported record version",
            });
        }
        let timestamp = i64::from_le_bytes(header[5..13].try_into().unwrap());
        let record_type_byte = header[13];
        let payload_len = u32::from_le_bytes(header[14..18].try_into().unwrap()) as usize;
        let frame_len = HEADER_LEN + payload_len + HMAC_LEN;
        if start + frame_len > self.bytes.len() {
            return Ok(None);
        }
        let payload_start = start + HEADER_LEN;
        let payload_end = payload_start + payload_len;
        let tag_start = payload_end;
        let tag_end = tag_start + HMAC_LEN;

        let signed_region = &self.bytes[start..payload_end];
        let stored_tag = &self.bytes[tag_start..tag_end];
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(&self.key).expect("HMAC accepts any key length");
        mac.update(signed_region);
        if mac.verify_slice(stored_tag).is_err() {
            return Err(AuditError::Tamper { index, offset });
        }
        let Some(record_type) = RecordType::from_u8(record_type_byte) else {
            return Err(AuditError::Corrupt {
                offset,
                reason: "unknown record type",
            });
        };
        Ok(Some((
            ReplayedRecord {
                index,
                offset,
                timestamp,
                record_type,
                payload: self.bytes[payload_start..payload_end].to_vec(),
            },
            offset + frame_len as u64,
        )))
    }

    /// Given an order id, returns the ordered list of records referencing it
    /// (submit, rejects, fills). Linear scan, per §4.7 ("build-time: linear
    /// scan acceptable").
    pub fn query_by_order_id(&self, order_id: i64) -> Result<Vec<ReplayedRecord>, AuditError> {
        let records = self.read_all()?;
        Ok(records
            .into_iter()
            .filter(|r| extract_order_id(r).map(|id| id == order_id).unwrap_or(false))
            .collect())
    }
}

/// Counters over the non-position records a session re-drive sees, so a
/// collaborator can sanity-check the reconstructed book against what the
/// pipeline actually decided, not just what it filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayCounts {
    pub orders_submitted: u64,
    pub orders_rejected: u64,
    pub orders_throttled: u64,
    pub orders_cancelled: u64,
    pub fills: u64,
}

/// Re-drives an audit log through the real reducers (§4.7, C7: "replaying a
/// session must reconstruct state from the log," not a hand-summed
/// approximation of it). `Fill` records are replayed through
/// `Position::apply_fill`, the same function the executor calls live, so the
/// rebuilt `PositionTable` is exactly what the pipeline would have produced
/// had it processed this log in order.
impl AuditReplay {
    pub fn rebuild_positions(&self) -> Result<(Arc<PositionTable>, ReplayCounts), AuditError> {
        let records = self.read_all()?;
        Ok(Self::rebuild_from(&records))
    }

    /// Like `rebuild_positions`, but over a caller-supplied record slice
    /// (e.g. the tolerant prefix from `read_all_tolerant`) rather than
    /// re-reading and re-verifying the whole file.
    pub fn rebuild_from(records: &[ReplayedRecord]) -> (Arc<PositionTable>, ReplayCounts) {
        let positions = Arc::new(PositionTable::new());
        let mut counts = ReplayCounts::default();

        for record in records {
            match record.record_type {
                RecordType::Fill => {
                    if let Ok(fill) = Fill::from_bytes(&record.payload) {
                        counts.fills += 1;
                        let position = positions.get_or_insert(fill.instrument_id);
                        position.apply_fill(fill.side(), fill.quantity, fill.price);
                    }
                }
                RecordType::OrderSubmit => counts.orders_submitted += 1,
                RecordType::OrderReject => counts.orders_rejected += 1,
                RecordType::RiskViolation => counts.orders_throttled += 1,
                RecordType::OrderCancel => counts.orders_cancelled += 1,
                RecordType::PnlUpdate | RecordType::Tick | RecordType::SystemEvent => {}
            }
        }

        (positions, counts)
    }
}

fn extract_order_id(record: &ReplayedRecord) -> Option<i64> {
    use crate::core::types::{Order, RiskDecisionRecord};
    match record.record_type {
        RecordType::OrderSubmit | RecordType::OrderCancel => {
            Order::from_bytes(&record.payload).ok().map(|o| o.order_id)
        }
        RecordType::Fill => crate::core::types::Fill::from_bytes(&record.payload)
            .ok()
            .map(|f| f.order_id),
        RecordType::OrderReject | RecordType::RiskViolation => {
            RiskDecisionRecord::from_bytes(&record.payload)
                .ok()
                .map(|r| r.order_id)
        }
        RecordType::PnlUpdate | RecordType::Tick | RecordType::SystemEvent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::frame_record;

    fn write_file(records: &[(i64, RecordType, Vec<u8>)], key: [u8; 32]) -> Vec<u8> {
        let mut buf = Vec::new();
        for (ts, rt, payload) in records {
            buf.extend_from_slice(&frame_record(&key, *ts, *rt, payload));
        }
        buf
    }

    #[test]
    fn reads_clean_file_in_order() {
        let key = [1u8; 32];
        let bytes = write_file(
            &[
                (1, RecordType::Tick, vec![1, 2]),
                (2, RecordType::Fill, vec![3, 4, 5]),
            ],
            key,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, &bytes).unwrap();

        let replay = AuditReplay::open(&path, key).unwrap();
        let records = replay.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1);
        assert_eq!(records[1].payload, vec![3, 4, 5]);
    }

    // S5: tamper detection, first two records still reported valid.
    #[test]
    fn detects_tamper_and_reports_valid_prefix() {
        let key = [2u8; 32];
        let bytes = write_file(
            &[
                (1, RecordType::Tick, vec![9, 9]),
                (2, RecordType::Tick, vec![8, 8]),
                (3, RecordType::Tick, vec![7, 7]),
            ],
            key,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, &bytes).unwrap();

        // Flip a byte in record index 1's payload.
        let mut tampered = bytes.clone();
        let record1_payload_offset = HEADER_LEN + 2 + HMAC_LEN + HEADER_LEN;
        tampered[record1_payload_offset] ^= 0xFF;
        std::fs::write(&path, &tampered).unwrap();

        let replay = AuditReplay::open(&path, key).unwrap();
        assert!(replay.read_all().is_err());

        let (valid, err) = replay.read_all_tolerant();
        assert_eq!(valid.len(), 1);
        assert!(matches!(err, Some(AuditError::Tamper { index: 1, .. })));
    }

    #[test]
    fn tolerates_truncated_trailing_record() {
        let key = [3u8; 32];
        let mut bytes = write_file(&[(1, RecordType::Tick, vec![1, 2, 3, 4])], key);
        bytes.extend_from_slice(&frame_record(&key, 2, RecordType::Tick, &[5, 6, 7, 8])[..10]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, &bytes).unwrap();

        let replay = AuditReplay::open(&path, key).unwrap();
        let records = replay.read_all().unwrap();
        assert_eq!(records.len(), 1);
    }

    // C7: re-drive through the real Position reducer, not a hand-summed total.
    #[test]
    fn rebuild_positions_replays_fills_through_apply_fill() {
        use crate::core::types::{Fill, Side};

        let key = [5u8; 32];
        let buy = Fill {
            version: Fill::CURRENT_VERSION,
            fill_id: 1,
            order_id: 1,
            instrument_id: 7,
            side: Side::Buy as u8,
            price: 100.0,
            quantity: 10.0,
            timestamp: 0,
        };
        let sell = Fill {
            version: Fill::CURRENT_VERSION,
            fill_id: 2,
            order_id: 2,
            instrument_id: 7,
            side: Side::Sell as u8,
            price: 101.0,
            quantity: 10.0,
            timestamp: 1,
        };
        let bytes = write_file(
            &[
                (0, RecordType::OrderSubmit, vec![0; 1]),
                (0, RecordType::Fill, buy.as_bytes().to_vec()),
                (1, RecordType::Fill, sell.as_bytes().to_vec()),
            ],
            key,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, &bytes).unwrap();

        let replay = AuditReplay::open(&path, key).unwrap();
        let (positions, counts) = replay.rebuild_positions().unwrap();

        assert_eq!(counts.fills, 2);
        assert_eq!(counts.orders_submitted, 1);
        let position = positions.get(7).unwrap();
        assert_eq!(position.net_position(), 0.0);
        assert!((position.realized_pnl() - 10.0).abs() < 1e-9);
    }
}
