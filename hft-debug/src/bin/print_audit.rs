//! Audit log dump: decodes and prints the records in a signed audit file.
//!
//! Grounded on the teacher's `print-orderbook` (CLI shape, pretty/compact/json
//! output modes); repurposed from orderbook snapshots to this pipeline's
//! audit trail since there's no standalone orderbook type here (§4.7's
//! record format is the forensic surface).
//!
//! ```bash
//! print-audit --path audit.bin --key-hex <64 hex chars>
//! print-audit --path audit.bin --key-hex <key> --format json --limit 20
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use hft_core::audit::{AuditReplay, ReplayedRecord};
use hft_core::core::types::{Fill, Order, RecordType, RiskDecisionRecord};
use serde_json::json;

#[derive(Parser)]
#[command(name = "print-audit")]
#[command(about = "Decode and print records from a signed audit file", long_about = None)]
struct Args {
    /// Path to the audit file.
    #[arg(short, long)]
    path: String,

    /// Hex-encoded 32-byte HMAC key the file was signed with.
    #[arg(short, long)]
    key_hex: String,

    /// Output format: pretty, compact, or json.
    #[arg(short, long, default_value = "pretty")]
    format: String,

    /// Only print the last N records.
    #[arg(short, long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let key_bytes = hex::decode(&args.key_hex).context("key-hex must be valid hex")?;
    let key: [u8; 32] = key_bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("key-hex must decode to exactly 32 bytes"))?;

    let replay = AuditReplay::open(&args.path, key).context("opening audit file")?;
    let (records, tamper) = replay.read_all_tolerant();

    let shown: &[ReplayedRecord] = match args.limit {
        Some(n) if n < records.len() => &records[records.len() - n..],
        _ => &records,
    };

    match args.format.as_str() {
        "json" => print_json(shown)?,
        "compact" => print_compact(shown),
        _ => print_pretty(shown),
    }

    if let Some(err) = tamper {
        eprintln!();
        eprintln!("WARNING: replay halted early, {} valid records recovered: {err}", records.len());
    }

    Ok(())
}

fn print_pretty(records: &[ReplayedRecord]) {
    println!();
    println!("=== Audit Log ({} records) ===", records.len());
    println!();
    for r in records {
        println!(
            "[{:>6}] offset={:<8} ts={:<20} {:?}",
            r.index, r.offset, r.timestamp, r.record_type
        );
        println!("          {}", describe_payload(r));
    }
    println!();
}

fn print_compact(records: &[ReplayedRecord]) {
    for r in records {
        println!("{:>6}  {:<14?}  {}", r.index, r.record_type, describe_payload(r));
    }
}

fn print_json(records: &[ReplayedRecord]) -> Result<()> {
    let entries: Vec<_> = records
        .iter()
        .map(|r| {
            json!({
                "index": r.index,
                "offset": r.offset,
                "timestamp": r.timestamp,
                "record_type": format!("{:?}", r.record_type),
                "detail": describe_payload(r),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

/// Best-effort human-readable decode of a record's payload. Falls back to
/// the raw byte length if the payload doesn't match the expected type for
/// its `record_type` (shouldn't happen on a clean file).
fn describe_payload(r: &ReplayedRecord) -> String {
    match r.record_type {
        RecordType::OrderSubmit | RecordType::OrderCancel => match Order::from_bytes(&r.payload) {
            // Copied out of the packed struct first: `format!` takes its
            // arguments by reference, which a packed field can't give.
            Ok(o) => {
                let (order_id, instrument_id, side, price, quantity) =
                    (o.order_id, o.instrument_id, o.side, o.price, o.quantity);
                format!("order_id={order_id} instrument={instrument_id} side={side} price={price} qty={quantity}")
            }
            Err(_) => format!("<undecodable, {} bytes>", r.payload.len()),
        },
        RecordType::Fill => match Fill::from_bytes(&r.payload) {
            Ok(f) => {
                let (fill_id, order_id, price, quantity) = (f.fill_id, f.order_id, f.price, f.quantity);
                format!("fill_id={fill_id} order_id={order_id} price={price} qty={quantity}")
            }
            Err(_) => format!("<undecodable, {} bytes>", r.payload.len()),
        },
        RecordType::OrderReject | RecordType::RiskViolation => {
            match RiskDecisionRecord::from_bytes(&r.payload) {
                Ok(d) => {
                    let (order_id, reason_code, actual, threshold) =
                        (d.order_id, d.reason_code, d.actual, d.threshold);
                    format!("order_id={order_id} reason_code={reason_code} actual={actual} threshold={threshold}")
                }
                Err(_) => format!("<undecodable, {} bytes>", r.payload.len()),
            }
        }
        RecordType::PnlUpdate | RecordType::Tick | RecordType::SystemEvent => {
            format!("{} byte payload", r.payload.len())
        }
    }
}
