//! Issuer velocity: transactions per payment issuer in a trailing window.
//!
//! Each record is handled on its own. The issuer lookup is built from
//! that record's payment methods only and dropped afterwards, and no
//! state is carried from one batch to the next.
//!
//! "now" is frozen once per run and passed in, so every batch of a run
//! is measured against the same window.

use crate::{
    config::{VelocityConfig, WriteMode},
    error::{VelocityError, VelocityResult},
    jsonl::{append_records, truncate_output, BatchReader, JsonLines},
    record::{str_field, Record},
    types::*,
};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::Value;
use serde_json::Map;
use std::collections::HashMap;
use std::path::PathBuf;

/// Closed interval `[now - span, now]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityWindow {
    start: Timestamp,
    end: Timestamp,
}

impl VelocityWindow {
    /// None when the start would fall outside the representable range.
    pub fn trailing(now: Timestamp, span: Duration) -> Option<Self> {
        let start = now.checked_sub_signed(span)?;
        Some(Self { start, end: now })
    }

    pub fn trailing_hours(now: Timestamp, hours: i64) -> Option<Self> {
        Self::trailing(now, Duration::try_hours(hours)?)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, at: &Timestamp) -> bool {
        self.start <= *at && *at <= self.end
    }
}

/// Parse a `loggedAt` value. Timestamps without an offset are UTC.
pub fn parse_logged_at(raw: &str) -> Option<Timestamp> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Payment method id → issuer, for one record.
fn issuer_lookup(record: &Record) -> HashMap<&str, String> {
    let mut issuers = HashMap::new();
    for method in record.payment_methods() {
        if let Some(id) = str_field(method, PAYMENT_METHOD_ID) {
            issuers.insert(id, issuer_key(method.get(PAYMENT_METHOD_ISSUER)));
        }
    }
    issuers
}

fn issuer_key(issuer: Option<&Value>) -> String {
    match issuer {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        None | Some(Value::Null) | Some(Value::String(_)) => UNKNOWN_ISSUER.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Count this record's in-window transactions per issuer.
///
/// Transactions with an absent or unparsable `loggedAt` are not counted.
/// An unresolvable issuer is counted under `"unknown"`. Issuers appear
/// in the order their first counted transaction was seen.
pub fn issuer_velocities(record: &Record, window: &VelocityWindow) -> Map<String, Value> {
    let issuers = issuer_lookup(record);
    let mut velocities = Map::new();

    for txn in record.transactions() {
        let Some(at) = txn
            .get(LOGGED_AT)
            .and_then(Value::as_str)
            .and_then(parse_logged_at)
        else {
            continue;
        };
        if !window.contains(&at) {
            continue;
        }
        let issuer = str_field(txn, PAYMENT_METHOD_ID)
            .and_then(|id| issuers.get(id))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ISSUER.to_string());
        let count = velocities.entry(issuer).or_insert(Value::from(0u64));
        *count = Value::from(count.as_u64().unwrap_or(0) + 1);
    }
    velocities
}

/// Attach `paymentMethodVelocities` to a record, even when empty.
pub fn augment(record: &mut Record, window: &VelocityWindow) {
    let velocities = issuer_velocities(record, window);
    record.insert(PAYMENT_METHOD_VELOCITIES, Value::Object(velocities));
}

/// Outcome of a full velocity pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityReport {
    pub batches: u64,
    pub records_written: u64,
    pub lines_skipped: u64,
    pub output_path: PathBuf,
    pub now: Timestamp,
}

/// Run the velocity pass over `config.input_path`, measuring every
/// record against a window ending at `now`.
///
/// The source is opened before the output is touched, so a missing
/// source never clobbers an earlier result.
pub fn run_velocity(config: &VelocityConfig, now: Timestamp) -> VelocityResult<VelocityReport> {
    let output_path = config.resolved_output_path();
    if output_path == config.input_path {
        return Err(VelocityError::OutputIsInput {
            path: output_path.display().to_string(),
        });
    }
    let window = VelocityWindow::trailing_hours(now, config.window_hours).ok_or_else(|| {
        VelocityError::InvalidWindow {
            hours: config.window_hours,
            now: now.to_rfc3339(),
        }
    })?;
    let source = JsonLines::open(&config.input_path)?;

    if config.write_mode == WriteMode::Truncate {
        truncate_output(&output_path)?;
    }

    let mut reader = BatchReader::new(source, config.batch_size)
        .with_malformed_limit(config.max_malformed_lines);
    let mut batches = 0u64;
    let mut records_written = 0u64;

    for batch in reader.by_ref() {
        let mut batch = batch?;
        log::debug!("Processing Batch: {batches}");
        for record in batch.iter_mut() {
            augment(record, &window);
        }
        append_records(&output_path, &batch)?;
        batches += 1;
        records_written += batch.len() as u64;
    }

    let lines_skipped = reader.skipped();
    log::info!(
        "Processed {records_written} records in {batches} batches, skipped {lines_skipped} lines"
    );

    Ok(VelocityReport {
        batches,
        records_written,
        lines_skipped,
        output_path,
        now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::format_timestamp;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = VelocityWindow::trailing_hours(now(), 24).unwrap();
        assert!(window.contains(&now()));
        assert!(window.contains(&(now() - Duration::hours(24))));
        assert!(!window.contains(&(now() - Duration::hours(24) - Duration::seconds(1))));
        assert!(!window.contains(&(now() + Duration::seconds(1))));
    }

    #[test]
    fn oversized_window_is_rejected_not_panicking() {
        assert!(VelocityWindow::trailing_hours(now(), i64::MAX / 2).is_none());
        assert!(VelocityWindow::trailing_hours(now(), 24 * 365 * 500_000).is_none());
    }

    #[test]
    fn issuers_keep_first_seen_order() {
        let ts = format_timestamp(&now());
        let r = record(json!({
            "paymentMethods": [
                { "paymentMethodId": "a", "paymentMethodIssuer": "VISA" },
                { "paymentMethodId": "b", "paymentMethodIssuer": "AMEX" }
            ],
            "transactions": [
                { "paymentMethodId": "b", "loggedAt": ts },
                { "paymentMethodId": "zzz", "loggedAt": ts },
                { "paymentMethodId": "a", "loggedAt": ts },
                { "paymentMethodId": "b", "loggedAt": ts }
            ]
        }));
        let v = issuer_velocities(&r, &VelocityWindow::trailing_hours(now(), 24).unwrap());
        let keys: Vec<&str> = v.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AMEX", UNKNOWN_ISSUER, "VISA"]);
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"AMEX":2,"unknown":1,"VISA":1}"#
        );
    }

    #[test]
    fn parses_offsets_and_naive_timestamps() {
        let expected = now();
        assert_eq!(parse_logged_at("2026-03-14T12:00:00+00:00"), Some(expected));
        assert_eq!(parse_logged_at("2026-03-14T14:00:00+02:00"), Some(expected));
        assert_eq!(parse_logged_at("2026-03-14T12:00:00.000Z"), Some(expected));
        assert_eq!(parse_logged_at("2026-03-14T12:00:00"), Some(expected));
        assert_eq!(parse_logged_at("yesterday"), None);
    }

    #[test]
    fn counts_per_issuer_and_unknown() {
        let ts = format_timestamp(&(now() - Duration::hours(1)));
        let r = record(json!({
            "paymentMethods": [
                { "paymentMethodId": "a", "paymentMethodIssuer": "VISA" },
                { "paymentMethodId": "b", "paymentMethodIssuer": "AMEX" },
                { "paymentMethodId": "c" }
            ],
            "transactions": [
                { "paymentMethodId": "a", "loggedAt": ts },
                { "paymentMethodId": "a", "loggedAt": ts },
                { "paymentMethodId": "b", "loggedAt": ts },
                { "paymentMethodId": "c", "loggedAt": ts },
                { "paymentMethodId": "zzz", "loggedAt": ts },
                { "loggedAt": ts }
            ]
        }));
        let v = issuer_velocities(&r, &VelocityWindow::trailing_hours(now(), 24).unwrap());
        assert_eq!(v.get("VISA"), Some(&json!(2)));
        assert_eq!(v.get("AMEX"), Some(&json!(1)));
        assert_eq!(v.get(UNKNOWN_ISSUER), Some(&json!(3)));
    }

    #[test]
    fn unparsable_timestamps_are_not_counted() {
        let r = record(json!({
            "paymentMethods": [{ "paymentMethodId": "a", "paymentMethodIssuer": "VISA" }],
            "transactions": [
                { "paymentMethodId": "a" },
                { "paymentMethodId": "a", "loggedAt": "garbage" },
                { "paymentMethodId": "a", "loggedAt": 12345 }
            ]
        }));
        let v = issuer_velocities(&r, &VelocityWindow::trailing_hours(now(), 24).unwrap());
        assert!(v.is_empty());
    }

    #[test]
    fn augment_attaches_empty_mapping() {
        let mut r = record(json!({ "paymentMethods": "not a list", "marker": 7 }));
        augment(&mut r, &VelocityWindow::trailing_hours(now(), 24).unwrap());
        assert_eq!(r.get(PAYMENT_METHOD_VELOCITIES), Some(&json!({})));
        assert_eq!(r.get("marker"), Some(&json!(7)));
    }
}
