//! The dataset generator: templates in, linked synthetic records out.
//!
//! EXECUTION ORDER per row (fixed, never reordered; every step draws
//! from the shared RNG and the order is part of the determinism contract):
//!   1. Pick a template and deep-copy it.
//!   2. Customer identity fields.
//!   3. Payment method ids          (row-scoped id map)
//!   4. Order ids and amounts       (row-scoped id map)
//!   5. Transaction ids, references and amounts
//!   6. Timestamps: row, payment methods, orders, transactions.
//!
//! RULES:
//!   - Id maps live for one row only. They are never shared or merged.
//!   - The event clock only moves forward.
//!   - A missing substructure or an unmapped id is a no-op, not an error.

use crate::{
    clock::{format_timestamp, EventClock},
    config::GeneratorConfig,
    error::{GenError, GenResult},
    identity::IdentityGenerator,
    record::{perturb_amount, str_field, Record},
    rng::DatasetRng,
    template::load_templates,
    types::*,
};
use chrono::Duration;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const PROGRESS_INTERVAL: u64 = 100_000;

/// Per-row clock step bounds (minutes unless noted).
const ROW_STEP_MINUTES: (i64, i64) = (1, 180);
const PAYMENT_METHOD_STEP_MINUTES: (i64, i64) = (1, 10);
const ORDER_STEP_MINUTES: (i64, i64) = (5, 60);
const TRANSACTION_OFFSET_SECONDS: (i64, i64) = (5, 300);
const FALLBACK_STEP_SECONDS: (i64, i64) = (30, 90);
const AMOUNT_DELTA: (i64, i64) = (-5, 5);

/// Old id → new id, valid for the single record being generated.
#[derive(Debug, Default)]
struct IdMap {
    forward: HashMap<String, EntityId>,
}

impl IdMap {
    fn insert(&mut self, old: &str, new: &str) {
        self.forward.insert(old.to_string(), new.to_string());
    }

    fn get(&self, old: &str) -> Option<&str> {
        self.forward.get(old).map(String::as_str)
    }
}

/// Outcome of a full generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub templates_loaded: usize,
    pub rows_written: u64,
    pub output_path: PathBuf,
}

/// Owns the RNG and event clock for one run.
pub struct DatasetGenerator {
    templates: Vec<Record>,
    rng: DatasetRng,
    clock: EventClock,
    rows_generated: u64,
}

impl DatasetGenerator {
    /// Fails with `TemplateMalformed` when `templates` is empty.
    pub fn new(templates: Vec<Record>, seed: u64) -> GenResult<Self> {
        if templates.is_empty() {
            return Err(GenError::TemplateMalformed {
                path: "<in-memory>".to_string(),
                line: 0,
                reason: "no template records".to_string(),
            });
        }
        Ok(Self {
            templates,
            rng: DatasetRng::new(seed),
            clock: EventClock::default(),
            rows_generated: 0,
        })
    }

    pub fn rows_generated(&self) -> u64 {
        self.rows_generated
    }

    pub fn clock(&self) -> &EventClock {
        &self.clock
    }

    /// Produce the next generated record.
    pub fn next_record(&mut self) -> Record {
        let index = self.rng.pick_index(self.templates.len());
        let mut record = self.templates[index].clone();

        self.mutate_customer(&mut record);
        let payment_ids = self.mutate_payment_methods(&mut record);
        let order_ids = self.mutate_orders(&mut record);
        self.mutate_transactions(&mut record, &order_ids, &payment_ids);
        self.stamp_times(&mut record);

        self.rows_generated += 1;
        record
    }

    /// Write `rows` records as JSON lines. Returns the number written.
    pub fn write_rows<W: Write>(&mut self, rows: u64, mut out: W) -> GenResult<u64> {
        for i in 0..rows {
            let record = self.next_record();
            writeln!(out, "{}", record.to_json_line()?)?;

            if (i + 1) % PROGRESS_INTERVAL == 0 {
                log::info!("  ... {} / {rows} rows generated.", i + 1);
            }
        }
        out.flush()?;
        Ok(rows)
    }

    fn mutate_customer(&mut self, record: &mut Record) {
        let Some(customer) = record.customer_mut() else {
            return;
        };
        let rng = &mut self.rng;
        customer.insert(CUSTOMER_EMAIL.into(), IdentityGenerator::email(rng).into());
        customer.insert(CUSTOMER_PHONE.into(), IdentityGenerator::phone(rng).into());
        customer.insert(CUSTOMER_DEVICE.into(), IdentityGenerator::device(rng).into());
        customer.insert(
            CUSTOMER_IP_ADDRESS.into(),
            IdentityGenerator::ip_address(rng).into(),
        );
    }

    fn mutate_payment_methods(&mut self, record: &mut Record) -> IdMap {
        let mut ids = IdMap::default();
        let Some(methods) = record.payment_methods_mut() else {
            return ids;
        };
        for method in methods.iter_mut() {
            let Some(old_id) = str_field(method, PAYMENT_METHOD_ID).map(str::to_string) else {
                continue;
            };
            let new_id = IdentityGenerator::payment_method_id(&mut self.rng);
            ids.insert(&old_id, &new_id);
            method[PAYMENT_METHOD_ID] = Value::String(new_id);
        }
        ids
    }

    fn mutate_orders(&mut self, record: &mut Record) -> IdMap {
        let mut ids = IdMap::default();
        let Some(orders) = record.orders_mut() else {
            return ids;
        };
        for order in orders.iter_mut().filter(|o| o.is_object()) {
            if let Some(old_id) = str_field(order, ORDER_ID).map(str::to_string) {
                let new_id = IdentityGenerator::order_id(&mut self.rng);
                ids.insert(&old_id, &new_id);
                order[ORDER_ID] = Value::String(new_id);
            }
            let delta = self.rng.range_inclusive(AMOUNT_DELTA.0, AMOUNT_DELTA.1);
            let amount = perturb_amount(order.get(ORDER_AMOUNT), delta);
            order[ORDER_AMOUNT] = amount;
        }
        ids
    }

    fn mutate_transactions(
        &mut self,
        record: &mut Record,
        order_ids: &IdMap,
        payment_ids: &IdMap,
    ) {
        let order_amounts = first_by_order_id(record.orders(), |order| {
            order.get(ORDER_AMOUNT).cloned()
        });
        let Some(transactions) = record.transactions_mut() else {
            return;
        };
        for txn in transactions.iter_mut().filter(|t| t.is_object()) {
            txn[TRANSACTION_ID] = Value::String(IdentityGenerator::transaction_id(&mut self.rng));

            let new_order_id = str_field(txn, ORDER_ID)
                .and_then(|old| order_ids.get(old))
                .map(str::to_string);
            if let Some(new_id) = &new_order_id {
                txn[ORDER_ID] = Value::String(new_id.clone());
            }

            if let Some(new_pm) = str_field(txn, PAYMENT_METHOD_ID)
                .and_then(|old| payment_ids.get(old))
                .map(str::to_string)
            {
                txn[PAYMENT_METHOD_ID] = Value::String(new_pm);
            }

            if let Some(amount) = new_order_id.and_then(|id| order_amounts.get(&id).cloned()) {
                txn[TRANSACTION_AMOUNT] = amount;
            }
        }
    }

    fn stamp_times(&mut self, record: &mut Record) {
        let row_start = self.step_minutes(ROW_STEP_MINUTES);
        if let Some(customer) = record.customer_mut() {
            customer.insert(LOGGED_AT.into(), format_timestamp(&row_start).into());
        }

        if let Some(methods) = record.payment_methods_mut() {
            for method in methods.iter_mut().filter(|m| m.is_object()) {
                let at = self.step_minutes(PAYMENT_METHOD_STEP_MINUTES);
                method[LOGGED_AT] = format_timestamp(&at).into();
            }
        }

        let mut order_times: HashMap<String, Timestamp> = HashMap::new();
        if let Some(orders) = record.orders_mut() {
            for order in orders.iter_mut().filter(|o| o.is_object()) {
                let at = self.step_minutes(ORDER_STEP_MINUTES);
                order[LOGGED_AT] = format_timestamp(&at).into();
                if let Some(id) = str_field(order, ORDER_ID) {
                    order_times.entry(id.to_string()).or_insert(at);
                }
            }
        }

        let Some(transactions) = record.transactions_mut() else {
            return;
        };
        for txn in transactions.iter_mut().filter(|t| t.is_object()) {
            let order_time = str_field(txn, ORDER_ID)
                .and_then(|id| order_times.get(id))
                .copied();
            let at = match order_time {
                Some(order_at) => {
                    let (lo, hi) = TRANSACTION_OFFSET_SECONDS;
                    order_at + Duration::seconds(self.rng.range_inclusive(lo, hi))
                }
                None => {
                    let (lo, hi) = FALLBACK_STEP_SECONDS;
                    let step = self.rng.range_inclusive(lo, hi);
                    self.clock.advance_seconds(step)
                }
            };
            txn[LOGGED_AT] = format_timestamp(&at).into();
        }
    }

    fn step_minutes(&mut self, (lo, hi): (i64, i64)) -> Timestamp {
        let step = self.rng.range_inclusive(lo, hi);
        self.clock.advance_minutes(step)
    }
}

/// Map each order id to a value derived from the first order carrying it.
fn first_by_order_id<T>(
    orders: &[Value],
    f: impl Fn(&Value) -> Option<T>,
) -> HashMap<String, T> {
    let mut out = HashMap::new();
    for order in orders {
        if let (Some(id), Some(v)) = (str_field(order, ORDER_ID), f(order)) {
            out.entry(id.to_string()).or_insert(v);
        }
    }
    out
}

/// Run a full generation pass: load templates, write `row_count` rows.
pub fn generate_dataset(config: &GeneratorConfig) -> GenResult<GenerationSummary> {
    let templates = load_templates(&config.template_path)?;
    let templates_loaded = templates.len();
    let output_path = config.resolved_output_path();

    let file = File::create(&output_path).map_err(|source| GenError::Output {
        path: output_path.display().to_string(),
        source,
    })?;

    log::info!(
        "Starting generation of {} rows (seed {}). This may take a while...",
        config.row_count,
        config.seed
    );
    let mut generator = DatasetGenerator::new(templates, config.seed)?;
    let rows_written = generator.write_rows(config.row_count, BufWriter::new(file))?;
    log::info!(
        "Generation complete. {rows_written} rows saved to '{}'.",
        output_path.display()
    );

    Ok(GenerationSummary {
        templates_loaded,
        rows_written,
        output_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn partial_template_does_not_fail() {
        let tpl = template(json!({ "note": "bare" }));
        let mut generator = DatasetGenerator::new(vec![tpl], 1).unwrap();
        let record = generator.next_record();
        assert_eq!(record.get("note"), Some(&json!("bare")));
        assert!(record.get(CUSTOMER).is_none());
    }

    #[test]
    fn template_is_never_aliased() {
        let tpl = template(json!({
            "customer": { "customerEmail": "orig@example.com" },
            "orders": [{ "orderId": "o1", "orderAmount": 10 }]
        }));
        let mut generator = DatasetGenerator::new(vec![tpl.clone()], 5).unwrap();
        let _ = generator.next_record();
        let _ = generator.next_record();
        assert_eq!(generator.templates[0], tpl);
    }

    #[test]
    fn unmapped_transaction_ids_are_left_alone() {
        let tpl = template(json!({
            "orders": [{ "orderId": "o1", "orderAmount": 10 }],
            "transactions": [{
                "orderId": "ghost",
                "paymentMethodId": "pm-ghost",
                "transactionAmount": 99
            }]
        }));
        let mut generator = DatasetGenerator::new(vec![tpl], 11).unwrap();
        let record = generator.next_record();
        let txn = &record.transactions()[0];
        assert_eq!(txn[ORDER_ID], json!("ghost"));
        assert_eq!(txn[PAYMENT_METHOD_ID], json!("pm-ghost"));
        assert_eq!(txn[TRANSACTION_AMOUNT], json!(99));
        assert_eq!(txn[TRANSACTION_ID].as_str().map(str::len), Some(8));
    }

    #[test]
    fn fallback_transactions_advance_the_clock() {
        let tpl = template(json!({ "transactions": [{ "orderId": "none" }] }));
        let mut generator = DatasetGenerator::new(vec![tpl], 3).unwrap();
        let record = generator.next_record();
        let stamped = record.transactions()[0][LOGGED_AT].as_str().unwrap().to_string();
        assert_eq!(stamped, format_timestamp(&generator.clock().now()));
    }

    #[test]
    fn empty_template_set_is_an_error() {
        let result = DatasetGenerator::new(Vec::new(), 1);
        assert!(matches!(result, Err(GenError::TemplateMalformed { line: 0, .. })));
    }

    #[test]
    fn rows_generated_counts_every_row() {
        let mut generator = DatasetGenerator::new(vec![template(json!({}))], 9).unwrap();
        let mut sink = Vec::new();
        let written = generator.write_rows(25, &mut sink).unwrap();
        assert_eq!(written, 25);
        assert_eq!(generator.rows_generated(), 25);
        assert_eq!(String::from_utf8(sink).unwrap().lines().count(), 25);
    }
}
