//! Generate one row from a single linked template, then run the
//! velocity pass over it.

use chrono::{Duration, Utc};
use serde_json::json;
use std::fs;
use velocity_core::{
    clock::format_timestamp, generate_dataset, run_velocity, velocity::parse_logged_at,
    GeneratorConfig, Record, VelocityConfig,
};

#[test]
fn generated_row_feeds_the_velocity_pass() {
    let dir = tempfile::tempdir().unwrap();
    let now = Utc::now();

    let template = json!({
        "customer": { "customerName": "Sam" },
        "paymentMethods": [{ "paymentMethodId": "pm1", "paymentMethodIssuer": "VISA" }],
        "orders": [{ "orderId": "o1", "orderAmount": 10 }],
        "transactions": [{
            "orderId": "o1",
            "paymentMethodId": "pm1",
            "loggedAt": format_timestamp(&now)
        }]
    });
    let template_path = dir.path().join("customers.json");
    fs::write(&template_path, format!("{template}\n")).unwrap();

    let gen_config = GeneratorConfig {
        template_path,
        output_path: Some(dir.path().join("generated.jsonl")),
        seed: 7,
        row_count: 1,
    };
    let summary = generate_dataset(&gen_config).unwrap();
    let generated = fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(generated.lines().count(), 1);

    let record: Record = serde_json::from_str(generated.trim_end()).unwrap();
    let order = &record.orders()[0];
    let method = &record.payment_methods()[0];
    let txn = &record.transactions()[0];

    assert_ne!(order["orderId"], json!("o1"));
    assert_ne!(method["paymentMethodId"], json!("pm1"));
    assert_eq!(txn["orderId"], order["orderId"]);
    assert_eq!(txn["paymentMethodId"], method["paymentMethodId"]);
    assert_eq!(txn["transactionAmount"], order["orderAmount"]);
    assert!(order["orderAmount"].as_i64().unwrap() >= 1);

    let order_at = parse_logged_at(order["loggedAt"].as_str().unwrap()).unwrap();
    let txn_at = parse_logged_at(txn["loggedAt"].as_str().unwrap()).unwrap();
    assert!(txn_at >= order_at);
    assert!(txn_at - order_at <= Duration::minutes(5));

    let velocity_config = VelocityConfig {
        input_path: summary.output_path.clone(),
        batch_size: 1,
        ..VelocityConfig::default()
    };
    // Generated timestamps sit on the 2023 event clock; measure the
    // window from the transaction itself.
    let report = run_velocity(&velocity_config, txn_at).unwrap();
    assert_eq!(report.records_written, 1);
    assert_eq!(
        report.output_path,
        dir.path().join("velocity_generated.jsonl")
    );

    let out = fs::read_to_string(&report.output_path).unwrap();
    let augmented: Record = serde_json::from_str(out.trim_end()).unwrap();
    assert_eq!(
        augmented.get("paymentMethodVelocities"),
        Some(&json!({ "VISA": 1 }))
    );
    assert_eq!(augmented.orders(), record.orders());
}
