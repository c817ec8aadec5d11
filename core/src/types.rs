//! Shared primitive types and field names used across both passes.

use chrono::{DateTime, Utc};

/// An event-time instant. All generated timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// A synthetic identifier (payment method, order, transaction).
pub type EntityId = String;

/// 1-based line number within a JSON-lines file.
pub type LineNumber = u64;

// ── Record field names ─────────────────────────────────────────

pub const CUSTOMER: &str = "customer";
pub const PAYMENT_METHODS: &str = "paymentMethods";
pub const ORDERS: &str = "orders";
pub const TRANSACTIONS: &str = "transactions";

pub const CUSTOMER_EMAIL: &str = "customerEmail";
pub const CUSTOMER_PHONE: &str = "customerPhone";
pub const CUSTOMER_DEVICE: &str = "customerDevice";
pub const CUSTOMER_IP_ADDRESS: &str = "customerIPAddress";

pub const PAYMENT_METHOD_ID: &str = "paymentMethodId";
pub const PAYMENT_METHOD_ISSUER: &str = "paymentMethodIssuer";
pub const ORDER_ID: &str = "orderId";
pub const ORDER_AMOUNT: &str = "orderAmount";
pub const TRANSACTION_ID: &str = "transactionId";
pub const TRANSACTION_AMOUNT: &str = "transactionAmount";
pub const LOGGED_AT: &str = "loggedAt";

pub const PAYMENT_METHOD_VELOCITIES: &str = "paymentMethodVelocities";

/// Bucket for transactions whose issuer cannot be resolved.
pub const UNKNOWN_ISSUER: &str = "unknown";
