//! Deterministic synthetic identity generation.
//!
//! Replaces PII-like customer fields and entity identifiers with
//! values drawn from the dataset RNG. No uniqueness is guaranteed
//! across rows; same seed gives the same values.

use crate::rng::DatasetRng;

pub const PAYMENT_METHOD_ID_LEN: usize = 9;
pub const ORDER_ID_LEN: usize = 6;
pub const TRANSACTION_ID_LEN: usize = 8;

const EMAIL_LOCAL_LEN: usize = 10;
const DEVICE_LEN: usize = 20;

/// Deterministic generator for identity fields and entity ids.
pub struct IdentityGenerator;

impl IdentityGenerator {
    /// `xxxxxxxxxx@example.com`
    pub fn email(rng: &mut DatasetRng) -> String {
        format!("{}@example.com", rng.alphanumeric(EMAIL_LOCAL_LEN))
    }

    /// `NNN-555-NNNN`
    pub fn phone(rng: &mut DatasetRng) -> String {
        let area = rng.range_inclusive(100, 999);
        let line = rng.range_inclusive(1000, 9999);
        format!("{area}-555-{line}")
    }

    /// Opaque device fingerprint.
    pub fn device(rng: &mut DatasetRng) -> String {
        rng.alphanumeric(DEVICE_LEN)
    }

    /// Dotted IPv4, first octet never zero.
    pub fn ip_address(rng: &mut DatasetRng) -> String {
        let a = rng.range_inclusive(1, 255);
        let b = rng.range_inclusive(0, 255);
        let c = rng.range_inclusive(0, 255);
        let d = rng.range_inclusive(0, 255);
        format!("{a}.{b}.{c}.{d}")
    }

    pub fn payment_method_id(rng: &mut DatasetRng) -> String {
        rng.alphanumeric(PAYMENT_METHOD_ID_LEN)
    }

    pub fn order_id(rng: &mut DatasetRng) -> String {
        rng.alphanumeric(ORDER_ID_LEN)
    }

    pub fn transaction_id(rng: &mut DatasetRng) -> String {
        rng.alphanumeric(TRANSACTION_ID_LEN)
    }
}
