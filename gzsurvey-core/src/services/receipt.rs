// File: gzsurvey-core/src/services/receipt.rs

use gzsurvey_common::models::store::{store_for_prefix, StoreLocation};
use crate::Error;

pub const MIN_RECEIPT_LEN: usize = 5;
pub const MAX_RECEIPT_LEN: usize = 50;
const PREFIX_LEN: usize = 4;

/// A receipt that passed validation, normalised to uppercase, plus the
/// branch its prefix belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReceipt {
    pub receipt: String,
    pub store: &'static StoreLocation,
}

impl ValidReceipt {
    pub fn brand(&self) -> &'static str {
        self.store.brand
    }

    pub fn branch(&self) -> &'static str {
        self.store.branch
    }
}

/// Checks a raw receipt string and resolves its branch.
///
/// Surrounding whitespace is ignored. The receipt must be 5 to 50
/// characters of `[A-Za-z0-9-]` and start with a known 4-character branch
/// prefix (any case).
pub fn validate_receipt(raw: &str) -> Result<ValidReceipt, Error> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidReceipt("Receipt is required".into()));
    }
    if trimmed.len() < MIN_RECEIPT_LEN || trimmed.len() > MAX_RECEIPT_LEN {
        return Err(Error::InvalidReceipt(format!(
            "Receipt must be between {} and {} characters",
            MIN_RECEIPT_LEN, MAX_RECEIPT_LEN
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Error::InvalidReceipt(
            "Receipt may only contain letters, digits and hyphens".into(),
        ));
    }

    // All ASCII at this point, so byte slicing is safe.
    let store = store_for_prefix(&trimmed[..PREFIX_LEN])
        .ok_or_else(|| Error::InvalidReceipt("Receipt is not from a participating branch".into()))?;

    Ok(ValidReceipt {
        receipt: trimmed.to_ascii_uppercase(),
        store,
    })
}
