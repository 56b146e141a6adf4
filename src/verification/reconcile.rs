//! Amount and currency reconciliation.
//!
//! The caller may send its expected amount either in the smallest currency
//! unit ("7500000" kobo) or in the main unit ("75000" naira) without saying
//! which. Both readings are tried. For round amounts the two readings can
//! both land on plausible gateway values (100 matches 100 kobo and 1.00
//! naira); that tolerance is intentional and kept.

use serde_json::Value;

use super::VerificationRequest;
use crate::gateway_client::GatewayTransaction;

/// Per-check outcome of reconciling a transaction against a request.
///
/// `None` means the check did not apply (the caller sent no amount, or one
/// side had no currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub status_ok: bool,
    pub amount_ok: Option<bool>,
    pub currency_ok: Option<bool>,
}

impl Reconciliation {
    pub fn verified(&self) -> bool {
        self.status_ok && self.amount_ok != Some(false) && self.currency_ok != Some(false)
    }
}

/// Checks `transaction` against the expectations in `request`.
pub fn reconcile(transaction: &GatewayTransaction, request: &VerificationRequest) -> Reconciliation {
    let amount_ok = request
        .amount
        .as_ref()
        .map(|expected| amounts_match(transaction.amount(), expected));

    let expected_currency = request.currency.as_deref().filter(|c| !c.is_empty());
    let actual_currency = transaction.currency().filter(|c| !c.is_empty());
    let currency_ok = match (expected_currency, actual_currency) {
        (Some(expected), Some(actual)) => Some(currencies_match(expected, actual)),
        _ => None,
    };

    Reconciliation {
        status_ok: transaction.is_successful(),
        amount_ok,
        currency_ok,
    }
}

/// Reads a client-supplied amount as a finite number.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace allowed).
/// Anything else, including blank strings, is not a number.
pub fn normalize_amount(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Whether the gateway amount (smallest unit) matches the client's amount
/// read either as smallest units or as main units.
pub fn amounts_match(gateway_amount: Option<f64>, client_amount: &Value) -> bool {
    let (Some(actual), Some(expected)) = (gateway_amount, normalize_amount(client_amount)) else {
        return false;
    };

    let as_smallest_unit = expected.round();
    let as_main_unit = (expected * 100.0).round();
    actual == as_smallest_unit || actual == as_main_unit
}

pub fn currencies_match(expected: &str, actual: &str) -> bool {
    expected.to_uppercase() == actual.to_uppercase()
}
