//! Voucher drafts — double-entry form validation and wire normalization.
//!
//! DESIGN
//! ======
//! A draft is built up line by line on the client and submitted as one
//! request. Everything here runs before any network call: required-field
//! checks, the balance rule, and normalization into the upstream payload.
//! Amounts are compared in minor units (cents) so `100.00` vs `99.99` is a
//! clean integer mismatch, never a float-epsilon judgment call. The ledger
//! itself lives in the commerce backend; this layer is advisory validation
//! plus serialization, nothing more.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Time, UtcOffset};

use crate::upstream::types::{VoucherEntryPayload, VoucherPayload};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    Payment,
    Receipt,
    Journal,
    Contra,
    Sales,
    Purchase,
}

/// Every ledger line is debit-or-credit exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    Debit,
    Credit,
}

/// One debit-or-credit row in a voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLine {
    pub side: EntrySide,
    pub account_id: String,
    pub amount: f64,
}

/// The voucher entry form, as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDraft {
    pub voucher_type: VoucherType,
    pub entity_type: String,
    /// Calendar date from the date picker, `YYYY-MM-DD`.
    pub voucher_date: String,
    pub narration: String,
    pub lines: Vec<LedgerLine>,
}

#[derive(Debug, thiserror::Error)]
pub enum VoucherValidationError {
    #[error("a voucher needs at least one ledger line")]
    NoLines,
    #[error("narration must not be empty")]
    EmptyNarration,
    #[error("line {line} has no account selected")]
    MissingAccount { line: usize },
    #[error("line {line} must have a positive amount")]
    NonPositiveAmount { line: usize },
    #[error("invalid voucher date: {0}")]
    InvalidDate(String),
    #[error("voucher is not balanced: debit {debit} vs credit {credit}")]
    Unbalanced { debit: String, credit: String },
}

// =============================================================================
// AMOUNTS
// =============================================================================

/// Amount in minor units, rounded half away from zero.
#[allow(clippy::cast_possible_truncation)]
fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Fixed two-decimal-place string, e.g. `150.5 → "150.50"`.
///
/// The sign is emitted separately so fractional negatives keep it
/// (`-0.5` truncates to integer part `0`, which would swallow the `-`).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let cents = to_cents(amount);
    let sign = if cents < 0 { "-" } else { "" };
    format!("{sign}{}.{:02}", (cents / 100).abs(), (cents % 100).abs())
}

fn totals_cents(lines: &[LedgerLine]) -> (i64, i64) {
    let debit = lines
        .iter()
        .filter(|l| l.side == EntrySide::Debit)
        .map(|l| to_cents(l.amount))
        .sum();
    let credit = lines
        .iter()
        .filter(|l| l.side == EntrySide::Credit)
        .map(|l| to_cents(l.amount))
        .sum();
    (debit, credit)
}

/// Balanced iff total debits equal total credits and the total is
/// strictly positive. An empty or all-zero voucher is never balanced.
#[must_use]
pub fn is_balanced(lines: &[LedgerLine]) -> bool {
    let (debit, credit) = totals_cents(lines);
    debit == credit && debit > 0
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Submit-time checks, cheapest first. All failures abort before any
/// network call and leave the draft untouched for retry.
///
/// # Errors
///
/// The first failed check, in form order.
pub fn validate(draft: &VoucherDraft) -> Result<(), VoucherValidationError> {
    if draft.lines.is_empty() {
        return Err(VoucherValidationError::NoLines);
    }
    if draft.narration.trim().is_empty() {
        return Err(VoucherValidationError::EmptyNarration);
    }
    for (i, line) in draft.lines.iter().enumerate() {
        if line.account_id.trim().is_empty() {
            return Err(VoucherValidationError::MissingAccount { line: i });
        }
        if to_cents(line.amount) <= 0 {
            return Err(VoucherValidationError::NonPositiveAmount { line: i });
        }
    }
    normalize_date(&draft.voucher_date)?;

    let (debit, credit) = totals_cents(&draft.lines);
    if debit != credit || debit <= 0 {
        return Err(VoucherValidationError::Unbalanced {
            debit: format!("{}.{:02}", debit / 100, (debit % 100).abs()),
            credit: format!("{}.{:02}", credit / 100, (credit % 100).abs()),
        });
    }
    Ok(())
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Normalize a `YYYY-MM-DD` picker date to the fixed machine-readable
/// timestamp the backend expects: RFC 3339 at UTC midnight.
///
/// # Errors
///
/// `InvalidDate` if the input is not a real calendar date.
pub fn normalize_date(raw: &str) -> Result<String, VoucherValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(raw.trim(), &format)
        .map_err(|_| VoucherValidationError::InvalidDate(raw.to_string()))?;
    let ts = date.with_time(Time::MIDNIGHT).assume_offset(UtcOffset::UTC);
    ts.format(&Rfc3339)
        .map_err(|_| VoucherValidationError::InvalidDate(raw.to_string()))
}

/// Validate and serialize a draft into the upstream creation payload.
/// Every entry carries both columns; the side that was not chosen is
/// always `"0.00"`, never omitted.
///
/// # Errors
///
/// Any validation failure from [`validate`].
pub fn to_payload(draft: &VoucherDraft) -> Result<VoucherPayload, VoucherValidationError> {
    validate(draft)?;
    let entries = draft
        .lines
        .iter()
        .map(|line| {
            let amount = format_amount(line.amount);
            let (debit_amount, credit_amount) = match line.side {
                EntrySide::Debit => (amount, "0.00".to_string()),
                EntrySide::Credit => ("0.00".to_string(), amount),
            };
            VoucherEntryPayload { account_id: line.account_id.clone(), debit_amount, credit_amount }
        })
        .collect();

    Ok(VoucherPayload {
        voucher_type: draft.voucher_type,
        entity_type: draft.entity_type.clone(),
        voucher_date: normalize_date(&draft.voucher_date)?,
        narration: draft.narration.trim().to_string(),
        entries,
    })
}

#[cfg(test)]
#[path = "voucher_test.rs"]
mod tests;
