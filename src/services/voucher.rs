//! Voucher service — validate, normalize, forward.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures abort before any network call; upstream failures
//! keep the draft intact on the client so the merchant can fix and retry.
//! The two classes stay distinct all the way to the HTTP status.

use tracing::info;

use crate::state::AppState;
use crate::upstream::UpstreamError;
use crate::upstream::types::{AccountRef, VoucherReceipt};
use crate::voucher::{self, VoucherDraft, VoucherValidationError};

#[derive(Debug, thiserror::Error)]
pub enum VoucherSubmitError {
    #[error(transparent)]
    Validation(#[from] VoucherValidationError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("commerce backend is not configured")]
    NotConfigured,
}

/// Validate a draft and create the voucher upstream.
///
/// # Errors
///
/// `Validation` before any network call, `Upstream` after, or
/// `NotConfigured` when the backend is absent.
pub async fn submit(state: &AppState, draft: &VoucherDraft) -> Result<VoucherReceipt, VoucherSubmitError> {
    let upstream = state.upstream.as_ref().ok_or(VoucherSubmitError::NotConfigured)?;
    let payload = voucher::to_payload(draft)?;
    let receipt = upstream.create_voucher(&payload).await?;
    info!(voucher_number = %receipt.voucher_number, entries = payload.entries.len(), "voucher created");
    Ok(receipt)
}

/// Chart-of-accounts proxy for the line-entry account picker.
///
/// # Errors
///
/// `Upstream` or `NotConfigured`.
pub async fn list_accounts(state: &AppState, entity_type: &str) -> Result<Vec<AccountRef>, VoucherSubmitError> {
    let upstream = state.upstream.as_ref().ok_or(VoucherSubmitError::NotConfigured)?;
    Ok(upstream.list_accounts(entity_type).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_helpers::{self, MockCommerce};
    use crate::voucher::{EntrySide, LedgerLine, VoucherType};
    use std::sync::Arc;

    fn balanced_draft() -> VoucherDraft {
        VoucherDraft {
            voucher_type: VoucherType::Payment,
            entity_type: "COMPANY".into(),
            voucher_date: "2026-08-25".into(),
            narration: "Office rent".into(),
            lines: vec![
                LedgerLine { side: EntrySide::Debit, account_id: "6001".into(), amount: 500.0 },
                LedgerLine { side: EntrySide::Credit, account_id: "1001".into(), amount: 500.0 },
            ],
        }
    }

    #[tokio::test]
    async fn submit_forwards_serialized_payload() {
        let mock = Arc::new(MockCommerce::default());
        let state = test_helpers::test_app_state_with_upstream(mock.clone());

        let receipt = submit(&state, &balanced_draft()).await.unwrap();
        assert_eq!(receipt.voucher_number, "JV-2026-0001");

        let seen = mock.vouchers_seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].voucher_date, "2026-08-25T00:00:00Z");
        assert_eq!(seen[0].entries[0].debit_amount, "500.00");
        assert_eq!(seen[0].entries[0].credit_amount, "0.00");
    }

    #[tokio::test]
    async fn submit_rejects_unbalanced_before_any_call() {
        let mock = Arc::new(MockCommerce::default());
        let state = test_helpers::test_app_state_with_upstream(mock.clone());

        let mut draft = balanced_draft();
        draft.lines[1].amount = 499.99;
        let err = submit(&state, &draft).await.unwrap_err();
        assert!(matches!(err, VoucherSubmitError::Validation(_)));
        assert!(mock.vouchers_seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn submit_surfaces_upstream_message() {
        let mock = Arc::new(MockCommerce { fail_message: Some("period closed".into()), ..MockCommerce::default() });
        let state = test_helpers::test_app_state_with_upstream(mock);

        let err = submit(&state, &balanced_draft()).await.unwrap_err();
        let VoucherSubmitError::Upstream(UpstreamError::Api { message, .. }) = err else {
            panic!("expected upstream error");
        };
        assert_eq!(message, "period closed");
    }

    #[tokio::test]
    async fn submit_without_backend_is_not_configured() {
        let state = test_helpers::test_app_state();
        let err = submit(&state, &balanced_draft()).await.unwrap_err();
        assert!(matches!(err, VoucherSubmitError::NotConfigured));
    }

    #[tokio::test]
    async fn list_accounts_proxies_upstream() {
        let state = test_helpers::test_app_state_with_upstream(Arc::new(MockCommerce::default()));
        let accounts = list_accounts(&state, "COMPANY").await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].code, "CASH");
    }
}
