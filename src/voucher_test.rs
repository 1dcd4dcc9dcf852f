use super::*;

fn line(side: EntrySide, account: &str, amount: f64) -> LedgerLine {
    LedgerLine { side, account_id: account.into(), amount }
}

fn draft_with(lines: Vec<LedgerLine>) -> VoucherDraft {
    VoucherDraft {
        voucher_type: VoucherType::Journal,
        entity_type: "COMPANY".into(),
        voucher_date: "2026-08-25".into(),
        narration: "Opening adjustment".into(),
        lines,
    }
}

// =============================================================================
// BALANCE
// =============================================================================

#[test]
fn equal_totals_are_balanced() {
    let lines = vec![line(EntrySide::Debit, "1001", 100.00), line(EntrySide::Credit, "2001", 100.00)];
    assert!(is_balanced(&lines));
}

#[test]
fn one_cent_off_is_unbalanced() {
    let lines = vec![line(EntrySide::Debit, "1001", 100.00), line(EntrySide::Credit, "2001", 99.99)];
    assert!(!is_balanced(&lines));
}

#[test]
fn empty_voucher_is_never_balanced() {
    assert!(!is_balanced(&[]));
}

#[test]
fn all_zero_voucher_is_never_balanced() {
    let lines = vec![line(EntrySide::Debit, "1001", 0.0), line(EntrySide::Credit, "2001", 0.0)];
    assert!(!is_balanced(&lines));
}

#[test]
fn split_sides_balance_in_cents() {
    // 33.33 + 66.67 against a single 100.00 credit.
    let lines = vec![
        line(EntrySide::Debit, "1001", 33.33),
        line(EntrySide::Debit, "1002", 66.67),
        line(EntrySide::Credit, "2001", 100.00),
    ];
    assert!(is_balanced(&lines));
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn validate_accepts_balanced_draft() {
    let draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 250.00),
        line(EntrySide::Credit, "2001", 250.00),
    ]);
    assert!(validate(&draft).is_ok());
}

#[test]
fn validate_rejects_missing_pieces() {
    let empty = draft_with(vec![]);
    assert!(matches!(validate(&empty), Err(VoucherValidationError::NoLines)));

    let mut no_narration = draft_with(vec![
        line(EntrySide::Debit, "1001", 10.0),
        line(EntrySide::Credit, "2001", 10.0),
    ]);
    no_narration.narration = "   ".into();
    assert!(matches!(validate(&no_narration), Err(VoucherValidationError::EmptyNarration)));

    let no_account = draft_with(vec![
        line(EntrySide::Debit, "", 10.0),
        line(EntrySide::Credit, "2001", 10.0),
    ]);
    assert!(matches!(
        validate(&no_account),
        Err(VoucherValidationError::MissingAccount { line: 0 })
    ));

    let zero_amount = draft_with(vec![
        line(EntrySide::Debit, "1001", 10.0),
        line(EntrySide::Credit, "2001", 0.0),
    ]);
    assert!(matches!(
        validate(&zero_amount),
        Err(VoucherValidationError::NonPositiveAmount { line: 1 })
    ));
}

#[test]
fn validate_rejects_unbalanced_with_formatted_totals() {
    let draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 100.00),
        line(EntrySide::Credit, "2001", 99.99),
    ]);
    let Err(VoucherValidationError::Unbalanced { debit, credit }) = validate(&draft) else {
        panic!("expected unbalanced");
    };
    assert_eq!(debit, "100.00");
    assert_eq!(credit, "99.99");
}

#[test]
fn validate_rejects_bad_date() {
    let mut draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 10.0),
        line(EntrySide::Credit, "2001", 10.0),
    ]);
    draft.voucher_date = "2026-13-40".into();
    assert!(matches!(validate(&draft), Err(VoucherValidationError::InvalidDate(_))));
}

// =============================================================================
// SERIALIZATION
// =============================================================================

#[test]
fn amount_formats_to_two_decimals() {
    assert_eq!(format_amount(150.5), "150.50");
    assert_eq!(format_amount(100.0), "100.00");
    assert_eq!(format_amount(0.1), "0.10");
    assert_eq!(format_amount(1234.567), "1234.57");
}

#[test]
fn amount_keeps_sign_below_one() {
    assert_eq!(format_amount(-0.5), "-0.50");
    assert_eq!(format_amount(-0.01), "-0.01");
    assert_eq!(format_amount(-12.34), "-12.34");
}

#[test]
fn payload_puts_zero_on_the_unused_side() {
    let draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 150.5),
        line(EntrySide::Credit, "2001", 150.5),
    ]);
    let payload = to_payload(&draft).unwrap();

    assert_eq!(payload.entries[0].debit_amount, "150.50");
    assert_eq!(payload.entries[0].credit_amount, "0.00");
    assert_eq!(payload.entries[1].debit_amount, "0.00");
    assert_eq!(payload.entries[1].credit_amount, "150.50");
}

#[test]
fn payload_normalizes_date_to_utc_midnight() {
    let draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 10.0),
        line(EntrySide::Credit, "2001", 10.0),
    ]);
    let payload = to_payload(&draft).unwrap();
    assert_eq!(payload.voucher_date, "2026-08-25T00:00:00Z");
    assert_eq!(payload.narration, "Opening adjustment");
}

#[test]
fn payload_serializes_camel_case() {
    let draft = draft_with(vec![
        line(EntrySide::Debit, "1001", 10.0),
        line(EntrySide::Credit, "2001", 10.0),
    ]);
    let json = serde_json::to_value(to_payload(&draft).unwrap()).unwrap();
    assert_eq!(json.get("voucherType").and_then(|v| v.as_str()), Some("JOURNAL"));
    assert_eq!(json.get("entityType").and_then(|v| v.as_str()), Some("COMPANY"));
    let entry = &json["entries"][0];
    assert_eq!(entry.get("accountId").and_then(|v| v.as_str()), Some("1001"));
    assert_eq!(entry.get("debitAmount").and_then(|v| v.as_str()), Some("10.00"));
}

#[test]
fn unbalanced_draft_never_serializes() {
    let draft = draft_with(vec![line(EntrySide::Debit, "1001", 10.0)]);
    assert!(to_payload(&draft).is_err());
}
