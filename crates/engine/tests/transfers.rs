//! Transfer engine scenarios: validation order, balances, journal effects

use corebank_core::{AccountId, AccountNumber, TransferRequest};
use corebank_engine::{Bank, ProvisionError, TransferError};
use corebank_journal::JournalReader;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn seeded_bank(dir: &std::path::Path, seeds: &[(&str, Decimal)]) -> (Bank, Vec<AccountId>) {
    let bank = Bank::open(dir).unwrap();
    let mut ids = Vec::new();
    for (number, seed) in seeds {
        let account = bank
            .open_account(AccountNumber::new(*number).unwrap(), *seed)
            .await
            .unwrap();
        ids.push(account.id);
    }
    (bank, ids)
}

#[tokio::test]
async fn happy_path_moves_money_and_appends_one_entry() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(500)), ("B01", dec!(100))]).await;
    let (a, b) = (ids[0], ids[1]);

    let outcome = bank
        .transfer(TransferRequest::new(a, b, dec!(150.00)).with_description("rent"))
        .await
        .unwrap();

    assert_eq!(outcome.new_source_balance.value(), dec!(350.00));
    assert_eq!(outcome.entry.amount.value(), dec!(150.00));
    assert_eq!(outcome.entry.source, Some(a));
    assert_eq!(outcome.entry.destination, b);
    assert_eq!(outcome.entry.description.as_deref(), Some("rent"));

    assert_eq!(bank.balance(a).await.unwrap().value(), dec!(350.00));
    assert_eq!(bank.balance(b).await.unwrap().value(), dec!(250.00));

    // Exactly one movement entry beyond the two account_opened records
    let entries = JournalReader::new(dir.path()).entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount.value(), dec!(150.00));
}

#[tokio::test]
async fn insufficient_funds_leaves_balances_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(50)), ("B01", dec!(0))]).await;

    let err = bank
        .transfer(TransferRequest::new(ids[0], ids[1], dec!(100.00)))
        .await
        .unwrap_err();
    assert!(err.is_insufficient_funds());

    assert_eq!(bank.balance(ids[0]).await.unwrap().value(), dec!(50));
    assert_eq!(bank.balance(ids[1]).await.unwrap().value(), dec!(0));
    assert!(JournalReader::new(dir.path()).entries().unwrap().is_empty());
}

#[tokio::test]
async fn self_transfer_is_rejected_before_anything_else() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(500))]).await;

    let err = bank
        .transfer(TransferRequest::new(ids[0], ids[0], dec!(10.00)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::SelfTransfer));
}

#[tokio::test]
async fn amount_validation() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(500)), ("B01", dec!(0))]).await;
    let (a, b) = (ids[0], ids[1]);

    for bad in [dec!(0), dec!(-5), dec!(0.001)] {
        let err = bank.transfer(TransferRequest::new(a, b, bad)).await.unwrap_err();
        assert!(
            matches!(&err, TransferError::InvalidAmount(_)),
            "expected InvalidAmount for {bad}, got {err:?}"
        );
    }

    // Two decimal places are the finest grain accepted
    bank.transfer(TransferRequest::new(a, b, dec!(0.01)))
        .await
        .unwrap();
}

#[tokio::test]
async fn unknown_accounts_get_distinct_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(500))]).await;
    let ghost = AccountId::new(999);

    let err = bank
        .transfer(TransferRequest::new(ghost, ids[0], dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::SourceNotFound(id) if id == ghost));

    let err = bank
        .transfer(TransferRequest::new(ids[0], ghost, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::DestinationNotFound(id) if id == ghost));
}

#[tokio::test]
async fn deposits_and_withdrawals() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(0))]).await;
    let a = ids[0];

    let entry = bank
        .deposit(a, dec!(250.00), Some("payroll".to_string()))
        .await
        .unwrap();
    assert_eq!(entry.source, None);
    assert_eq!(bank.balance(a).await.unwrap().value(), dec!(250.00));

    let entry = bank.withdraw(a, dec!(100.00), None).await.unwrap();
    assert_eq!(entry.source, Some(a));
    assert_eq!(bank.balance(a).await.unwrap().value(), dec!(150.00));

    let err = bank.withdraw(a, dec!(200.00), None).await.unwrap_err();
    assert!(err.is_insufficient_funds());
    assert_eq!(bank.balance(a).await.unwrap().value(), dec!(150.00));
}

#[tokio::test]
async fn closed_accounts_reject_movements() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(100)), ("B01", dec!(0))]).await;
    let (a, b) = (ids[0], ids[1]);

    // Close is refused while money remains
    let err = bank.close_account(a).await.unwrap_err();
    assert!(matches!(err, ProvisionError::NonZeroBalance { .. }));

    bank.withdraw(a, dec!(100), None).await.unwrap();
    let closed = bank.close_account(a).await.unwrap();
    assert!(!closed.is_active());

    let err = bank
        .transfer(TransferRequest::new(b, a, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::AccountClosed(id) if id == a));

    let err = bank.deposit(a, dec!(10), None).await.unwrap_err();
    assert!(matches!(err, TransferError::AccountClosed(_)));

    let err = bank.close_account(a).await.unwrap_err();
    assert!(matches!(err, ProvisionError::AlreadyClosed(_)));

    // Still readable: history references the id forever
    assert!(bank.account(a).await.is_some());
}

#[tokio::test]
async fn account_numbers_are_unique() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, _) = seeded_bank(dir.path(), &[("A01", dec!(0))]).await;

    let err = bank
        .open_account(AccountNumber::new("a01").unwrap(), dec!(0))
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::NumberTaken(_)));
}

#[tokio::test]
async fn error_kinds_map_to_stable_strings() {
    let dir = tempfile::tempdir().unwrap();
    let (bank, ids) = seeded_bank(dir.path(), &[("A01", dec!(10)), ("B01", dec!(0))]).await;

    let err = bank
        .transfer(TransferRequest::new(ids[0], ids[1], dec!(99)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "insufficient_funds");
}
