//! Command handlers

use anyhow::{anyhow, Context, Result};
use corebank_core::{Account, AccountId, AccountNumber, LedgerEntry, TransferRequest};
use corebank_engine::{Bank, TransferError};
use corebank_journal::JournalReader;

use crate::{Cli, Commands};

pub async fn run(cli: Cli) -> Result<()> {
    let bank = Bank::open(&cli.data)
        .with_context(|| format!("opening ledger in {}", cli.data.display()))?;

    match cli.command {
        Commands::Open { number, seed } => {
            let number = AccountNumber::new(number)?;
            let account = bank.open_account(number, seed).await?;
            println!("Opened {}", account);
        }

        Commands::Close { account_id } => {
            let account = bank.close_account(AccountId::new(account_id)).await?;
            println!("Closed account {} ({})", account.id, account.number);
        }

        Commands::Deposit {
            account_id,
            amount,
            description,
        } => {
            let entry = bank
                .deposit(AccountId::new(account_id), amount, description)
                .await
                .map_err(describe)?;
            println!(
                "Deposited {} into account {} (entry #{})",
                entry.amount, entry.destination, entry.sequence
            );
        }

        Commands::Withdraw {
            account_id,
            amount,
            description,
        } => {
            let entry = bank
                .withdraw(AccountId::new(account_id), amount, description)
                .await
                .map_err(describe)?;
            println!(
                "Withdrew {} from account {} (entry #{})",
                entry.amount, account_id, entry.sequence
            );
        }

        Commands::Transfer {
            from,
            to,
            amount,
            description,
            idempotency_key,
        } => {
            let key = idempotency_key.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let mut request =
                TransferRequest::new(AccountId::new(from), AccountId::new(to), amount)
                    .with_idempotency_key(key.clone());
            if let Some(description) = description {
                request = request.with_description(description);
            }

            let outcome = bank.transfer(request).await.map_err(describe)?;
            println!(
                "Transferred {} from account {} to account {} (entry #{})",
                outcome.entry.amount, from, to, outcome.entry.sequence
            );
            println!("New source balance: {}", outcome.new_source_balance);
            println!("Idempotency key: {}", key);
        }

        Commands::Balance { account_id } => {
            let account = bank
                .account(AccountId::new(account_id))
                .await
                .ok_or_else(|| anyhow!("account {} not found", account_id))?;
            print_account(&account);
        }

        Commands::Accounts => {
            let accounts = bank.accounts().await;
            if accounts.is_empty() {
                println!("No accounts");
            }
            for account in accounts {
                print_account(&account);
            }
        }

        Commands::History {
            account_id,
            limit,
            offset,
        } => {
            let reader = JournalReader::new(&cli.data);
            let entries =
                reader.entries_for_account(AccountId::new(account_id), limit, offset)?;
            if entries.is_empty() {
                println!("No transactions");
            }
            for entry in entries {
                print_entry(&entry);
            }
        }

        Commands::Audit => {
            let reader = JournalReader::new(&cli.data);
            let records = reader
                .read_verified()
                .context("journal hash chain verification failed")?;
            println!("Chain OK: {} records", records.len());

            let report = bank.reconcile(&records).await;
            println!(
                "Accounts checked: {}, total balance: {}, seeded: {}, deposited: {}, withdrawn: {}",
                report.accounts_checked,
                report.total_balance,
                report.total_seeded,
                report.total_deposited,
                report.total_withdrawn
            );
            if report.is_balanced() {
                println!("Reconciliation OK");
            } else {
                for mismatch in &report.mismatches {
                    println!(
                        "MISMATCH account {}: journal says {}, live balance {}",
                        mismatch.account, mismatch.expected, mismatch.actual
                    );
                }
                return Err(anyhow!("ledger does not reconcile"));
            }
        }
    }

    Ok(())
}

/// Keep the machine-readable kind visible next to the human message.
fn describe(err: TransferError) -> anyhow::Error {
    anyhow!("{} [{}]", err, err.kind())
}

fn print_account(account: &Account) {
    println!(
        "#{:<4} {:<20} {:>14}  {} (opened {})",
        account.id.to_string(),
        account.number.as_str(),
        account.balance.to_string(),
        account.status,
        account.opened_at.format("%Y-%m-%d")
    );
}

fn print_entry(entry: &LedgerEntry) {
    let source = entry
        .source
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "#{:<5} {:<10} {:>14}  {} -> {}  {}  {}",
        entry.sequence,
        entry.kind.to_string(),
        entry.amount.to_string(),
        source,
        entry.destination,
        entry.committed_at.format("%Y-%m-%d %H:%M:%S"),
        entry.description.as_deref().unwrap_or("")
    );
}
