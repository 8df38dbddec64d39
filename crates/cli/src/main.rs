//! CoreBank CLI - ledger operations from the command line
//!
//! Usage:
//! ```bash
//! corebank open USER001 --seed 500.00
//! corebank deposit 1 250.00 --description "payroll"
//! corebank transfer 1 2 150.00
//! corebank history 1 --limit 5
//! corebank audit
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

mod commands;

/// CoreBank - transactional ledger over an append-only journal
#[derive(Parser)]
#[command(name = "corebank")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the journal
    #[arg(long, default_value = "data", global = true)]
    pub data: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a new account
    Open {
        /// Account number (1-20 ASCII letters/digits)
        number: String,
        /// Opening balance
        #[arg(long, default_value = "0")]
        seed: Decimal,
    },

    /// Close an account (requires a zero balance)
    Close {
        /// Account id
        account_id: i64,
    },

    /// Deposit external funds into an account
    Deposit {
        account_id: i64,
        amount: Decimal,
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Withdraw funds from an account
    Withdraw {
        account_id: i64,
        amount: Decimal,
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Transfer between two accounts
    Transfer {
        /// Source account id
        from: i64,
        /// Destination account id
        to: i64,
        amount: Decimal,
        #[arg(long, short)]
        description: Option<String>,
        /// Idempotency key; one is generated when omitted so the printed
        /// command can be retried safely
        #[arg(long)]
        idempotency_key: Option<String>,
    },

    /// Show an account and its balance
    Balance {
        account_id: i64,
    },

    /// List all accounts
    Accounts,

    /// Show an account's transactions, newest first
    History {
        account_id: i64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Verify the journal hash chain and reconcile every balance
    Audit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::run(cli).await
}
