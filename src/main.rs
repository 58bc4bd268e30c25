use anyhow::{Context, Result};
use log::{info, warn};

use arikka_ledger::blockchain::{Ledger, Transaction, Wallet};
use arikka_ledger::config::LedgerConfig;

// Load configuration from the first argument or ARIKKA_CONFIG, falling back to defaults
fn load_config() -> Result<LedgerConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("ARIKKA_CONFIG").ok());

    match path {
        Some(path) => {
            let config = LedgerConfig::load(&path)
                .with_context(|| format!("Failed to load config from {}", path))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        None => {
            info!("No config given, using defaults");
            Ok(LedgerConfig::default())
        }
    }
}

// Use the wallet from ARIKKA_PRIVATE_KEY if set, otherwise create a fresh one
fn load_wallet() -> Result<Wallet> {
    match std::env::var("ARIKKA_PRIVATE_KEY") {
        Ok(secret_hex) => {
            Wallet::from_secret_hex(&secret_hex).context("ARIKKA_PRIVATE_KEY is not a valid secret key")
        }
        Err(_) => {
            warn!("ARIKKA_PRIVATE_KEY not set, generating a throwaway wallet");
            Ok(Wallet::new()?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = load_config()?;
    let mut ledger = Ledger::with_config(&config)?;
    let wallet = load_wallet()?;
    let address = wallet.address().clone();

    info!("Wallet address: {}", address);

    let mut transaction = Transaction::new(address.clone(), address.clone(), 10.0);
    transaction.sign(&wallet)?;
    ledger.add_transaction(transaction)?;

    println!("Balance of wallet is: {}", ledger.get_balance_of_address(&address));

    info!("Starting the miner...");
    ledger.mine_pending_transactions_offloaded(&address).await?;

    info!("Mining again to collect the mining reward...");
    ledger.mine_pending_transactions_offloaded(&address).await?;

    println!("Balance of wallet is: {}", ledger.get_balance_of_address(&address));

    match ledger.validate_chain() {
        Ok(()) => println!("Is chain valid? true"),
        Err(violation) => println!("Is chain valid? false ({})", violation),
    }

    println!("{}", ledger.to_json_pretty()?);

    Ok(())
}
