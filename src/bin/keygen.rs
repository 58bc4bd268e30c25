use anyhow::Result;

use arikka_ledger::blockchain::Wallet;

fn main() -> Result<()> {
    let wallet = Wallet::new()?;

    println!("Private key: {}", hex::encode(wallet.export_secret_key()));
    println!("Public key:  {}", wallet.address());
    Ok(())
}
