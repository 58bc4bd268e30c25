// Offloads the proof-of-work search to tokio's blocking pool so async hosts
// stay responsive while a block is being mined.

use log::info;
use tokio::task::JoinHandle;

use super::block::{Block, BlockError};

/// Seals `block` on a blocking worker thread
///
/// # Arguments
///
/// * `block` - The unsealed block
/// * `difficulty` - Required number of leading zero hex characters
///
/// # Returns
///
/// A handle resolving to the sealed block
pub fn spawn_mining(block: Block, difficulty: usize) -> JoinHandle<Result<Block, BlockError>> {
    tokio::task::spawn_blocking(move || {
        let sealed = block.seal(difficulty)?;
        info!("Block {} mined: {}", sealed.index, sealed.hash);
        Ok(sealed)
    })
}
