use proptest::prelude::*;

use arikka_ledger::blockchain::block::meets_difficulty;
use arikka_ledger::blockchain::{Address, Block, Ledger, Transaction, Wallet};

fn signed(from: &Wallet, to: &Address, amount: f64) -> Transaction {
    let mut transaction = Transaction::new(from.address().clone(), to.clone(), amount);
    transaction.sign(from).unwrap();
    transaction
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn transfers_within_a_closed_set_sum_to_zero(
        members in 2usize..5,
        transfers in proptest::collection::vec((0usize..5, 0usize..5, 0u32..1_000), 1..10),
    ) {
        let wallets: Vec<Wallet> = (0..members).map(|_| Wallet::new().unwrap()).collect();
        let outsider = Wallet::new().unwrap();
        let mut ledger = Ledger::new(0, 100.0).unwrap();

        for (from, to, amount) in &transfers {
            let from = &wallets[from % members];
            let to = wallets[to % members].address();
            ledger.add_transaction(signed(from, to, f64::from(*amount))).unwrap();
        }
        ledger.mine_pending_transactions(outsider.address()).unwrap();

        let total: f64 = wallets
            .iter()
            .map(|wallet| ledger.get_balance_of_address(wallet.address()))
            .sum();
        prop_assert_eq!(total, 0.0);
        prop_assert!(ledger.is_chain_valid());
    }

    #[test]
    fn sealed_hash_meets_difficulty(
        index in 1u64..1_000,
        previous_hash in "[0-9a-f]{0,64}",
        difficulty in 0usize..3,
    ) {
        let block = Block::new(index, Vec::new(), previous_hash).seal(difficulty).unwrap();

        prop_assert!(meets_difficulty(&block.hash, difficulty));
        prop_assert!(block.hash[..difficulty].chars().all(|c| c == '0'));
        prop_assert_eq!(block.calculate_hash().unwrap(), block.hash);
    }

    #[test]
    fn any_amount_change_is_detected(
        amount in 1u32..10_000,
        delta in 1u32..10_000,
    ) {
        let wallet = Wallet::new().unwrap();
        let mut ledger = Ledger::new(1, 50.0).unwrap();

        ledger
            .add_transaction(signed(&wallet, wallet.address(), f64::from(amount)))
            .unwrap();
        ledger.mine_pending_transactions(wallet.address()).unwrap();
        ledger.mine_pending_transactions(wallet.address()).unwrap();
        prop_assert!(ledger.is_chain_valid());

        for original in ledger.chain().iter().skip(1) {
            let mut tampered = original.clone();
            tampered.payload.transactions_mut()[0].amount += f64::from(delta);

            prop_assert_ne!(tampered.calculate_hash().unwrap(), tampered.hash.clone());
        }
    }
}

#[test]
fn signing_for_another_wallet_never_validates() {
    let owner = Wallet::new().unwrap();
    let intruder = Wallet::new().unwrap();

    let mut transaction = Transaction::new(owner.address().clone(), intruder.address().clone(), 1.0);
    assert!(transaction.sign(&intruder).is_err());

    transaction.signature = Some(intruder.sign_digest(&transaction.digest()));
    assert!(!transaction.is_valid());

    let mut ledger = Ledger::new(0, 1.0).unwrap();
    assert!(ledger.add_transaction(transaction).is_err());
}
