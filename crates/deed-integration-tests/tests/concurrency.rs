//! Concurrency tests for [`SharedLedger`].
//!
//! Many threads drive independent sales (and race on shared ones) through
//! one handle. Every operation is serialized, so the end state must match
//! some sequential order of the same calls.

use std::sync::{Arc, Barrier};
use std::thread;

use deed_core::{Address, Amount, AssetId};
use deed_escrow::{EscrowError, EscrowLedger, LedgerConfig, ListingState, SharedLedger};
use deed_registry::{AssetRegistry, MemoryRail, MemoryRegistry};

const SALES: u64 = 16;

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn seller() -> Address {
    addr(2)
}
fn inspector() -> Address {
    addr(3)
}
fn lender() -> Address {
    addr(4)
}
fn custodian() -> Address {
    addr(0xe5)
}

fn buyer_of(i: u64) -> Address {
    addr(0x1000 + i)
}

/// `SALES` assets minted and listed, asset `i` to `buyer_of(i)` at price
/// 10, escrow 5.
fn listed_market() -> SharedLedger<MemoryRegistry, MemoryRail> {
    let mut registry = MemoryRegistry::new(addr(0x100));
    for _ in 0..SALES {
        let asset = registry.mint(seller(), "ipfs://deed").unwrap();
        registry.approve(seller(), asset, custodian()).unwrap();
    }
    let config = LedgerConfig::new(custodian(), seller(), inspector(), lender());
    let shared = SharedLedger::new(EscrowLedger::new(registry, MemoryRail::new(), config).unwrap());
    for i in 1..=SALES {
        shared
            .list(
                seller(),
                AssetId::new(i),
                buyer_of(i),
                Amount::from_whole(10),
                Amount::from_whole(5),
            )
            .unwrap();
    }
    shared
}

#[test]
fn parallel_sales_settle_independently() {
    let shared = listed_market();
    let barrier = Arc::new(Barrier::new(SALES as usize));

    let handles: Vec<_> = (1..=SALES)
        .map(|i| {
            let ledger = shared.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let asset = AssetId::new(i);
                let buyer = buyer_of(i);
                barrier.wait();
                ledger
                    .deposit_earnest(buyer, asset, Amount::from_whole(5))
                    .unwrap();
                ledger
                    .receive(lender(), asset, Amount::from_whole(5))
                    .unwrap();
                ledger
                    .update_inspection_status(inspector(), asset, true)
                    .unwrap();
                for who in [buyer, seller(), lender()] {
                    ledger.approve_sale(who, asset).unwrap();
                }
                // Even-numbered sales close, odd ones are abandoned after
                // inspection and the earnest goes to the seller.
                if i % 2 == 0 {
                    ledger.finalize_sale(seller(), asset).unwrap();
                } else {
                    ledger.cancel_sale(buyer, asset).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    shared.with(|ledger| {
        assert_eq!(ledger.balance(), Amount::ZERO);
        let closed = SALES / 2;
        let abandoned = SALES - closed;
        // Each closed sale pays 10 to the seller; each abandoned one
        // forfeits 10 (5 earnest plus 5 lender funding) to the seller.
        assert_eq!(
            ledger.rail().balance_of(seller()),
            Amount::from_whole(10 * (closed + abandoned))
        );
        for i in 1..=SALES {
            let asset = AssetId::new(i);
            let owner = ledger.registry().owner_of(asset).unwrap();
            if i % 2 == 0 {
                assert_eq!(owner, buyer_of(i));
                assert_eq!(ledger.listing(asset).unwrap().state, ListingState::Finalized);
            } else {
                assert_eq!(owner, seller());
                assert_eq!(ledger.listing(asset).unwrap().state, ListingState::Cancelled);
            }
        }
        for (i, event) in ledger.events().iter().enumerate() {
            assert_eq!(event.sequence, i as u64 + 1);
        }
    });
}

#[test]
fn racing_finalize_and_cancel_settle_exactly_once() {
    let shared = listed_market();
    let asset = AssetId::new(1);
    let buyer = buyer_of(1);
    shared
        .deposit_earnest(buyer, asset, Amount::from_whole(10))
        .unwrap();
    shared
        .update_inspection_status(inspector(), asset, true)
        .unwrap();
    for who in [buyer, seller(), lender()] {
        shared.approve_sale(who, asset).unwrap();
    }

    let barrier = Arc::new(Barrier::new(2));
    let finalize = {
        let ledger = shared.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            ledger.finalize_sale(seller(), asset).map(|_| ())
        })
    };
    let cancel = {
        let ledger = shared.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            ledger.cancel_sale(buyer, asset).map(|_| ())
        })
    };
    let results = [finalize.join().unwrap(), cancel.join().unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(EscrowError::NotListed { .. }))));

    // Either way the seller ends up with the full 10.
    assert_eq!(shared.balance(), Amount::ZERO);
    shared.with(|ledger| {
        assert_eq!(ledger.rail().balance_of(seller()), Amount::from_whole(10));
        assert_eq!(ledger.rail().total_paid(), Amount::from_whole(10));
    });
}

#[test]
fn contended_deposits_on_one_listing_all_land() {
    let shared = listed_market();
    let asset = AssetId::new(3);
    let buyer = buyer_of(3);
    let threads = 8u64;
    let per_thread = 5u64;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let ledger = shared.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    let span = tracing::debug_span!("deposit", thread = t);
                    let _guard = span.enter();
                    ledger
                        .deposit_earnest(buyer, asset, Amount::from_whole(5))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected = Amount::from_whole(5 * threads * per_thread);
    assert_eq!(shared.balance(), expected);
    assert_eq!(shared.listing(asset).unwrap().deposited_balance, expected);
}
