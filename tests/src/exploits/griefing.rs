//! # Griefing Attacks
//!
//! Callers that cannot steal funds but try to wedge an auction: refusing
//! refunds, racing for the single collect, or failing the mint.

#[cfg(test)]
mod tests {
    use collect_modules::adapters::testing::{
        units, TestHarness, BIDDER_A, BIDDER_B, BIDDER_C, CURRENCY, RECIPIENT,
    };
    use collect_modules::codec;
    use collect_modules::prelude::*;
    use std::sync::Arc;
    use std::thread;

    const KEY: PublicationKey = PublicationKey::new(1, 1);
    const DURATION: u64 = 1_000;

    fn english(h: &TestHarness) -> EnglishAuctionEngine {
        let engine =
            EnglishAuctionEngine::new(h.collaborators(h.english_custody), EngineConfig::default());
        let data = codec::encode(&EnglishAuctionInitData {
            end_timestamp: h.clock.now() + DURATION,
            recipient: RECIPIENT,
            currency: CURRENCY,
            highest_bidder: Address::ZERO,
            start_amount: units("1"),
            only_followers: false,
        })
        .unwrap();
        engine.initialize_collect_module(KEY, &data).unwrap();
        engine
    }

    // =============================================================================
    // REFUND REFUSAL
    // =============================================================================

    #[test]
    fn test_leader_refusing_refunds_keeps_lead_until_it_accepts() {
        let h = TestHarness::new();
        let engine = english(&h);
        engine.make_bid(KEY, BIDDER_A, CURRENCY, units("1")).unwrap();
        h.ledger.reject_payee(BIDDER_A);

        let err = engine
            .make_bid(KEY, BIDDER_B, CURRENCY, units("2"))
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::TransferFailed(TransferError::Rejected(_))
        ));
        assert_eq!(
            engine.record(KEY).unwrap().leading_bid(),
            Some((BIDDER_A, units("1")))
        );
        assert_eq!(h.ledger.balance_of(CURRENCY, BIDDER_B), h.starting_balance());
        assert_eq!(engine.escrowed(KEY), units("1"));
        assert_eq!(
            h.ledger.balance_of(CURRENCY, h.english_custody),
            units("1")
        );

        h.ledger.accept_payee(BIDDER_A);
        engine.make_bid(KEY, BIDDER_B, CURRENCY, units("2")).unwrap();
        assert_eq!(h.ledger.balance_of(CURRENCY, BIDDER_A), h.starting_balance());
    }

    #[test]
    fn test_underfunded_bid_changes_nothing() {
        let h = TestHarness::new();
        let engine = english(&h);
        engine.make_bid(KEY, BIDDER_A, CURRENCY, units("1")).unwrap();

        let err = engine
            .make_bid(KEY, BIDDER_B, CURRENCY, units("5000"))
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::TransferFailed(TransferError::InsufficientBalance { .. })
        ));
        assert_eq!(
            engine.record(KEY).unwrap().leading_bid(),
            Some((BIDDER_A, units("1")))
        );
        assert_eq!(engine.minimum_bid(KEY).unwrap(), units("1.05"));
    }

    // =============================================================================
    // FINALIZATION
    // =============================================================================

    #[test]
    fn test_failed_mint_keeps_funds_in_escrow_for_retry() {
        let h = TestHarness::new();
        let engine = english(&h);
        engine.make_bid(KEY, BIDDER_A, CURRENCY, units("3")).unwrap();
        h.clock.advance(DURATION);
        h.host.set_mint_rejection(Some("collect NFT paused"));

        assert!(engine.finish_auction(KEY).is_err());
        assert_eq!(engine.phase(KEY).unwrap(), AuctionPhase::ExpiredUnfinalized);
        assert_eq!(engine.escrowed(KEY), units("3"));
        assert!(h.ledger.balance_of(CURRENCY, RECIPIENT).is_zero());

        h.host.set_mint_rejection(None);
        engine.finish_auction(KEY).unwrap();
        assert_eq!(h.host.minted_to(KEY), vec![BIDDER_A]);
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("3"));
    }

    #[test]
    fn test_snipe_at_end_timestamp_is_refused() {
        let h = TestHarness::new();
        let engine = english(&h);
        h.clock.advance(DURATION - 1);
        engine.make_bid(KEY, BIDDER_A, CURRENCY, units("1")).unwrap();
        h.clock.advance(1);
        assert_eq!(
            engine.make_bid(KEY, BIDDER_B, CURRENCY, units("10")),
            Err(AuctionError::AuctionEnded)
        );
    }

    // =============================================================================
    // RACES
    // =============================================================================

    #[test]
    fn test_racing_collectors_mint_once() {
        let h = TestHarness::new();
        let engine = Arc::new(DutchAuctionEngine::new(
            h.collaborators(h.dutch_custody),
            EngineConfig::default(),
        ));
        let data = codec::encode(&DutchAuctionInitData {
            start_amount: units("10"),
            end_amount: units("1"),
            runtime_seconds: DURATION,
            recipient: RECIPIENT,
            currency: CURRENCY,
            referral_fee_bps: 0,
            should_follow: false,
        })
        .unwrap();
        engine.initialize_collect_module(KEY, &data).unwrap();

        let collectors: Vec<Address> = (0..16u8).map(|i| Address::repeat(0x40 + i)).collect();
        for collector in &collectors {
            h.fund(*collector, units("10"));
        }
        let payment = codec::encode(&DutchCollectData {
            currency: CURRENCY,
            amount: units("10"),
        })
        .unwrap();

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = collectors
                .iter()
                .map(|collector| {
                    let engine = engine.clone();
                    let payment = payment.clone();
                    s.spawn(move || {
                        engine.process_collect(
                            KEY,
                            *collector,
                            CollectReference::Original,
                            &payment,
                        )
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == AuctionError::AlreadyCollected));
        assert_eq!(h.host.minted_to(KEY).len(), 1);
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("10"));
        assert!(h.ledger.balance_of(CURRENCY, h.dutch_custody).is_zero());
    }

    #[test]
    fn test_racing_bidders_leave_exact_escrow() {
        let h = TestHarness::new();
        let engine = Arc::new(english(&h));
        let bidders = [BIDDER_A, BIDDER_B, BIDDER_C];

        thread::scope(|s| {
            for (i, bidder) in bidders.iter().enumerate() {
                let engine = engine.clone();
                s.spawn(move || {
                    for round in 0..10u64 {
                        let amount = units("1") + U256::from(round * 3 + i as u64) * units("0.5");
                        let _ = engine.make_bid(KEY, *bidder, CURRENCY, amount);
                    }
                });
            }
        });

        let (_, leading) = engine.record(KEY).unwrap().leading_bid().unwrap();
        assert_eq!(engine.escrowed(KEY), leading);
        assert_eq!(h.ledger.balance_of(CURRENCY, h.english_custody), leading);
        let total = bidders
            .iter()
            .fold(U256::zero(), |acc, b| acc + h.ledger.balance_of(CURRENCY, *b));
        assert_eq!(total + leading, h.starting_balance() * 3u64);
    }
}
