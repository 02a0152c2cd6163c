//! # English Auction Flows
//!
//! Bid sequences, refunds, custody accounting and finalization of the
//! ascending-bid module.

#[cfg(test)]
mod tests {
    use collect_modules::adapters::testing::{
        units, TestHarness, BIDDER_A, BIDDER_B, BIDDER_C, CURRENCY, RECIPIENT, TREASURY,
    };
    use collect_modules::codec;
    use collect_modules::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const KEY: PublicationKey = PublicationKey::new(1, 1);
    const DURATION: u64 = 3_600;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn setup(reserve: &str) -> (TestHarness, EnglishAuctionEngine) {
        let h = TestHarness::new();
        let engine =
            EnglishAuctionEngine::new(h.collaborators(h.english_custody), EngineConfig::default());
        let data = codec::encode(&EnglishAuctionInitData {
            end_timestamp: h.clock.now() + DURATION,
            recipient: RECIPIENT,
            currency: CURRENCY,
            highest_bidder: Address::ZERO,
            start_amount: units(reserve),
            only_followers: false,
        })
        .unwrap();
        engine.initialize_collect_module(KEY, &data).unwrap();
        (h, engine)
    }

    fn bid(engine: &EnglishAuctionEngine, bidder: Address, amount: &str) -> AuctionResult<()> {
        engine
            .make_bid(KEY, bidder, CURRENCY, units(amount))
            .map(|_| ())
    }

    /// Custody, escrow and the leading bid agree.
    fn assert_custody_consistent(h: &TestHarness, engine: &EnglishAuctionEngine) {
        let record = engine.record(KEY).unwrap();
        let held = h.ledger.balance_of(CURRENCY, h.english_custody);
        assert_eq!(engine.escrowed(KEY), held);
        match record.leading_bid() {
            Some((_, amount)) if !record.finalized => assert_eq!(held, amount),
            _ => assert!(held.is_zero()),
        }
    }

    // =============================================================================
    // BIDDING
    // =============================================================================

    #[test]
    fn test_five_percent_rule() {
        let (h, engine) = setup("1");
        bid(&engine, BIDDER_A, "1").unwrap();

        for low in ["1", "1.04", "1.049999999999999999"] {
            assert!(
                matches!(bid(&engine, BIDDER_B, low), Err(AuctionError::BidTooLow { .. })),
                "{low} must be rejected"
            );
        }
        bid(&engine, BIDDER_B, "1.05").unwrap();

        assert_eq!(
            engine.record(KEY).unwrap().leading_bid(),
            Some((BIDDER_B, units("1.05")))
        );
        assert_eq!(h.ledger.balance_of(CURRENCY, BIDDER_A), h.starting_balance());
        assert_eq!(
            h.ledger.balance_of(CURRENCY, BIDDER_B),
            h.starting_balance() - units("1.05")
        );
        assert_custody_consistent(&h, &engine);
    }

    #[test]
    fn test_bidding_war_refunds_everyone_but_the_leader() {
        let (h, engine) = setup("10");
        bid(&engine, BIDDER_A, "10").unwrap();
        bid(&engine, BIDDER_B, "10.5").unwrap();
        bid(&engine, BIDDER_C, "12").unwrap();
        bid(&engine, BIDDER_A, "12.6").unwrap();
        bid(&engine, BIDDER_B, "20").unwrap();
        assert_custody_consistent(&h, &engine);

        assert_eq!(h.ledger.balance_of(CURRENCY, BIDDER_A), h.starting_balance());
        assert_eq!(h.ledger.balance_of(CURRENCY, BIDDER_C), h.starting_balance());
        assert_eq!(
            h.ledger.balance_of(CURRENCY, BIDDER_B),
            h.starting_balance() - units("20")
        );
    }

    #[test]
    fn test_leader_may_raise_own_bid() {
        let (h, engine) = setup("1");
        bid(&engine, BIDDER_A, "1").unwrap();
        bid(&engine, BIDDER_A, "2").unwrap();
        assert_eq!(
            h.ledger.balance_of(CURRENCY, BIDDER_A),
            h.starting_balance() - units("2")
        );
        assert_custody_consistent(&h, &engine);
    }

    #[test]
    fn test_zero_reserve_minimum_raise_is_one_unit() {
        let (_h, engine) = setup("0");
        assert!(engine.minimum_bid(KEY).unwrap().is_zero());
        engine
            .make_bid(KEY, BIDDER_A, CURRENCY, U256::one())
            .unwrap();
        assert_eq!(engine.minimum_bid(KEY).unwrap(), U256::from(2u64));
    }

    #[test]
    fn test_wrong_currency_rejected() {
        let (h, engine) = setup("1");
        let other = CurrencyId::new(Address::repeat(0x42));
        h.globals.whitelist_currency(other, true);
        assert_eq!(
            engine.make_bid(KEY, BIDDER_A, other, units("5")),
            Err(AuctionError::CurrencyMismatch {
                expected: CURRENCY,
                got: other
            })
        );
    }

    #[test]
    fn test_random_bid_sequences_keep_custody_exact() {
        let (h, engine) = setup("1");
        let bidders = [BIDDER_A, BIDDER_B, BIDDER_C];
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..40 {
            let bidder = bidders[rng.gen_range(0..bidders.len())];
            let minimum = engine.minimum_bid(KEY).unwrap();
            // Sometimes just under the minimum, mostly at or above it.
            let offset = U256::from(rng.gen_range(0u64..1_000_000));
            let amount = if rng.gen_bool(0.2) && !minimum.is_zero() {
                minimum - U256::one()
            } else {
                minimum + offset
            };

            let result = engine.make_bid(KEY, bidder, CURRENCY, amount);
            if amount < minimum {
                assert!(matches!(result, Err(AuctionError::BidTooLow { .. })));
            } else {
                result.unwrap();
            }
            assert_custody_consistent(&h, &engine);
        }

        let total: U256 = bidders
            .iter()
            .map(|b| h.ledger.balance_of(CURRENCY, *b))
            .fold(U256::zero(), |acc, b| acc + b);
        let held = h.ledger.balance_of(CURRENCY, h.english_custody);
        assert_eq!(total + held, h.starting_balance() * 3u64);
    }

    // =============================================================================
    // FINALIZATION
    // =============================================================================

    #[test]
    fn test_full_lifecycle() {
        let (h, engine) = setup("1");
        h.globals.set_treasury_fee(250);
        assert_eq!(engine.phase(KEY).unwrap(), AuctionPhase::Open);

        bid(&engine, BIDDER_A, "4").unwrap();
        bid(&engine, BIDDER_B, "8").unwrap();
        assert_eq!(engine.finish_auction(KEY), Err(AuctionError::AuctionNotEnded));

        h.clock.advance(DURATION);
        assert_eq!(engine.phase(KEY).unwrap(), AuctionPhase::ExpiredUnfinalized);
        assert_eq!(bid(&engine, BIDDER_C, "100"), Err(AuctionError::AuctionEnded));

        let events = engine.finish_auction(KEY).unwrap();
        let token_id = match &events[0] {
            AuctionEvent::AuctionFinished {
                winner: Some(winner),
                amount,
                split,
                token_id: Some(token_id),
                ..
            } => {
                assert_eq!(*winner, BIDDER_B);
                assert_eq!(*amount, units("8"));
                assert_eq!(split.total(), units("8"));
                *token_id
            }
            other => panic!("unexpected event {other:?}"),
        };

        assert_eq!(h.host.token_owner(KEY, token_id), Some(BIDDER_B));
        assert_eq!(h.ledger.balance_of(CURRENCY, TREASURY), units("0.2"));
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("7.8"));
        assert_eq!(engine.phase(KEY).unwrap(), AuctionPhase::Finalized);
        assert_custody_consistent(&h, &engine);

        for _ in 0..3 {
            assert_eq!(engine.finish_auction(KEY), Err(AuctionError::AlreadyFinalized));
        }
        assert_eq!(h.host.minted_to(KEY).len(), 1);
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("7.8"));
    }

    #[test]
    fn test_finish_without_bids_moves_nothing() {
        let (h, engine) = setup("1");
        h.clock.advance(DURATION + 1);
        engine.finish_auction(KEY).unwrap();
        assert!(h.host.minted_to(KEY).is_empty());
        assert!(h.ledger.balance_of(CURRENCY, RECIPIENT).is_zero());
        assert_eq!(engine.finish_auction(KEY), Err(AuctionError::AlreadyFinalized));
    }

    #[test]
    fn test_follower_only_auction() {
        let h = TestHarness::new();
        let engine =
            EnglishAuctionEngine::new(h.collaborators(h.english_custody), EngineConfig::default());
        let data = codec::encode(&EnglishAuctionInitData {
            end_timestamp: h.clock.now() + DURATION,
            recipient: RECIPIENT,
            currency: CURRENCY,
            highest_bidder: Address::ZERO,
            start_amount: units("1"),
            only_followers: true,
        })
        .unwrap();
        engine.initialize_collect_module(KEY, &data).unwrap();

        h.host.follow(1, BIDDER_A);
        assert!(bid(&engine, BIDDER_A, "1").is_ok());
        assert_eq!(bid(&engine, BIDDER_B, "5"), Err(AuctionError::FollowInvalid));
    }

    #[test]
    fn test_custom_increment() {
        let h = TestHarness::new();
        let config = EngineConfig {
            min_bid_increment_bps: 1_000,
            ..EngineConfig::default()
        };
        let engine = EnglishAuctionEngine::new(h.collaborators(h.english_custody), config);
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
        bid(&engine, BIDDER_A, "1").unwrap();
        assert_eq!(engine.minimum_bid(KEY).unwrap(), units("1.1"));
    }
}
