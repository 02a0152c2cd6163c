//! # Dutch Auction Flows
//!
//! Price decay, single-collect enforcement and payout splits of the
//! descending-price module.

#[cfg(test)]
mod tests {
    use collect_modules::adapters::testing::{
        units, TestHarness, COLLECTOR, CURRENCY, GENESIS, OWNER, RECIPIENT, TREASURY,
    };
    use collect_modules::codec;
    use collect_modules::prelude::*;

    const KEY: PublicationKey = PublicationKey::new(1, 1);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct DutchParams {
        start: &'static str,
        end: &'static str,
        runtime: u64,
        referral_fee_bps: u16,
        should_follow: bool,
    }

    impl Default for DutchParams {
        fn default() -> Self {
            Self {
                start: "20",
                end: "10",
                runtime: 10_000,
                referral_fee_bps: 0,
                should_follow: false,
            }
        }
    }

    fn setup() -> (TestHarness, DutchAuctionEngine) {
        let h = TestHarness::new();
        let engine =
            DutchAuctionEngine::new(h.collaborators(h.dutch_custody), EngineConfig::default());
        (h, engine)
    }

    fn initialize(engine: &DutchAuctionEngine, key: PublicationKey, params: &DutchParams) {
        let data = codec::encode(&DutchAuctionInitData {
            start_amount: units(params.start),
            end_amount: units(params.end),
            runtime_seconds: params.runtime,
            recipient: RECIPIENT,
            currency: CURRENCY,
            referral_fee_bps: params.referral_fee_bps,
            should_follow: params.should_follow,
        })
        .unwrap();
        engine.initialize_collect_module(key, &data).unwrap();
    }

    fn payment(amount: &str) -> Vec<u8> {
        codec::encode(&DutchCollectData {
            currency: CURRENCY,
            amount: units(amount),
        })
        .unwrap()
    }

    // =============================================================================
    // PRICE CURVE
    // =============================================================================

    #[test]
    fn test_price_decays_linearly_to_end_amount() {
        let (h, engine) = setup();
        initialize(&engine, KEY, &DutchParams::default());

        let samples = [
            (0, "20"),
            (2_500, "17.5"),
            (5_000, "15"),
            (7_500, "12.5"),
            (10_000, "10"),
            (50_000, "10"),
        ];
        for (elapsed, expected) in samples {
            h.clock.set(GENESIS + elapsed);
            assert_eq!(
                engine.current_price(KEY).unwrap(),
                units(expected),
                "price at +{elapsed}s"
            );
        }
    }

    #[test]
    fn test_price_never_increases() {
        let (h, engine) = setup();
        initialize(
            &engine,
            KEY,
            &DutchParams {
                start: "7.777777777777777777",
                end: "0.000000000000000003",
                runtime: 997,
                ..DutchParams::default()
            },
        );
        let mut last = engine.current_price(KEY).unwrap();
        for _ in 0..1_000 {
            h.clock.advance(1);
            let price = engine.current_price(KEY).unwrap();
            assert!(price <= last);
            assert!(price >= units("0.000000000000000003"));
            last = price;
        }
    }

    // =============================================================================
    // COLLECT
    // =============================================================================

    #[test]
    fn test_collect_at_half_runtime() {
        let (h, engine) = setup();
        initialize(&engine, KEY, &DutchParams::default());
        h.clock.advance(5_000);

        let err = engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("14.9"))
            .unwrap_err();
        assert_eq!(
            err,
            AuctionError::InsufficientPayment {
                required: units("15"),
                offered: units("14.9"),
            }
        );

        let events = engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("15"))
            .unwrap();
        match &events[0] {
            AuctionEvent::Collected {
                price,
                paid,
                token_id,
                ..
            } => {
                assert_eq!(*price, units("15"));
                assert_eq!(*paid, units("15"));
                assert_eq!(h.host.token_owner(KEY, *token_id), Some(COLLECTOR));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("15"));
        assert_eq!(
            h.ledger.balance_of(CURRENCY, COLLECTOR),
            h.starting_balance() - units("15")
        );
    }

    #[test]
    fn test_overpayment_is_charged_in_full() {
        let (h, engine) = setup();
        initialize(&engine, KEY, &DutchParams::default());
        engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("25"))
            .unwrap();
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("25"));
    }

    #[test]
    fn test_single_collect_then_expiry() {
        let (h, engine) = setup();
        initialize(&engine, KEY, &DutchParams::default());
        engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20"))
            .unwrap();
        assert_eq!(
            engine.process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20")),
            Err(AuctionError::AlreadyCollected)
        );
        h.clock.advance(10_000);
        assert_eq!(
            engine.process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20")),
            Err(AuctionError::AuctionExpired)
        );
        assert_eq!(h.host.minted_to(KEY), vec![COLLECTOR]);
    }

    #[test]
    fn test_publications_are_independent() {
        let (h, engine) = setup();
        let other = PublicationKey::new(1, 2);
        initialize(&engine, KEY, &DutchParams::default());
        initialize(&engine, other, &DutchParams::default());

        engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20"))
            .unwrap();
        assert!(!engine.record(other).unwrap().collected);
        engine
            .process_collect(other, COLLECTOR, CollectReference::Original, &payment("20"))
            .unwrap();
        assert_eq!(h.host.minted_to(other), vec![COLLECTOR]);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_follow_gate_checks_at_collect_time() {
        let (h, engine) = setup();
        initialize(
            &engine,
            KEY,
            &DutchParams {
                should_follow: true,
                ..DutchParams::default()
            },
        );
        h.host.follow(1, COLLECTOR);
        h.host.unfollow(1, COLLECTOR);
        assert_eq!(
            engine.process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20")),
            Err(AuctionError::FollowInvalid)
        );
        h.host.follow(1, COLLECTOR);
        assert!(engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20"))
            .is_ok());
    }

    #[test]
    fn test_missing_allowance_leaves_auction_open() {
        let (h, engine) = setup();
        initialize(&engine, KEY, &DutchParams::default());
        let stranger = Address::repeat(0x5a);
        h.ledger.mint(CURRENCY, stranger, units("100"));

        let err = engine
            .process_collect(KEY, stranger, CollectReference::Original, &payment("20"))
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::TransferFailed(TransferError::InsufficientAllowance { .. })
        ));
        assert!(!engine.record(KEY).unwrap().collected);
        assert!(h.host.minted_to(KEY).is_empty());

        assert!(engine
            .process_collect(KEY, COLLECTOR, CollectReference::Original, &payment("20"))
            .is_ok());
    }

    // =============================================================================
    // FEES
    // =============================================================================

    #[test]
    fn test_mirror_collect_with_treasury_fee() {
        let (h, engine) = setup();
        let referrer = Address::repeat(0x77);
        h.host.create_profile(2, referrer);
        h.globals.set_treasury_fee(100);
        initialize(
            &engine,
            KEY,
            &DutchParams {
                start: "20",
                end: "20",
                referral_fee_bps: 1_000,
                ..DutchParams::default()
            },
        );

        let events = engine
            .process_collect(
                KEY,
                COLLECTOR,
                CollectReference::Mirror {
                    referrer_profile_id: 2,
                },
                &payment("20"),
            )
            .unwrap();

        assert_eq!(h.ledger.balance_of(CURRENCY, TREASURY), units("0.2"));
        assert_eq!(h.ledger.balance_of(CURRENCY, referrer), units("1.98"));
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("17.82"));
        assert!(h.ledger.balance_of(CURRENCY, h.dutch_custody).is_zero());
        match &events[0] {
            AuctionEvent::Collected {
                split, referrer: r, ..
            } => {
                assert_eq!(split.total(), units("20"));
                assert_eq!(*r, Some(referrer));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_mirror_without_profile_owner_pays_no_referral() {
        let (h, engine) = setup();
        initialize(
            &engine,
            KEY,
            &DutchParams {
                referral_fee_bps: 5_000,
                ..DutchParams::default()
            },
        );
        engine
            .process_collect(
                KEY,
                COLLECTOR,
                CollectReference::Mirror {
                    referrer_profile_id: 42,
                },
                &payment("20"),
            )
            .unwrap();
        assert_eq!(h.ledger.balance_of(CURRENCY, RECIPIENT), units("20"));
        assert!(h.ledger.balance_of(CURRENCY, OWNER).is_zero());
    }

    #[test]
    fn test_event_renders_as_json() {
        let (_h, engine) = setup();
        let data = codec::encode(&DutchAuctionInitData {
            start_amount: units("20"),
            end_amount: units("10"),
            runtime_seconds: 100,
            recipient: RECIPIENT,
            currency: CURRENCY,
            referral_fee_bps: 0,
            should_follow: false,
        })
        .unwrap();
        let events = engine.initialize_collect_module(KEY, &data).unwrap();
        let json = serde_json::to_value(&events[0]).unwrap();
        assert!(json.get("DutchAuctionInitialized").is_some());
    }
}
