//! # Dutch Auction Engine
//!
//! Descending-price sale of a single collect per publication. The price
//! decays linearly from `start_amount` to `end_amount` over the runtime; the
//! first collector paying at least the live price wins.

use crate::codec;
use crate::domain::entities::{
    CollectReference, DutchAuctionInitData, DutchAuctionRecord, DutchCollectData, ModuleKind,
};
use crate::domain::fees::{FeeSplit, FeeSplitter};
use crate::domain::invariants::{check_dutch_invariants, InvariantCheckResult};
use crate::domain::pricing::dutch_price;
use crate::domain::value_objects::{
    Address, PublicationKey, Timestamp, TokenId, BPS_MAX, U256,
};
use crate::engine::settlement::Settlement;
use crate::engine::EngineConfig;
use crate::errors::AuctionError;
use crate::events::AuctionEvent;
use crate::ports::inbound::{AuctionResult, CollectModule, DutchAuctionApi};
use crate::ports::outbound::Collaborators;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Descending-price collect module.
pub struct DutchAuctionEngine {
    config: EngineConfig,
    deps: Collaborators,
    records: Mutex<HashMap<PublicationKey, DutchAuctionRecord>>,
}

/// What a validated collect will pay out.
struct CollectPlan {
    record: DutchAuctionRecord,
    price: U256,
    paid: U256,
    referrer: Option<Address>,
}

impl DutchAuctionEngine {
    /// Creates an engine with no records.
    #[must_use]
    pub fn new(deps: Collaborators, config: EngineConfig) -> Self {
        Self {
            config,
            deps,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Number of publications with a Dutch auction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if no publication uses this engine yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn validate_init(&self, data: &DutchAuctionInitData) -> AuctionResult<()> {
        if data.end_amount > data.start_amount {
            return Err(AuctionError::InvalidAuctionParams(
                "end amount above start amount",
            ));
        }
        if data.runtime_seconds == 0 {
            return Err(AuctionError::InvalidAuctionParams("runtime must be positive"));
        }
        if data.recipient.is_zero() {
            return Err(AuctionError::InvalidAuctionParams("recipient is the zero address"));
        }
        if data.referral_fee_bps > BPS_MAX {
            return Err(AuctionError::InvalidAuctionParams("referral fee above 100%"));
        }
        if !self.deps.globals.is_whitelisted(data.currency) {
            return Err(AuctionError::CurrencyNotWhitelisted(data.currency));
        }
        Ok(())
    }

    fn snapshot(&self, key: PublicationKey) -> AuctionResult<DutchAuctionRecord> {
        self.records
            .lock()
            .get(&key)
            .cloned()
            .ok_or(AuctionError::AuctionNotFound(key))
    }

    /// Checks collect preconditions, in order, against a snapshot.
    fn plan_collect(
        &self,
        key: PublicationKey,
        record: DutchAuctionRecord,
        collector: Address,
        reference: CollectReference,
        payment: &DutchCollectData,
        now: Timestamp,
    ) -> AuctionResult<CollectPlan> {
        if record.is_expired(now) {
            return Err(AuctionError::AuctionExpired);
        }
        if record.collected {
            return Err(AuctionError::AlreadyCollected);
        }
        if payment.currency != record.currency {
            return Err(AuctionError::CurrencyMismatch {
                expected: record.currency,
                got: payment.currency,
            });
        }
        let price = dutch_price(&record, now);
        if payment.amount < price {
            return Err(AuctionError::InsufficientPayment {
                required: price,
                offered: payment.amount,
            });
        }
        if record.should_follow && !self.deps.host.is_following(key.profile_id, collector) {
            return Err(AuctionError::FollowInvalid);
        }

        let referrer = reference
            .referrer_for(key)
            .and_then(|profile_id| self.deps.host.profile_owner(profile_id));

        Ok(CollectPlan {
            record,
            price,
            paid: payment.amount,
            referrer,
        })
    }

    /// Flips `collected` if nobody beat us to it since validation.
    fn claim(&self, key: PublicationKey) -> AuctionResult<()> {
        let mut records = self.records.lock();
        let record = records
            .get_mut(&key)
            .ok_or(AuctionError::AuctionNotFound(key))?;
        if record.collected {
            return Err(AuctionError::AlreadyCollected);
        }
        record.collected = true;
        Ok(())
    }

    fn release(&self, key: PublicationKey) {
        if let Some(record) = self.records.lock().get_mut(&key) {
            record.collected = false;
        }
    }

    /// Moves the payment and mints. Everything or nothing.
    fn settle(
        &self,
        key: PublicationKey,
        collector: Address,
        plan: &CollectPlan,
    ) -> AuctionResult<(FeeSplit, TokenId)> {
        let record = &plan.record;
        let splitter = FeeSplitter::new(self.deps.globals.treasury_fee_bps());
        let split = splitter.split(plan.paid, record.referral_fee_bps, plan.referrer.is_some());

        let mut settlement = Settlement::new(self.deps.currency.as_ref());
        let outcome = (|| -> AuctionResult<TokenId> {
            settlement.pull(collector, record.currency, plan.paid)?;
            settlement.pay(self.deps.globals.treasury(), record.currency, split.treasury)?;
            if let Some(referrer) = plan.referrer {
                settlement.pay(referrer, record.currency, split.referrer)?;
            }
            settlement.pay(record.recipient, record.currency, split.recipient)?;
            self.deps
                .host
                .mint_collect_token(key, collector)
                .map_err(AuctionError::MintFailed)
        })();

        match outcome {
            Ok(token_id) => {
                let receipts = settlement.commit();
                debug!(%key, transfers = receipts.len(), "Collect settled");
                Ok((split, token_id))
            }
            Err(e) => {
                settlement.unwind();
                Err(e)
            }
        }
    }

    fn verify(&self, key: PublicationKey) {
        if !self.config.verify_invariants {
            return;
        }
        if let Some(record) = self.records.lock().get(&key) {
            if let InvariantCheckResult::Invalid(violations) = check_dutch_invariants(record) {
                error!(%key, ?violations, "Dutch auction invariant violated");
            }
        }
    }
}

impl CollectModule for DutchAuctionEngine {
    fn kind(&self) -> ModuleKind {
        ModuleKind::DutchAuction
    }

    fn initialize_collect_module(
        &self,
        key: PublicationKey,
        init_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>> {
        let data: DutchAuctionInitData = codec::decode(init_data)?;
        self.validate_init(&data)?;

        let now = self.deps.clock.now();
        let record = DutchAuctionRecord::new(data, now);
        let event = AuctionEvent::DutchAuctionInitialized {
            key,
            start_amount: record.start_amount,
            end_amount: record.end_amount,
            start_timestamp: record.start_timestamp,
            runtime_seconds: record.runtime_seconds,
            currency: record.currency,
        };

        {
            let mut records = self.records.lock();
            if records.contains_key(&key) {
                return Err(AuctionError::AlreadyInitialized(key));
            }
            records.insert(key, record);
        }
        self.verify(key);

        info!(%key, start_timestamp = now, "Dutch auction initialized");
        Ok(vec![event])
    }

    fn process_collect(
        &self,
        key: PublicationKey,
        collector: Address,
        reference: CollectReference,
        collect_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>> {
        let record = self.snapshot(key)?;
        let payment: DutchCollectData = codec::decode(collect_data)?;
        let now = self.deps.clock.now();

        let plan = self
            .plan_collect(key, record, collector, reference, &payment, now)
            .inspect_err(|e| debug!(%key, %collector, error = %e, "Collect rejected"))?;

        self.claim(key)?;

        let (split, token_id) = match self.settle(key, collector, &plan) {
            Ok(settled) => settled,
            Err(e) => {
                self.release(key);
                warn!(%key, %collector, error = %e, "Collect rolled back");
                return Err(e);
            }
        };
        self.verify(key);

        info!(
            %key,
            %collector,
            price = %plan.price,
            paid = %plan.paid,
            token_id,
            "Dutch auction collected"
        );
        Ok(vec![AuctionEvent::Collected {
            key,
            collector,
            price: plan.price,
            paid: plan.paid,
            split,
            referrer: plan.referrer,
            token_id,
        }])
    }
}

impl DutchAuctionApi for DutchAuctionEngine {
    fn current_price(&self, key: PublicationKey) -> AuctionResult<U256> {
        let now = self.deps.clock.now();
        self.records
            .lock()
            .get(&key)
            .map(|record| dutch_price(record, now))
            .ok_or(AuctionError::AuctionNotFound(key))
    }

    fn record(&self, key: PublicationKey) -> Option<DutchAuctionRecord> {
        self.records.lock().get(&key).cloned()
    }
}

// =============================================================================
// TESTS
// =============================================================================
