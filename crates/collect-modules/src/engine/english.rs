//! # English Auction Engine
//!
//! Ascending-bid sale of a single collect per publication.
//!
//! ## Lifecycle
//!
//! ```text
//! Open ──(now >= end)──► ExpiredUnfinalized ──finish_auction──► Finalized
//! ```
//!
//! Bids are accepted only while `Open`. The leading bid sits in the module's
//! custody until it is outbid (refunded in full) or the auction is finished
//! (paid out to the recipient, net of the treasury fee).

use crate::codec;
use crate::domain::entities::{
    AuctionPhase, CollectReference, EnglishAuctionInitData, EnglishAuctionRecord, ModuleKind,
};
use crate::domain::fees::{FeeSplit, FeeSplitter};
use crate::domain::invariants::{check_english_invariants, InvariantCheckResult};
use crate::domain::pricing;
use crate::domain::value_objects::{Address, CurrencyId, PublicationKey, Timestamp, TokenId, U256};
use crate::engine::settlement::Settlement;
use crate::engine::EngineConfig;
use crate::errors::AuctionError;
use crate::events::AuctionEvent;
use crate::ports::inbound::{AuctionResult, CollectModule, EnglishAuctionApi};
use crate::ports::outbound::Collaborators;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Custody bookkeeping of one publication.
#[derive(Clone, Copy, Debug, Default)]
struct Escrow {
    /// Currency held in custody on behalf of this publication.
    held: U256,
    /// An accepted bid is still refunding the leader it displaced.
    refund_pending: bool,
}

#[derive(Default)]
struct EnglishBook {
    records: HashMap<PublicationKey, EnglishAuctionRecord>,
    escrow: HashMap<PublicationKey, Escrow>,
}

/// Ascending-bid collect module.
pub struct EnglishAuctionEngine {
    config: EngineConfig,
    deps: Collaborators,
    book: Mutex<EnglishBook>,
}

/// Leader displaced by an accepted bid.
type Displaced = Option<(Address, U256)>;

impl EnglishAuctionEngine {
    /// Creates an engine with no records.
    #[must_use]
    pub fn new(deps: Collaborators, config: EngineConfig) -> Self {
        Self {
            config,
            deps,
            book: Mutex::new(EnglishBook::default()),
        }
    }

    /// Number of publications with an English auction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.book.lock().records.len()
    }

    /// Returns true if no publication uses this engine yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book.lock().records.is_empty()
    }

    fn snapshot(&self, key: PublicationKey) -> AuctionResult<EnglishAuctionRecord> {
        self.book
            .lock()
            .records
            .get(&key)
            .cloned()
            .ok_or(AuctionError::AuctionNotFound(key))
    }

    fn validate_init(&self, data: &EnglishAuctionInitData, now: Timestamp) -> AuctionResult<()> {
        if data.end_timestamp <= now {
            return Err(AuctionError::InvalidAuctionParams(
                "end timestamp not in the future",
            ));
        }
        if data.recipient.is_zero() {
            return Err(AuctionError::InvalidAuctionParams("recipient is the zero address"));
        }
        if !data.highest_bidder.is_zero() {
            return Err(AuctionError::InvalidAuctionParams(
                "initial highest bidder must be unset",
            ));
        }
        if !self.deps.globals.is_whitelisted(data.currency) {
            return Err(AuctionError::CurrencyNotWhitelisted(data.currency));
        }
        Ok(())
    }

    /// Time window and amount checks, shared by validation and the
    /// post-pull re-check.
    fn check_bid_window(
        &self,
        record: &EnglishAuctionRecord,
        amount: U256,
        now: Timestamp,
    ) -> AuctionResult<()> {
        if record.phase(now) != AuctionPhase::Open {
            return Err(AuctionError::AuctionEnded);
        }
        let minimum = pricing::minimum_bid(record, self.config.min_bid_increment_bps);
        if amount < minimum {
            return Err(AuctionError::BidTooLow {
                minimum,
                offered: amount,
            });
        }
        Ok(())
    }

    fn refund_in_flight(&self, key: PublicationKey) -> bool {
        self.book
            .lock()
            .escrow
            .get(&key)
            .is_some_and(|escrow| escrow.refund_pending)
    }

    fn validate_bid(
        &self,
        key: PublicationKey,
        bidder: Address,
        currency: CurrencyId,
        amount: U256,
        now: Timestamp,
    ) -> AuctionResult<EnglishAuctionRecord> {
        let record = self.snapshot(key)?;
        if record.phase(now) != AuctionPhase::Open {
            return Err(AuctionError::AuctionEnded);
        }
        if self.refund_in_flight(key) {
            return Err(AuctionError::RefundPending);
        }
        if currency != record.currency {
            return Err(AuctionError::CurrencyMismatch {
                expected: record.currency,
                got: currency,
            });
        }
        if record.only_followers && !self.deps.host.is_following(key.profile_id, bidder) {
            return Err(AuctionError::FollowInvalid);
        }
        self.check_bid_window(&record, amount, now)?;
        Ok(record)
    }

    /// Re-checks against the live record and makes `bidder` the leader.
    ///
    /// The new funds are counted in escrow immediately; the displaced
    /// leader's funds stay counted until the refund completes. While that
    /// refund runs the key refuses further bids and finalization, so the
    /// record cannot move under it.
    fn accept_bid(
        &self,
        key: PublicationKey,
        bidder: Address,
        amount: U256,
        now: Timestamp,
    ) -> AuctionResult<Displaced> {
        let mut book = self.book.lock();
        let EnglishBook { records, escrow } = &mut *book;
        let record = records
            .get_mut(&key)
            .ok_or(AuctionError::AuctionNotFound(key))?;
        let escrow = escrow.entry(key).or_default();
        if escrow.refund_pending {
            return Err(AuctionError::RefundPending);
        }
        self.check_bid_window(record, amount, now)?;

        let displaced = record.leading_bid();
        record.highest_bidder = Some(bidder);
        record.highest_bid = amount;
        escrow.held = escrow.held.saturating_add(amount);
        escrow.refund_pending = displaced.is_some();
        Ok(displaced)
    }

    /// Marks the displaced leader's refund as done.
    fn refund_completed(&self, key: PublicationKey, refunded: U256) {
        let mut book = self.book.lock();
        let escrow = book.escrow.entry(key).or_default();
        escrow.held = escrow.held.saturating_sub(refunded);
        escrow.refund_pending = false;
    }

    /// Puts the displaced leader back after a failed refund and drops the
    /// new bid from escrow.
    fn restore_leader(&self, key: PublicationKey, amount: U256, displaced: (Address, U256)) {
        let mut book = self.book.lock();
        let EnglishBook { records, escrow } = &mut *book;
        if let Some(record) = records.get_mut(&key) {
            record.highest_bidder = Some(displaced.0);
            record.highest_bid = displaced.1;
        }
        let escrow = escrow.entry(key).or_default();
        escrow.held = escrow.held.saturating_sub(amount);
        escrow.refund_pending = false;
    }

    /// Flips `finalized` and takes the leader's funds out of escrow.
    fn close(&self, key: PublicationKey, now: Timestamp) -> AuctionResult<EnglishAuctionRecord> {
        let mut book = self.book.lock();
        let EnglishBook { records, escrow } = &mut *book;
        let record = records
            .get_mut(&key)
            .ok_or(AuctionError::AuctionNotFound(key))?;
        if now < record.end_timestamp {
            return Err(AuctionError::AuctionNotEnded);
        }
        if record.finalized {
            return Err(AuctionError::AlreadyFinalized);
        }
        let escrow = escrow.entry(key).or_default();
        if escrow.refund_pending {
            return Err(AuctionError::RefundPending);
        }
        record.finalized = true;
        if let Some((_, amount)) = record.leading_bid() {
            escrow.held = escrow.held.saturating_sub(amount);
        }
        Ok(record.clone())
    }

    /// Undoes [`Self::close`] after a failed payout.
    fn reopen(&self, key: PublicationKey, amount: U256) {
        let mut book = self.book.lock();
        let EnglishBook { records, escrow } = &mut *book;
        if let Some(record) = records.get_mut(&key) {
            record.finalized = false;
        }
        let escrow = escrow.entry(key).or_default();
        escrow.held = escrow.held.saturating_add(amount);
    }

    /// Pays the winning bid out and mints to the winner.
    fn settle(
        &self,
        key: PublicationKey,
        record: &EnglishAuctionRecord,
        winner: Address,
        amount: U256,
    ) -> AuctionResult<(FeeSplit, TokenId)> {
        let splitter = FeeSplitter::new(self.deps.globals.treasury_fee_bps());
        let split = splitter.split(amount, 0, false);

        let mut settlement = Settlement::new(self.deps.currency.as_ref());
        let outcome = (|| -> AuctionResult<TokenId> {
            settlement.pay(self.deps.globals.treasury(), record.currency, split.treasury)?;
            settlement.pay(record.recipient, record.currency, split.recipient)?;
            self.deps
                .host
                .mint_collect_token(key, winner)
                .map_err(AuctionError::MintFailed)
        })();

        match outcome {
            Ok(token_id) => {
                settlement.commit();
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
        let book = self.book.lock();
        let Some(record) = book.records.get(&key) else {
            return;
        };
        let escrow = book.escrow.get(&key).copied().unwrap_or_default();
        if escrow.refund_pending {
            return;
        }
        if let InvariantCheckResult::Invalid(violations) =
            check_english_invariants(record, escrow.held)
        {
            error!(%key, ?violations, "English auction invariant violated");
        }
    }
}

impl CollectModule for EnglishAuctionEngine {
    fn kind(&self) -> ModuleKind {
        ModuleKind::EnglishAuction
    }

    fn initialize_collect_module(
        &self,
        key: PublicationKey,
        init_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>> {
        let data: EnglishAuctionInitData = codec::decode(init_data)?;
        let now = self.deps.clock.now();
        self.validate_init(&data, now)?;

        let record = EnglishAuctionRecord::new(data, now);
        let event = AuctionEvent::EnglishAuctionInitialized {
            key,
            end_timestamp: record.end_timestamp,
            reserve: record.start_amount,
            currency: record.currency,
        };

        {
            let mut book = self.book.lock();
            if book.records.contains_key(&key) {
                return Err(AuctionError::AlreadyInitialized(key));
            }
            book.records.insert(key, record);
            book.escrow.insert(key, Escrow::default());
        }
        self.verify(key);

        info!(%key, created_at = now, "English auction initialized");
        Ok(vec![event])
    }

    /// English auctions mint only through [`EnglishAuctionApi::finish_auction`].
    fn process_collect(
        &self,
        key: PublicationKey,
        collector: Address,
        _reference: CollectReference,
        _collect_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>> {
        self.snapshot(key)?;
        debug!(%key, %collector, "Direct collect refused");
        Err(AuctionError::DirectCollectUnsupported)
    }
}

impl EnglishAuctionApi for EnglishAuctionEngine {
    fn make_bid(
        &self,
        key: PublicationKey,
        bidder: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> AuctionResult<Vec<AuctionEvent>> {
        let now = self.deps.clock.now();
        self.validate_bid(key, bidder, currency, amount, now)
            .inspect_err(|e| debug!(%key, %bidder, %amount, error = %e, "Bid rejected"))?;

        let mut settlement = Settlement::new(self.deps.currency.as_ref());
        settlement.pull(bidder, currency, amount)?;

        // The pull may have run currency code that re-entered this engine.
        let displaced = match self.accept_bid(key, bidder, amount, now) {
            Ok(displaced) => displaced,
            Err(e) => {
                settlement.unwind();
                debug!(%key, %bidder, %amount, error = %e, "Bid overtaken during transfer");
                return Err(e);
            }
        };

        let mut events = vec![AuctionEvent::BidPlaced {
            key,
            bidder,
            amount,
        }];

        if let Some((previous, refund)) = displaced {
            if let Err(e) = settlement.pay(previous, currency, refund) {
                self.restore_leader(key, amount, (previous, refund));
                settlement.unwind();
                warn!(%key, %bidder, %previous, error = %e, "Refund failed; bid rolled back");
                return Err(e);
            }
            self.refund_completed(key, refund);
            events.push(AuctionEvent::BidRefunded {
                key,
                bidder: previous,
                amount: refund,
            });
        }
        settlement.commit();
        self.verify(key);

        info!(%key, %bidder, %amount, "Bid placed");
        Ok(events)
    }

    fn minimum_bid(&self, key: PublicationKey) -> AuctionResult<U256> {
        self.book
            .lock()
            .records
            .get(&key)
            .map(|record| pricing::minimum_bid(record, self.config.min_bid_increment_bps))
            .ok_or(AuctionError::AuctionNotFound(key))
    }

    fn finish_auction(&self, key: PublicationKey) -> AuctionResult<Vec<AuctionEvent>> {
        let now = self.deps.clock.now();
        let record = self
            .close(key, now)
            .inspect_err(|e| debug!(%key, error = %e, "Finish rejected"))?;

        let Some((winner, amount)) = record.leading_bid() else {
            self.verify(key);
            info!(%key, "English auction finished without bids");
            return Ok(vec![AuctionEvent::AuctionFinished {
                key,
                winner: None,
                amount: U256::zero(),
                split: FeeSplit::default(),
                token_id: None,
            }]);
        };

        let (split, token_id) = match self.settle(key, &record, winner, amount) {
            Ok(settled) => settled,
            Err(e) => {
                self.reopen(key, amount);
                warn!(%key, %winner, error = %e, "Finish rolled back");
                return Err(e);
            }
        };
        self.verify(key);

        info!(%key, %winner, %amount, token_id, "English auction finished");
        Ok(vec![AuctionEvent::AuctionFinished {
            key,
            winner: Some(winner),
            amount,
            split,
            token_id: Some(token_id),
        }])
    }

    fn phase(&self, key: PublicationKey) -> AuctionResult<AuctionPhase> {
        let now = self.deps.clock.now();
        self.book
            .lock()
            .records
            .get(&key)
            .map(|record| record.phase(now))
            .ok_or(AuctionError::AuctionNotFound(key))
    }

    fn escrowed(&self, key: PublicationKey) -> U256 {
        self.book
            .lock()
            .escrow
            .get(&key)
            .map(|escrow| escrow.held)
            .unwrap_or_default()
    }

    fn record(&self, key: PublicationKey) -> Option<EnglishAuctionRecord> {
        self.snapshot(key).ok()
    }
}

// =============================================================================
// TESTS
// =============================================================================
