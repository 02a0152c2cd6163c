//! # Collect Module Service
//!
//! Host-facing facade over both auction engines. Tracks which strategy is
//! attached to each publication and routes requests to it.
//!
//! ## Security
//!
//! - Identity comes from the envelope `sender` only (Envelope-Only Identity)
//! - `handle_initialize` / `handle_process_collect`: configured hub ONLY
//! - `handle_make_bid`: anyone; the sender is the bidder
//! - `handle_finish_auction` / `handle_price_query`: anyone

use crate::domain::entities::{AuctionPhase, ModuleKind};
use crate::domain::value_objects::{Address, PublicationKey};
use crate::engine::{DutchAuctionEngine, EngineConfig, EnglishAuctionEngine};
use crate::errors::{AuctionError, IpcError};
use crate::events::{
    AuctionEvent, FinishAuctionRequestPayload, InitializeRequestPayload, MakeBidRequestPayload,
    ModuleResponsePayload, PriceQuoteResponsePayload, ProcessCollectRequestPayload,
};
use crate::ports::inbound::{AuctionQueryApi, CollectModule, DutchAuctionApi, EnglishAuctionApi};
use crate::ports::outbound::Collaborators;

use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Collect module service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host hub allowed to initialize modules and relay collects.
    pub hub: Address,
    /// Engine tunables.
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            hub: Address::ZERO,
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CM_HUB_ADDRESS`: hub address, 40 hex digits (default: zero address)
    /// - `CM_MIN_BID_INCREMENT_BPS`: English raise in bps (default: 500)
    /// - `CM_VERIFY_INVARIANTS`: check records after each mutation (default: true)
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hub: env::var("CM_HUB_ADDRESS")
                .ok()
                .and_then(|v| Address::from_hex(v.trim()))
                .unwrap_or(defaults.hub),
            engine: EngineConfig {
                min_bid_increment_bps: env::var("CM_MIN_BID_INCREMENT_BPS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.engine.min_bid_increment_bps),
                verify_invariants: env::var("CM_VERIFY_INVARIANTS")
                    .map(|v| v.to_lowercase() != "false" && v != "0")
                    .unwrap_or(defaults.engine.verify_invariants),
            },
        }
    }
}

/// Statistics for the collect module service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Publications with an attached module.
    pub initialized: u64,
    /// Successful Dutch collects.
    pub collects: u64,
    /// Accepted English bids.
    pub bids: u64,
    /// Finalized English auctions.
    pub finalized: u64,
    /// Rejected requests (unauthorized, unknown module or engine failure).
    pub rejected: u64,
    /// Rejections caused by a failed transfer or mint, included in `rejected`.
    pub failed_interactions: u64,
}

/// The collect module service.
///
/// This service:
/// 1. Attaches a Dutch or English module to a publication on hub request
/// 2. Routes collects, bids and finalization to the attached engine
/// 3. Returns the emitted events to the caller
/// 4. Maintains request statistics
pub struct CollectModuleService {
    /// Service configuration.
    config: ServiceConfig,
    /// Descending-price engine.
    dutch: Arc<DutchAuctionEngine>,
    /// Ascending-bid engine.
    english: Arc<EnglishAuctionEngine>,
    /// Strategy attached to each publication.
    attachments: Arc<RwLock<HashMap<PublicationKey, ModuleKind>>>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl CollectModuleService {
    /// Creates a service with fresh engines.
    ///
    /// Each engine gets its own collaborator bundle so it holds funds in its
    /// own custody account.
    #[must_use]
    pub fn new(config: ServiceConfig, dutch: Collaborators, english: Collaborators) -> Self {
        let dutch = Arc::new(DutchAuctionEngine::new(dutch, config.engine));
        let english = Arc::new(EnglishAuctionEngine::new(english, config.engine));
        Self::with_engines(config, dutch, english)
    }

    /// Creates a service over existing engines.
    #[must_use]
    pub fn with_engines(
        config: ServiceConfig,
        dutch: Arc<DutchAuctionEngine>,
        english: Arc<EnglishAuctionEngine>,
    ) -> Self {
        Self {
            config,
            dutch,
            english,
            attachments: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The Dutch engine.
    #[must_use]
    pub fn dutch_engine(&self) -> &Arc<DutchAuctionEngine> {
        &self.dutch
    }

    /// The English engine.
    #[must_use]
    pub fn english_engine(&self) -> &Arc<EnglishAuctionEngine> {
        &self.english
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Attaches a collect module to a publication.
    ///
    /// # Security
    ///
    /// Only the configured hub may initialize.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id, key = %payload.key))]
    pub async fn handle_initialize(
        &self,
        sender: Address,
        correlation_id: Uuid,
        payload: InitializeRequestPayload,
    ) -> Result<ModuleResponsePayload, IpcError> {
        self.authorize_hub(sender).await?;

        let result = {
            let mut attachments = self.attachments.write().await;
            if attachments.contains_key(&payload.key) {
                Err(IpcError::Engine(AuctionError::AlreadyInitialized(payload.key)))
            } else {
                let outcome = self
                    .module(payload.module)
                    .initialize_collect_module(payload.key, &payload.init_data);
                if outcome.is_ok() {
                    attachments.insert(payload.key, payload.module);
                }
                outcome.map_err(IpcError::from)
            }
        };

        let events = self.finish_request(result, |s| s.initialized += 1).await?;
        info!(module = payload.module.name(), "Collect module attached");
        Ok(ModuleResponsePayload { events })
    }

    /// Relays a collect from the hub to the attached module.
    ///
    /// # Security
    ///
    /// Only the configured hub may relay collects.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id, key = %payload.key))]
    pub async fn handle_process_collect(
        &self,
        sender: Address,
        correlation_id: Uuid,
        payload: ProcessCollectRequestPayload,
    ) -> Result<ModuleResponsePayload, IpcError> {
        self.authorize_hub(sender).await?;

        let result = match self.attached(payload.key).await {
            Ok(kind) => self
                .module(kind)
                .process_collect(
                    payload.key,
                    payload.collector,
                    payload.reference,
                    &payload.collect_data,
                )
                .map_err(IpcError::from),
            Err(e) => Err(e),
        };

        let events = self.finish_request(result, |s| s.collects += 1).await?;
        Ok(ModuleResponsePayload { events })
    }

    /// Places a bid on behalf of `sender`.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id, key = %payload.key))]
    pub async fn handle_make_bid(
        &self,
        sender: Address,
        correlation_id: Uuid,
        payload: MakeBidRequestPayload,
    ) -> Result<ModuleResponsePayload, IpcError> {
        let result = match self.attached_english(payload.key).await {
            Ok(()) => self
                .english
                .make_bid(payload.key, sender, payload.currency, payload.amount)
                .map_err(IpcError::from),
            Err(e) => Err(e),
        };

        let events = self.finish_request(result, |s| s.bids += 1).await?;
        Ok(ModuleResponsePayload { events })
    }

    /// Finalizes an English auction. Anyone may call.
    ///
    /// A repeated finalize reports `AlreadyFinalized` without counting as a
    /// rejection.
    #[instrument(skip(self, payload), fields(correlation_id = %correlation_id, key = %payload.key))]
    pub async fn handle_finish_auction(
        &self,
        sender: Address,
        correlation_id: Uuid,
        payload: FinishAuctionRequestPayload,
    ) -> Result<ModuleResponsePayload, IpcError> {
        let result = match self.attached_english(payload.key).await {
            Ok(()) => self
                .english
                .finish_auction(payload.key)
                .map_err(IpcError::from),
            Err(e) => Err(e),
        };

        debug!(%sender, "Finish requested");
        let events = self.finish_request(result, |s| s.finalized += 1).await?;
        Ok(ModuleResponsePayload { events })
    }

    /// Quotes the price of the next sale of `key`.
    #[instrument(skip(self), fields(correlation_id = %correlation_id))]
    pub async fn handle_price_query(
        &self,
        correlation_id: Uuid,
        key: PublicationKey,
    ) -> Result<PriceQuoteResponsePayload, IpcError> {
        self.price_quote(key).await
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn module(&self, kind: ModuleKind) -> &dyn CollectModule {
        match kind {
            ModuleKind::DutchAuction => self.dutch.as_ref(),
            ModuleKind::EnglishAuction => self.english.as_ref(),
        }
    }

    async fn authorize_hub(&self, sender: Address) -> Result<(), IpcError> {
        if sender == self.config.hub {
            return Ok(());
        }
        warn!(%sender, hub = %self.config.hub, "Unauthorized sender");
        self.stats.write().await.rejected += 1;
        Err(IpcError::UnauthorizedSender {
            sender,
            expected: self.config.hub,
        })
    }

    async fn attached(&self, key: PublicationKey) -> Result<ModuleKind, IpcError> {
        self.attachments
            .read()
            .await
            .get(&key)
            .copied()
            .ok_or(IpcError::UnknownModule(key))
    }

    async fn attached_english(&self, key: PublicationKey) -> Result<(), IpcError> {
        match self.attached(key).await? {
            ModuleKind::EnglishAuction => Ok(()),
            ModuleKind::DutchAuction => Err(IpcError::WrongModule {
                key,
                expected: ModuleKind::EnglishAuction.name(),
            }),
        }
    }

    /// Updates statistics for a finished request.
    async fn finish_request(
        &self,
        result: Result<Vec<AuctionEvent>, IpcError>,
        on_success: impl FnOnce(&mut ServiceStats),
    ) -> Result<Vec<AuctionEvent>, IpcError> {
        match &result {
            Ok(events) => {
                on_success(&mut *self.stats.write().await);
                for event in events {
                    debug!(event = event.name(), key = %event.key(), "Event emitted");
                }
            }
            Err(IpcError::Engine(e)) if e.is_benign() => {
                debug!(error = %e, "Benign no-op");
            }
            Err(IpcError::Engine(e)) if e.is_interaction_failure() => {
                warn!(error = %e, "Request failed in a collaborator");
                let mut stats = self.stats.write().await;
                stats.rejected += 1;
                stats.failed_interactions += 1;
            }
            Err(e) => {
                debug!(error = %e, "Request rejected");
                self.stats.write().await.rejected += 1;
            }
        }
        result
    }
}

#[async_trait]
impl AuctionQueryApi for CollectModuleService {
    async fn attached_module(&self, key: PublicationKey) -> Option<ModuleKind> {
        self.attached(key).await.ok()
    }

    async fn price_quote(
        &self,
        key: PublicationKey,
    ) -> Result<PriceQuoteResponsePayload, IpcError> {
        let module = self.attached(key).await?;
        let amount = match module {
            ModuleKind::DutchAuction => self.dutch.current_price(key)?,
            ModuleKind::EnglishAuction => self.english.minimum_bid(key)?,
        };
        Ok(PriceQuoteResponsePayload { module, amount })
    }

    async fn english_phase(&self, key: PublicationKey) -> Result<AuctionPhase, IpcError> {
        self.attached_english(key).await?;
        Ok(self.english.phase(key)?)
    }
}

/// Create a service wired to a fresh fixture world, for testing.
#[cfg(any(test, feature = "testing"))]
#[must_use]
pub fn create_test_service() -> (CollectModuleService, crate::adapters::testing::TestHarness) {
    use crate::adapters::testing::{TestHarness, HUB};

    let harness = TestHarness::new();
    let config = ServiceConfig {
        hub: HUB,
        engine: EngineConfig::default(),
    };
    let service = CollectModuleService::new(
        config,
        harness.collaborators(harness.dutch_custody),
        harness.collaborators(harness.english_custody),
    );
    (service, harness)
}

// =============================================================================
// TESTS
// =============================================================================
