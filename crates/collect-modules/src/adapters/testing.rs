//! # Test Fixtures
//!
//! One ledger, host, globals and clock wired together, with funded and
//! approved accounts. Available to unit tests and, behind the `testing`
//! feature, to the integration test crate.

use super::{InMemoryHost, InMemoryLedger, InMemoryModuleGlobals, ManualTimeSource};
use crate::domain::value_objects::{parse_units, Address, CurrencyId, Timestamp, U256};
use crate::ports::outbound::{Collaborators, CurrencyTransfer};
use std::sync::Arc;

/// Owner of profile 1, the publishing profile of most fixtures.
pub const OWNER: Address = Address::repeat(0x01);
/// Payout recipient of the fixture auctions.
pub const RECIPIENT: Address = Address::repeat(0x02);
/// Protocol treasury.
pub const TREASURY: Address = Address::repeat(0x03);
/// Host hub allowed to initialize and collect.
pub const HUB: Address = Address::repeat(0x04);
/// Funded Dutch collector.
pub const COLLECTOR: Address = Address::repeat(0xc0);
/// Funded English bidder.
pub const BIDDER_A: Address = Address::repeat(0xa0);
/// Funded English bidder.
pub const BIDDER_B: Address = Address::repeat(0xb0);
/// Funded English bidder.
pub const BIDDER_C: Address = Address::repeat(0xcc);
/// Whitelisted fixture currency.
pub const CURRENCY: CurrencyId = CurrencyId::new(Address::repeat(0x99));

/// Block time the fixture clock starts at.
pub const GENESIS: Timestamp = 1_700_000_000;

/// Parses a decimal literal into currency units.
///
/// # Panics
///
/// On a malformed literal.
#[must_use]
pub fn units(value: &str) -> U256 {
    parse_units(value).unwrap_or_else(|| panic!("bad amount literal: {value}"))
}

/// In-memory collaborators with funded accounts.
pub struct TestHarness {
    /// Shared currency ledger.
    pub ledger: Arc<InMemoryLedger>,
    /// Host protocol.
    pub host: Arc<InMemoryHost>,
    /// Governance globals.
    pub globals: Arc<InMemoryModuleGlobals>,
    /// Block time.
    pub clock: Arc<ManualTimeSource>,
    /// Custody account of the Dutch engine.
    pub dutch_custody: Address,
    /// Custody account of the English engine.
    pub english_custody: Address,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Builds the fixture world: profile 1 owned by [`OWNER`], [`CURRENCY`]
    /// whitelisted, zero treasury fee, and every fixture account funded and
    /// approved for both engines.
    #[must_use]
    pub fn new() -> Self {
        let harness = Self {
            ledger: Arc::new(InMemoryLedger::new()),
            host: Arc::new(InMemoryHost::new()),
            globals: Arc::new(InMemoryModuleGlobals::new(TREASURY, 0)),
            clock: Arc::new(ManualTimeSource::new(GENESIS)),
            dutch_custody: Address::repeat(0xd0),
            english_custody: Address::repeat(0xe0),
        };
        harness.host.create_profile(1, OWNER);
        harness.globals.whitelist_currency(CURRENCY, true);
        for account in [COLLECTOR, BIDDER_A, BIDDER_B, BIDDER_C] {
            harness.fund(account, harness.starting_balance());
        }
        harness
    }

    /// Balance every fixture account starts with.
    #[must_use]
    pub fn starting_balance(&self) -> U256 {
        units("1000")
    }

    /// Mints `amount` to `account` and approves both engines without limit.
    pub fn fund(&self, account: Address, amount: U256) {
        self.ledger.mint(CURRENCY, account, amount);
        for custody in [self.dutch_custody, self.english_custody] {
            self.ledger.approve(CURRENCY, account, custody, U256::MAX);
        }
    }

    /// Ledger client acting for `custody`.
    #[must_use]
    pub fn currency_client(&self, custody: Address) -> Arc<dyn CurrencyTransfer> {
        Arc::new(self.ledger.client(custody))
    }

    /// Collaborator bundle for an engine holding funds at `custody`.
    #[must_use]
    pub fn collaborators(&self, custody: Address) -> Collaborators {
        Collaborators {
            globals: self.globals.clone(),
            host: self.host.clone(),
            currency: self.currency_client(custody),
            clock: self.clock.clone(),
        }
    }
}
