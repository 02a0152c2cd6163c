//! # Ledger Adapter
//!
//! In-memory fungible currency ledger. Balances and allowances are keyed by
//! currency, so one ledger serves every whitelisted token.
//!
//! A [`TransferHook`] runs before each movement with no ledger lock held,
//! the way a token's sender callback would. It may call back into an engine.

use crate::domain::value_objects::{Address, CurrencyId, U256};
use crate::errors::TransferError;
use crate::ports::outbound::{CurrencyTransfer, TransferReceipt};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

/// Callback invoked before every hooked transfer.
pub trait TransferHook: Send + Sync {
    /// Called with the movement about to happen.
    fn before_transfer(&self, from: Address, to: Address, currency: CurrencyId, amount: U256);
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<(CurrencyId, Address), U256>,
    /// `(currency, owner, spender)` to approved amount. `U256::MAX` never
    /// decreases.
    allowances: HashMap<(CurrencyId, Address, Address), U256>,
    rejected_payees: HashSet<Address>,
}

impl LedgerState {
    fn balance(&self, currency: CurrencyId, account: Address) -> U256 {
        self.balances
            .get(&(currency, account))
            .copied()
            .unwrap_or_default()
    }

    fn debit(
        &mut self,
        currency: CurrencyId,
        account: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let available = self.balance(currency, account);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                account,
                required: amount,
                available,
            });
        }
        self.balances.insert((currency, account), available - amount);
        Ok(())
    }

    fn credit(&mut self, currency: CurrencyId, account: Address, amount: U256) {
        let entry = self.balances.entry((currency, account)).or_default();
        *entry = entry.saturating_add(amount);
    }

    fn spend_allowance(
        &mut self,
        currency: CurrencyId,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        let approved = self
            .allowances
            .get(&(currency, owner, spender))
            .copied()
            .unwrap_or_default();
        if approved < amount {
            return Err(TransferError::InsufficientAllowance {
                owner,
                required: amount,
                approved,
            });
        }
        if approved != U256::MAX {
            self.allowances
                .insert((currency, owner, spender), approved - amount);
        }
        Ok(())
    }
}

/// In-memory multi-currency ledger.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    hook: RwLock<Option<Arc<dyn TransferHook>>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `account` out of thin air.
    pub fn mint(&self, currency: CurrencyId, account: Address, amount: U256) {
        self.state.lock().credit(currency, account, amount);
    }

    /// Sets the allowance of `spender` over `owner`'s funds.
    pub fn approve(&self, currency: CurrencyId, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .allowances
            .insert((currency, owner, spender), amount);
    }

    /// Balance of `account`.
    #[must_use]
    pub fn balance_of(&self, currency: CurrencyId, account: Address) -> U256 {
        self.state.lock().balance(currency, account)
    }

    /// Remaining allowance of `spender` over `owner`'s funds.
    #[must_use]
    pub fn allowance(&self, currency: CurrencyId, owner: Address, spender: Address) -> U256 {
        self.state
            .lock()
            .allowances
            .get(&(currency, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Makes every transfer to `payee` fail.
    pub fn reject_payee(&self, payee: Address) {
        self.state.lock().rejected_payees.insert(payee);
    }

    /// Lifts [`Self::reject_payee`].
    pub fn accept_payee(&self, payee: Address) {
        self.state.lock().rejected_payees.remove(&payee);
    }

    /// Installs the transfer hook, replacing any previous one.
    pub fn set_hook(&self, hook: Arc<dyn TransferHook>) {
        *self.hook.write() = Some(hook);
    }

    /// Removes the transfer hook.
    pub fn clear_hook(&self) {
        *self.hook.write() = None;
    }

    /// Returns a transfer client acting for the module account `custody`.
    #[must_use]
    pub fn client(self: &Arc<Self>, custody: Address) -> LedgerClient {
        LedgerClient {
            ledger: Arc::clone(self),
            custody,
        }
    }

    fn run_hook(&self, from: Address, to: Address, currency: CurrencyId, amount: U256) {
        let hook = self.hook.read().clone();
        if let Some(hook) = hook {
            hook.before_transfer(from, to, currency, amount);
        }
    }

    /// Moves funds, spending `spender`'s allowance when one is given.
    fn move_funds(
        &self,
        from: Address,
        to: Address,
        currency: CurrencyId,
        amount: U256,
        spender: Option<Address>,
    ) -> Result<TransferReceipt, TransferError> {
        self.run_hook(from, to, currency, amount);

        let mut state = self.state.lock();
        if state.rejected_payees.contains(&to) {
            return Err(TransferError::Rejected(format!("payee {to} refuses funds")));
        }
        if let Some(spender) = spender {
            let approved = state
                .allowances
                .get(&(currency, from, spender))
                .copied()
                .unwrap_or_default();
            if approved < amount {
                return Err(TransferError::InsufficientAllowance {
                    owner: from,
                    required: amount,
                    approved,
                });
            }
        }
        state.debit(currency, from, amount)?;
        if let Some(spender) = spender {
            state.spend_allowance(currency, from, spender, amount)?;
        }
        state.credit(currency, to, amount);

        trace!(%from, %to, %currency, %amount, "Transfer");
        Ok(TransferReceipt {
            from,
            to,
            currency,
            amount,
        })
    }

    /// Moves a receipt's funds back. Bypasses hooks and payee rejection.
    fn reverse_receipt(&self, receipt: &TransferReceipt) -> Result<(), TransferError> {
        let mut state = self.state.lock();
        state.debit(receipt.currency, receipt.to, receipt.amount)?;
        state.credit(receipt.currency, receipt.from, receipt.amount);
        Ok(())
    }
}

/// [`CurrencyTransfer`] bound to one module's custody account.
#[derive(Clone)]
pub struct LedgerClient {
    ledger: Arc<InMemoryLedger>,
    custody: Address,
}

impl CurrencyTransfer for LedgerClient {
    fn custody(&self) -> Address {
        self.custody
    }

    fn transfer_from(
        &self,
        payer: Address,
        payee: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<TransferReceipt, TransferError> {
        self.ledger
            .move_funds(payer, payee, currency, amount, Some(self.custody))
    }

    fn transfer(
        &self,
        payee: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<TransferReceipt, TransferError> {
        self.ledger
            .move_funds(self.custody, payee, currency, amount, None)
    }

    fn reverse(&self, receipt: &TransferReceipt) -> Result<(), TransferError> {
        self.ledger.reverse_receipt(receipt)
    }
}

// =============================================================================
// TESTS
// =============================================================================
