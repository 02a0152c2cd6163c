//! # Settlement Journal
//!
//! Records every currency movement of one engine invocation so the
//! invocation can be undone as a whole. Movements are reversed newest first.

use crate::domain::value_objects::{Address, CurrencyId, U256};
use crate::errors::AuctionError;
use crate::ports::outbound::{CurrencyTransfer, TransferReceipt};
use tracing::{debug, error};

/// Journal of the transfers performed by one entry-point call.
pub(crate) struct Settlement<'a> {
    currency: &'a dyn CurrencyTransfer,
    receipts: Vec<TransferReceipt>,
}

impl<'a> Settlement<'a> {
    pub(crate) fn new(currency: &'a dyn CurrencyTransfer) -> Self {
        Self {
            currency,
            receipts: Vec::new(),
        }
    }

    /// Pulls `amount` from `payer` into the module's custody.
    pub(crate) fn pull(
        &mut self,
        payer: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<(), AuctionError> {
        if amount.is_zero() {
            return Ok(());
        }
        let custody = self.currency.custody();
        let receipt = self
            .currency
            .transfer_from(payer, custody, currency, amount)?;
        self.receipts.push(receipt);
        Ok(())
    }

    /// Pays `amount` out of the module's custody to `payee`.
    pub(crate) fn pay(
        &mut self,
        payee: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<(), AuctionError> {
        if amount.is_zero() {
            return Ok(());
        }
        let receipt = self.currency.transfer(payee, currency, amount)?;
        self.receipts.push(receipt);
        Ok(())
    }

    /// Reverses every completed movement, newest first.
    pub(crate) fn unwind(self) {
        for receipt in self.receipts.iter().rev() {
            match self.currency.reverse(receipt) {
                Ok(()) => debug!(
                    from = %receipt.from,
                    to = %receipt.to,
                    amount = %receipt.amount,
                    "Transfer reversed"
                ),
                Err(e) => error!(
                    from = %receipt.from,
                    to = %receipt.to,
                    amount = %receipt.amount,
                    error = %e,
                    "Failed to reverse transfer"
                ),
            }
        }
    }

    /// Keeps every movement.
    pub(crate) fn commit(self) -> Vec<TransferReceipt> {
        self.receipts
    }
}
