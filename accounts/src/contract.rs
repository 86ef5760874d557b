//! Rules shared by all contract types.
//!
//! A contract lives at the address derived from its creating transaction,
//! receives funds exactly once (on creation) and reverts to a basic account
//! when that creation is rolled back.

use log::debug;

use super::{Account, AccountError, BasicAccount, Transaction};

/// Incoming check shared by contracts: the recipient must be the
/// creation address of this very transaction.
pub(crate) fn verify_incoming_transaction(transaction: &Transaction) -> bool {
    if transaction.recipient() != &transaction.contract_creation_address() {
        debug!("recipient is not the contract creation address");
        return false;
    }
    true
}

pub(crate) fn with_contract_command(
    account: &Account,
    is_contract_creation: bool,
    revert: bool,
) -> Result<Account, AccountError> {
    if revert && is_contract_creation {
        return Ok(Account::Basic(BasicAccount::new(account.balance())?));
    }
    Ok(account.clone())
}
