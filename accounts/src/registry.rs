use std::collections::BTreeMap;

use serde::Serialize;

use super::config::{Config, Policy};
use super::{
    Account, AccountError, AccountType, BasicAccountBehavior, HtlcBehavior, Transaction,
    VestingContractBehavior,
};

/// JSON object produced by the plain projections of transaction data and proofs.
pub type PlainObject = serde_json::Map<String, serde_json::Value>;

/// Converts a serializable value into a [PlainObject]. Non-object values yield an empty object.
pub fn to_plain_object<T: Serialize>(value: &T) -> PlainObject {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => PlainObject::new(),
    }
}

/// Per-type verification rules, looked up by the numeric account type.
///
/// Verification methods return `false` for any malformed or unauthorized
/// input; they never fail with an error.
pub trait AccountBehavior: Send + Sync {
    /// The type tag this behavior is registered under.
    fn account_type(&self) -> AccountType;

    /// Creates the account from its creating transaction; `balance` is the
    /// balance already credited to the address.
    fn create(
        &self,
        balance: u64,
        block_height: u32,
        transaction: &Transaction,
    ) -> Result<Account, AccountError>;

    /// Stateless check of a transaction sent from an account of this type.
    fn verify_outgoing_transaction(&self, transaction: &Transaction) -> bool;

    /// Stateless check of a transaction sent to an account of this type.
    fn verify_incoming_transaction(&self, transaction: &Transaction) -> bool;

    /// Plain projection of the data of a transaction sent to this type.
    fn data_to_plain(&self, _data: &[u8]) -> PlainObject {
        PlainObject::new()
    }

    /// Plain projection of the proof of a transaction sent from this type.
    fn proof_to_plain(&self, _proof: &[u8]) -> PlainObject {
        PlainObject::new()
    }
}

/// Immutable table of account behaviors, built once at startup and passed
/// by reference into every verification.
pub struct AccountRegistry {
    behaviors: BTreeMap<AccountType, Box<dyn AccountBehavior>>,
    policy: Policy,
}

/// Builder for an [AccountRegistry].
pub struct AccountRegistryBuilder {
    behaviors: Vec<Box<dyn AccountBehavior>>,
    policy: Policy,
    default_types: bool,
}

impl AccountRegistry {
    /// Starts a registry with the built-in types and the default policy.
    pub fn builder() -> AccountRegistryBuilder {
        AccountRegistryBuilder {
            behaviors: Vec::new(),
            policy: Policy::default(),
            default_types: true,
        }
    }

    /// Registry with the built-in types, configured by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::builder().policy(config.policy.clone()).build()
    }

    /// Behavior registered for a type.
    pub fn get(&self, account_type: AccountType) -> Option<&dyn AccountBehavior> {
        self.behaviors.get(&account_type).map(|b| b.as_ref())
    }

    /// True if the type is registered.
    pub fn contains(&self, account_type: AccountType) -> bool {
        self.behaviors.contains_key(&account_type)
    }

    /// Registered types in ascending order.
    pub fn account_types(&self) -> impl Iterator<Item = AccountType> + '_ {
        self.behaviors.keys().copied()
    }

    /// Policy the registry was built with.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl AccountRegistryBuilder {
    /// Sets the policy used by the built-in behaviors.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Leaves out the built-in types.
    pub fn without_default_types(mut self) -> Self {
        self.default_types = false;
        self
    }

    /// Adds a behavior; it replaces any earlier one with the same type.
    ///
    /// A registered type takes part in transaction verification and plain
    /// projections only. Account state is the closed [Account] enum, so
    /// `create` of a new type cannot return a state of its own and
    /// [Account] decoding rejects its tag.
    pub fn register(mut self, behavior: Box<dyn AccountBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> AccountRegistry {
        let mut behaviors: BTreeMap<AccountType, Box<dyn AccountBehavior>> = BTreeMap::new();
        if self.default_types {
            let defaults: Vec<Box<dyn AccountBehavior>> = vec![
                Box::new(BasicAccountBehavior::new(self.policy.max_basic_data_size)),
                Box::new(VestingContractBehavior),
                Box::new(HtlcBehavior),
            ];
            for behavior in defaults {
                behaviors.insert(behavior.account_type(), behavior);
            }
        }
        for behavior in self.behaviors {
            behaviors.insert(behavior.account_type(), behavior);
        }
        AccountRegistry {
            behaviors,
            policy: self.policy,
        }
    }
}
