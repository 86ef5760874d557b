//! Network and policy configuration.
//!
//! Example config file:
//!
//! ```toml
//! [network]
//! name = "test"
//!
//! [policy]
//! transaction_validity_window = 120
//! max_basic_data_size = 64
//! ```

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::TransactionError;

/// Number of lunas in one coin.
pub const LUNAS_PER_COIN: u64 = 100_000;

/// Largest representable amount of lunas (2^53-1).
pub const MAX_SAFE_VALUE: u64 = (1 << 53) - 1;

/// Identifier of the network a transaction is valid in.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkId(pub u8);

impl NetworkId {
    /// Main network.
    pub const MAIN: NetworkId = NetworkId(42);
    /// Public test network.
    pub const TEST: NetworkId = NetworkId(5);
    /// Development network.
    pub const DEV: NetworkId = NetworkId(6);
    /// Network used by unit tests.
    pub const UNIT: NetworkId = NetworkId(7);

    /// Name of a known network.
    pub fn name(self) -> Option<&'static str> {
        match self {
            NetworkId::MAIN => Some("main"),
            NetworkId::TEST => Some("test"),
            NetworkId::DEV => Some("dev"),
            NetworkId::UNIT => Some("unit"),
            _ => None,
        }
    }

    /// Looks up a known network by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "main" => Some(NetworkId::MAIN),
            "test" => Some(NetworkId::TEST),
            "dev" => Some(NetworkId::DEV),
            "unit" => Some(NetworkId::UNIT),
            _ => None,
        }
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        NetworkId::MAIN
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetworkId({})", self)
    }
}

/// Parses a network name or a numeric id.
impl FromStr for NetworkId {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NetworkId::from_name(s)
            .or_else(|| s.parse::<u8>().ok().map(NetworkId))
            .ok_or_else(|| TransactionError::UnknownNetwork(s.to_string()))
    }
}

impl Serialize for NetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration file for the account layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Network selection
    #[serde(default)]
    pub network: Network,

    /// Consensus policy constants
    #[serde(default)]
    pub policy: Policy,
}

/// Network configuration options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Network the node validates transactions for.
    #[serde(default, rename = "name")]
    pub id: NetworkId,
}

/// Policy constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Number of blocks a transaction stays valid after its validity start height.
    #[serde(default = "Policy::default_transaction_validity_window")]
    pub transaction_validity_window: u32,

    /// Maximum size of data attached to a transaction for a basic account.
    #[serde(default = "Policy::default_max_basic_data_size")]
    pub max_basic_data_size: usize,
}

impl Config {
    /// Parses a TOML config. Missing sections take their defaults.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Returns a documentation for the config file.
    pub fn documentation() -> &'static str {
        r##"
    [network]
    name = "main"                       # one of "main", "test", "dev", "unit"

    [policy]
    transaction_validity_window = 120   # blocks a transaction stays valid after its start height
    max_basic_data_size = 64            # bytes of data a basic account accepts
"##
    }
}

impl Policy {
    /// Default validity window (120 blocks).
    pub fn default_transaction_validity_window() -> u32 {
        120
    }

    /// Default data limit for basic accounts (64 bytes).
    pub fn default_max_basic_data_size() -> usize {
        64
    }

    /// Converts coins to lunas, rounding to the nearest luna.
    pub fn coins_to_lunas(coins: f64) -> u64 {
        (coins * LUNAS_PER_COIN as f64).round() as u64
    }

    /// Converts lunas to coins.
    pub fn lunas_to_coins(lunas: u64) -> f64 {
        lunas as f64 / LUNAS_PER_COIN as f64
    }

    /// True if a transaction starting at `validity_start_height` may be applied at `block_height`.
    pub fn is_within_validity_window(&self, validity_start_height: u32, block_height: u32) -> bool {
        block_height >= validity_start_height
            && (block_height as u64)
                < validity_start_height as u64 + self.transaction_validity_window as u64
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            transaction_validity_window: Self::default_transaction_validity_window(),
            max_basic_data_size: Self::default_max_basic_data_size(),
        }
    }
}
