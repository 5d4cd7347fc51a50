pub mod types;
pub mod interfaces;
pub mod oracle;
pub mod relayer;
pub mod keeper;
pub mod access;
pub mod controls;
pub mod error;
pub mod config;
pub mod observability;

pub use error::{Error, Result};

// Decimal places carried by every on-chain value
pub const FIXED_DECIMALS: u32 = 18;

// Basis point denominator for percentage thresholds
pub const BPS_DENOMINATOR: u32 = 10_000;
