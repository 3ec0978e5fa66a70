pub mod config;
pub mod error;

pub use config::{HealAmount, HealMode, PoolConfig, RecoveryConfig, ResolvedHeal};
pub use error::{RecoveryError, Result};
