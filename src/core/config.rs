//! Recovery configuration
//!
//! One explicit struct, built once and handed to `RecoveryRule::new`.
//! Nothing reads configuration from global state.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{RecoveryError, Result};

/// How the amount restored to a pool is calculated
///
/// Config files may name the mode (`"percent_of_max"`) or use the classic
/// numeric code (`3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "HealModeRepr")]
pub enum HealMode {
    /// Nothing is restored
    None,
    /// A flat amount
    Fixed,
    /// A percentage of what the character is missing
    PercentOfMissing,
    /// A percentage of the pool's maximum
    PercentOfMax,
    /// The result of a stat formula
    Formula,
}

impl HealMode {
    /// Map the classic numeric mode codes (0..=4) to a mode
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(HealMode::None),
            1 => Ok(HealMode::Fixed),
            2 => Ok(HealMode::PercentOfMissing),
            3 => Ok(HealMode::PercentOfMax),
            4 => Ok(HealMode::Formula),
            other => Err(RecoveryError::UnknownHealMode(other)),
        }
    }

    /// Parse the snake_case name used in config files
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "none" => Ok(HealMode::None),
            "fixed" => Ok(HealMode::Fixed),
            "percent_of_missing" => Ok(HealMode::PercentOfMissing),
            "percent_of_max" => Ok(HealMode::PercentOfMax),
            "formula" => Ok(HealMode::Formula),
            other => Err(RecoveryError::UnknownHealModeName(other.to_string())),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            HealMode::None => 0,
            HealMode::Fixed => 1,
            HealMode::PercentOfMissing => 2,
            HealMode::PercentOfMax => 3,
            HealMode::Formula => 4,
        }
    }

    /// Does this mode expect a formula string rather than a number?
    pub fn takes_formula(self) -> bool {
        matches!(self, HealMode::Formula)
    }
}

/// Either spelling of a mode as it appears in a config file
#[derive(Deserialize)]
#[serde(untagged)]
enum HealModeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<HealModeRepr> for HealMode {
    type Error = RecoveryError;

    fn try_from(repr: HealModeRepr) -> Result<Self> {
        match repr {
            HealModeRepr::Code(code) => HealMode::from_code(code),
            HealModeRepr::Name(name) => HealMode::from_name(&name),
        }
    }
}

impl fmt::Display for HealMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealMode::None => "none",
            HealMode::Fixed => "fixed",
            HealMode::PercentOfMissing => "percent_of_missing",
            HealMode::PercentOfMax => "percent_of_max",
            HealMode::Formula => "formula",
        };
        f.write_str(name)
    }
}

/// Amount paired with a heal mode: a number, or formula source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealAmount {
    Number(f64),
    Formula(String),
}

impl From<f64> for HealAmount {
    fn from(value: f64) -> Self {
        HealAmount::Number(value)
    }
}

impl From<&str> for HealAmount {
    fn from(source: &str) -> Self {
        HealAmount::Formula(source.to_string())
    }
}

/// Mode and amount for a single pool (HP or MP)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub mode: HealMode,
    pub amount: HealAmount,
}

impl PoolConfig {
    pub fn new(mode: HealMode, amount: impl Into<HealAmount>) -> Self {
        Self {
            mode,
            amount: amount.into(),
        }
    }

    /// A pool that is never restored
    pub fn disabled() -> Self {
        Self::new(HealMode::None, 0.0)
    }

    /// Pair the mode with its amount
    ///
    /// Formula mode needs text and every other mode needs a finite number.
    pub fn resolve(&self, pool: &str) -> Result<ResolvedHeal<'_>> {
        match (self.mode, &self.amount) {
            (HealMode::Formula, HealAmount::Formula(source)) => Ok(ResolvedHeal::Formula(source)),
            (HealMode::Formula, HealAmount::Number(_)) => Err(RecoveryError::InvalidConfig(
                format!("{} mode is formula but amount is a number", pool),
            )),
            (mode, HealAmount::Formula(_)) => Err(RecoveryError::InvalidConfig(format!(
                "{} mode is {} but amount is a formula string",
                pool, mode
            ))),
            (_, HealAmount::Number(n)) if !n.is_finite() => Err(RecoveryError::InvalidConfig(
                format!("{} amount must be finite, got {}", pool, n),
            )),
            (HealMode::None, HealAmount::Number(_)) => Ok(ResolvedHeal::None),
            (HealMode::Fixed, HealAmount::Number(n)) => Ok(ResolvedHeal::Fixed(*n)),
            (HealMode::PercentOfMissing, HealAmount::Number(n)) => {
                Ok(ResolvedHeal::PercentOfMissing(*n))
            }
            (HealMode::PercentOfMax, HealAmount::Number(n)) => Ok(ResolvedHeal::PercentOfMax(*n)),
        }
    }
}

/// A pool's mode with its amount checked and unpacked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedHeal<'a> {
    None,
    Fixed(f64),
    PercentOfMissing(f64),
    PercentOfMax(f64),
    Formula(&'a str),
}

/// Settings for post-battle recovery
///
/// Defaults restore 10% of max HP and 20% of max MP, revive knocked-out
/// members, and only run after a victory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// HP restoration rule
    pub hp: PoolConfig,

    /// MP restoration rule
    pub mp: PoolConfig,

    /// Clear the knocked-out status before healing
    ///
    /// When false, knocked-out members receive no healing at all.
    pub remove_knockout: bool,

    /// Only recover after a victory
    ///
    /// When false, recovery also runs after escape, abort and defeat.
    pub only_on_win: bool,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            hp: PoolConfig::new(HealMode::PercentOfMax, 10.0),
            mp: PoolConfig::new(HealMode::PercentOfMax, 20.0),
            remove_knockout: true,
            only_on_win: true,
        }
    }
}

impl RecoveryConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that each amount matches its mode
    ///
    /// Formula syntax is not checked here: a formula that fails to parse
    /// restores nothing instead of rejecting the whole configuration.
    pub fn validate(&self) -> Result<()> {
        self.hp.resolve("hp")?;
        self.mp.resolve("mp")?;
        Ok(())
    }

    /// Parse a TOML document; missing keys fall back to the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RecoveryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
