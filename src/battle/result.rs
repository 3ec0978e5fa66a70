//! How a battle ended

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{RecoveryError, Result};

/// Battle result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleResult {
    Win,
    Escape,
    /// Ended by an event rather than by either side
    Abort,
    Defeat,
}

impl BattleResult {
    /// Map the engine's result codes (0 win, 1 escape, 2 defeat)
    ///
    /// Aborts have no code of their own; build them directly.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(BattleResult::Win),
            1 => Ok(BattleResult::Escape),
            2 => Ok(BattleResult::Defeat),
            other => Err(RecoveryError::UnknownResultCode(other)),
        }
    }

    pub fn is_victory(self) -> bool {
        matches!(self, BattleResult::Win)
    }
}

impl fmt::Display for BattleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattleResult::Win => "win",
            BattleResult::Escape => "escape",
            BattleResult::Abort => "abort",
            BattleResult::Defeat => "defeat",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(BattleResult::from_code(0).unwrap(), BattleResult::Win);
        assert_eq!(BattleResult::from_code(1).unwrap(), BattleResult::Escape);
        assert_eq!(BattleResult::from_code(2).unwrap(), BattleResult::Defeat);
        assert!(matches!(
            BattleResult::from_code(3),
            Err(RecoveryError::UnknownResultCode(3))
        ));
    }

    #[test]
    fn test_only_win_is_victory() {
        assert!(BattleResult::Win.is_victory());
        assert!(!BattleResult::Escape.is_victory());
        assert!(!BattleResult::Abort.is_victory());
        assert!(!BattleResult::Defeat.is_victory());
    }
}
