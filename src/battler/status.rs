//! Status conditions a battler can carry

use serde::{Deserialize, Serialize};

/// Status condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// HP reached zero; cannot act or be healed normally
    KnockedOut,
    Poison,
    Blind,
    Silence,
    Sleep,
    Stun,
}

impl Status {
    /// Does this status wear off when a battle ends?
    pub fn expires_at_battle_end(self) -> bool {
        match self {
            Status::KnockedOut | Status::Poison => false,
            Status::Blind | Status::Silence | Status::Sleep | Status::Stun => true,
        }
    }
}
