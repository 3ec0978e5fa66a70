//! Party roster

use serde::{Deserialize, Serialize};

use crate::battle::BattleResult;
use crate::battler::character::Character;

/// The player's party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    members: Vec<Character>,
    /// Whether the most recent battle ended in victory
    #[serde(default)]
    won_battle: bool,
}

impl Party {
    pub fn new(members: Vec<Character>) -> Self {
        Self {
            members,
            won_battle: false,
        }
    }

    pub fn add_member(&mut self, member: Character) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[Character] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [Character] {
        &mut self.members
    }

    pub fn member(&self, name: &str) -> Option<&Character> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn won_battle(&self) -> bool {
        self.won_battle
    }

    /// Store the outcome of the battle that just ended
    pub fn record_battle_result(&mut self, result: BattleResult) {
        self.won_battle = result.is_victory();
    }
}
