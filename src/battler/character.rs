//! Party member with HP/MP pools, parameters and statuses

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::battler::status::Status;
use crate::formula::{Stat, StatSource};

/// Combat parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    pub atk: i32,
    pub def: i32,
    pub mat: i32,
    pub mdf: i32,
    pub agi: i32,
    pub luk: i32,
}

/// A party member
///
/// HP stays within [0, mhp] and MP within [0, mmp]. HP of 0 always comes
/// with the knocked-out status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CharacterData")]
pub struct Character {
    name: String,
    level: u32,
    mhp: i32,
    mmp: i32,
    hp: i32,
    mp: i32,
    params: Params,
    statuses: BTreeSet<Status>,
}

impl Character {
    /// Create a character at full HP and MP
    pub fn new(name: impl Into<String>, mhp: i32, mmp: i32) -> Self {
        let mhp = mhp.max(1);
        let mmp = mmp.max(0);
        Self {
            name: name.into(),
            level: 1,
            mhp,
            mmp,
            hp: mhp,
            mp: mmp,
            params: Params::default(),
            statuses: BTreeSet::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.set_hp(hp);
        self
    }

    pub fn with_mp(mut self, mp: i32) -> Self {
        self.set_mp(mp);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.add_status(status);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn mp(&self) -> i32 {
        self.mp
    }

    pub fn mhp(&self) -> i32 {
        self.mhp
    }

    pub fn mmp(&self) -> i32 {
        self.mmp
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn statuses(&self) -> impl Iterator<Item = Status> + '_ {
        self.statuses.iter().copied()
    }

    pub fn has_status(&self, status: Status) -> bool {
        self.statuses.contains(&status)
    }

    pub fn is_knocked_out(&self) -> bool {
        self.has_status(Status::KnockedOut)
    }

    /// Set HP, clamped to [0, mhp]; dropping to 0 knocks the character out
    pub fn set_hp(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.mhp);
        if self.hp == 0 {
            self.knock_out();
        }
    }

    /// Set MP, clamped to [0, mmp]
    pub fn set_mp(&mut self, mp: i32) {
        self.mp = mp.clamp(0, self.mmp);
    }

    /// Add a status; knocked-out also zeroes HP and clears other statuses
    pub fn add_status(&mut self, status: Status) {
        if status == Status::KnockedOut {
            self.knock_out();
        } else if !self.is_knocked_out() {
            self.statuses.insert(status);
        }
    }

    /// Remove a status, returning whether it was present
    ///
    /// Removing knocked-out revives the character with at least 1 HP.
    pub fn remove_status(&mut self, status: Status) -> bool {
        let removed = self.statuses.remove(&status);
        if removed && status == Status::KnockedOut && self.hp == 0 {
            self.hp = 1;
        }
        removed
    }

    fn knock_out(&mut self) {
        self.hp = 0;
        self.statuses.clear();
        self.statuses.insert(Status::KnockedOut);
    }

    /// Per-member cleanup when a battle ends: battle-only statuses wear off
    pub fn on_battle_end(&mut self) {
        let before = self.statuses.len();
        self.statuses.retain(|status| !status.expires_at_battle_end());
        let expired = before - self.statuses.len();
        if expired > 0 {
            tracing::trace!(member = %self.name, expired, "battle statuses expired");
        }
    }
}

impl StatSource for Character {
    fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Level => f64::from(self.level),
            Stat::Hp => f64::from(self.hp),
            Stat::Mp => f64::from(self.mp),
            Stat::MaxHp => f64::from(self.mhp),
            Stat::MaxMp => f64::from(self.mmp),
            Stat::Attack => f64::from(self.params.atk),
            Stat::Defense => f64::from(self.params.def),
            Stat::MagicAttack => f64::from(self.params.mat),
            Stat::MagicDefense => f64::from(self.params.mdf),
            Stat::Agility => f64::from(self.params.agi),
            Stat::Luck => f64::from(self.params.luk),
        }
    }
}

/// On-disk form of a character; missing HP/MP mean full
#[derive(Debug, Clone, Deserialize)]
struct CharacterData {
    name: String,
    #[serde(default = "default_level")]
    level: u32,
    mhp: i32,
    #[serde(default)]
    mmp: i32,
    #[serde(default)]
    hp: Option<i32>,
    #[serde(default)]
    mp: Option<i32>,
    #[serde(default)]
    params: Params,
    #[serde(default)]
    statuses: Vec<Status>,
}

fn default_level() -> u32 {
    1
}

impl From<CharacterData> for Character {
    fn from(data: CharacterData) -> Self {
        let mut character = Character::new(data.name, data.mhp, data.mmp)
            .with_level(data.level)
            .with_params(data.params);
        if let Some(mp) = data.mp {
            character.set_mp(mp);
        }
        for status in data.statuses {
            character.add_status(status);
        }
        if let Some(hp) = data.hp {
            if !character.is_knocked_out() {
                character.set_hp(hp);
            }
        }
        character
    }
}
