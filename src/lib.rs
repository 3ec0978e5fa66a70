//! Battle Recovery - post-battle HP/MP restoration for party battlers

pub mod battle;
pub mod battler;
pub mod core;
pub mod formula;
pub mod recovery;
