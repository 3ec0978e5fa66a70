//! Battle lifecycle: results and the battle-end hook interface

pub mod hooks;
pub mod result;

pub use hooks::{BattleEndDispatcher, MemberBattleEndHook};
pub use result::BattleResult;
