//! Battle-end hooks
//!
//! The battle engine calls `BattleEndDispatcher::battle_end` once when a
//! battle finishes. For every party member the built-in cleanup runs first,
//! then each registered hook in registration order.

use crate::battle::result::BattleResult;
use crate::battler::{Character, Party};

/// Per-member work to run after a battle ends
pub trait MemberBattleEndHook {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Called once per member, after that member's own cleanup
    fn on_member_battle_end(&self, member: &mut Character, party_won: bool);
}

/// Runs registered hooks when a battle ends
#[derive(Default)]
pub struct BattleEndDispatcher {
    hooks: Vec<Box<dyn MemberBattleEndHook>>,
}

impl BattleEndDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook; hooks run in the order they were registered
    pub fn register(&mut self, hook: impl MemberBattleEndHook + 'static) {
        tracing::debug!(hook = hook.name(), "registered battle-end hook");
        self.hooks.push(Box::new(hook));
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Record the result on the party and run per-member processing
    pub fn battle_end(&self, party: &mut Party, result: BattleResult) {
        party.record_battle_result(result);
        let party_won = party.won_battle();

        tracing::info!(
            %result,
            members = party.len(),
            hooks = self.hooks.len(),
            "battle ended"
        );

        for member in party.members_mut() {
            member.on_battle_end();
            for hook in &self.hooks {
                hook.on_member_battle_end(member, party_won);
            }
        }
    }
}
