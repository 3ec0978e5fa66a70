//! Post-battle recovery rule
//!
//! When a battle ends, each party member (optionally revived first) gets
//! HP and MP back according to the configured heal modes. Results are
//! clamped to [1, mhp] for HP and [0, mmp] for MP. A formula that fails to
//! parse or evaluate restores nothing and never fails the pass.

use std::fmt;

use crate::battle::MemberBattleEndHook;
use crate::battler::{Character, Status};
use crate::core::config::{PoolConfig, RecoveryConfig, ResolvedHeal};
use crate::core::error::Result;
use crate::formula::{Formula, FormulaError};

/// Which resource is being restored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pool {
    Hp,
    Mp,
}

impl Pool {
    /// Lowest value recovery may leave the pool at
    fn floor(self) -> i64 {
        match self {
            Pool::Hp => 1,
            Pool::Mp => 0,
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Hp => f.write_str("hp"),
            Pool::Mp => f.write_str("mp"),
        }
    }
}

/// What happened to one member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// Battle was not won and recovery is victory-only
    NotTriggered,
    /// Member is knocked out and knockouts are not removed
    StillKnockedOut,
    /// Healing ran; values are the actual change applied
    Recovered { hp: i32, mp: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Knocked-out status was removed
    pub revived: bool,
    pub outcome: RecoveryOutcome,
}

impl RecoveryReport {
    fn untouched(outcome: RecoveryOutcome) -> Self {
        Self {
            revived: false,
            outcome,
        }
    }
}

/// Round half up: add 0.5, then truncate toward zero
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).trunc() as i64
}

/// Heal mode with its amount resolved
#[derive(Debug, Clone)]
enum PoolHeal {
    None,
    Fixed(f64),
    PercentOfMissing(f64),
    PercentOfMax(f64),
    Formula(std::result::Result<Formula, FormulaError>),
}

impl PoolHeal {
    /// Fails when the amount does not fit the mode; a formula that does not
    /// parse is kept as an error and restores nothing
    fn compile(pool: Pool, config: &PoolConfig) -> Result<Self> {
        let heal = match config.resolve(&pool.to_string())? {
            ResolvedHeal::None => PoolHeal::None,
            ResolvedHeal::Fixed(amount) => PoolHeal::Fixed(amount),
            ResolvedHeal::PercentOfMissing(percent) => PoolHeal::PercentOfMissing(percent),
            ResolvedHeal::PercentOfMax(percent) => PoolHeal::PercentOfMax(percent),
            ResolvedHeal::Formula(source) => {
                let compiled = Formula::parse(source);
                if let Err(e) = &compiled {
                    tracing::debug!(%pool, error = %e, "recovery formula will restore nothing");
                }
                PoolHeal::Formula(compiled)
            }
        };
        Ok(heal)
    }

    /// Change to apply, or None to leave the pool untouched
    fn delta(&self, pool: Pool, current: i32, max: i32, member: &Character) -> Option<i64> {
        let delta = match self {
            PoolHeal::None => return None,
            PoolHeal::Fixed(amount) => round_half_up(*amount),
            PoolHeal::PercentOfMissing(percent) => {
                let missing = f64::from(max) - f64::from(current);
                round_half_up(percent * missing / 100.0)
            }
            PoolHeal::PercentOfMax(percent) => round_half_up(percent * f64::from(max) / 100.0),
            PoolHeal::Formula(Ok(formula)) => match formula.evaluate(member) {
                Ok(value) => value.trunc() as i64,
                Err(e) => {
                    tracing::debug!(
                        member = member.name(),
                        %pool,
                        formula = formula.source(),
                        error = %e,
                        "recovery formula failed, restoring nothing"
                    );
                    0
                }
            },
            PoolHeal::Formula(Err(_)) => 0,
        };
        Some(delta)
    }
}

/// Restores party members after battle
#[derive(Debug, Clone)]
pub struct RecoveryRule {
    config: RecoveryConfig,
    hp: PoolHeal,
    mp: PoolHeal,
}

impl RecoveryRule {
    /// Build a rule from a config
    ///
    /// Fails only when an amount does not match its mode. Formulas that do
    /// not parse are kept and restore nothing.
    pub fn new(config: RecoveryConfig) -> Result<Self> {
        let hp = PoolHeal::compile(Pool::Hp, &config.hp)?;
        let mp = PoolHeal::compile(Pool::Mp, &config.mp)?;
        Ok(Self { config, hp, mp })
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Formulas that failed to compile, for diagnostics
    pub fn formula_errors(&self) -> Vec<(Pool, &FormulaError)> {
        [(Pool::Hp, &self.hp), (Pool::Mp, &self.mp)]
            .into_iter()
            .filter_map(|(pool, heal)| match heal {
                PoolHeal::Formula(Err(e)) => Some((pool, e)),
                _ => None,
            })
            .collect()
    }

    /// Apply recovery to one member
    pub fn apply(&self, member: &mut Character, party_won: bool) -> RecoveryReport {
        if self.config.only_on_win && !party_won {
            return RecoveryReport::untouched(RecoveryOutcome::NotTriggered);
        }

        let revived = self.config.remove_knockout && member.remove_status(Status::KnockedOut);

        if member.is_knocked_out() {
            return RecoveryReport::untouched(RecoveryOutcome::StillKnockedOut);
        }

        // HP first: an MP formula reading `hp` sees the healed value
        let hp = self.restore(Pool::Hp, member);
        let mp = self.restore(Pool::Mp, member);

        RecoveryReport {
            revived,
            outcome: RecoveryOutcome::Recovered { hp, mp },
        }
    }

    fn restore(&self, pool: Pool, member: &mut Character) -> i32 {
        let (heal, current, max) = match pool {
            Pool::Hp => (&self.hp, member.hp(), member.mhp()),
            Pool::Mp => (&self.mp, member.mp(), member.mmp()),
        };

        let Some(delta) = heal.delta(pool, current, max, member) else {
            return 0;
        };

        let target = i64::from(current)
            .saturating_add(delta)
            .clamp(pool.floor(), i64::from(max)) as i32;

        match pool {
            Pool::Hp => member.set_hp(target),
            Pool::Mp => member.set_mp(target),
        }
        target - current
    }
}

impl MemberBattleEndHook for RecoveryRule {
    fn name(&self) -> &str {
        "post_battle_recovery"
    }

    fn on_member_battle_end(&self, member: &mut Character, party_won: bool) {
        let report = self.apply(member, party_won);
        tracing::debug!(
            member = member.name(),
            revived = report.revived,
            outcome = ?report.outcome,
            hp = member.hp(),
            mp = member.mp(),
            "post-battle recovery"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battler::Params;
    use crate::core::config::{HealAmount, HealMode};
    use crate::core::error::RecoveryError;

    fn rule(hp: PoolConfig, mp: PoolConfig) -> RecoveryRule {
        RecoveryRule::new(RecoveryConfig {
            hp,
            mp,
            remove_knockout: true,
            only_on_win: true,
        })
        .unwrap()
    }

    fn hp_only(mode: HealMode, amount: impl Into<HealAmount>) -> RecoveryRule {
        rule(PoolConfig::new(mode, amount), PoolConfig::disabled())
    }

    fn mp_only(mode: HealMode, amount: impl Into<HealAmount>) -> RecoveryRule {
        rule(PoolConfig::disabled(), PoolConfig::new(mode, amount))
    }

    fn hurt(hp: i32) -> Character {
        Character::new("Eric", 100, 50).with_hp(hp).with_mp(10)
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(6.0), 6);
        assert_eq!(round_half_up(4.5), 5);
        assert_eq!(round_half_up(4.49), 4);
        assert_eq!(round_half_up(-4.5), -4);
        assert_eq!(round_half_up(f64::MAX), i64::MAX);
    }

    #[test]
    fn test_none_leaves_pool_untouched() {
        let r = hp_only(HealMode::None, 0.0);
        let mut c = hurt(40);
        let report = r.apply(&mut c, true);
        assert_eq!(report.outcome, RecoveryOutcome::Recovered { hp: 0, mp: 0 });
        assert_eq!(c.hp(), 40);
        assert_eq!(c.mp(), 10);
    }

    #[test]
    fn test_fixed() {
        let r = hp_only(HealMode::Fixed, 25.0);
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 65);
    }

    #[test]
    fn test_fixed_clamps_to_max() {
        let r = hp_only(HealMode::Fixed, 50.0);
        let mut c = hurt(95);
        let report = r.apply(&mut c, true);
        assert_eq!(c.hp(), 100);
        assert_eq!(report.outcome, RecoveryOutcome::Recovered { hp: 5, mp: 0 });
    }

    #[test]
    fn test_negative_fixed_floors_hp_at_one() {
        let r = hp_only(HealMode::Fixed, -500.0);
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 1);
        assert!(!c.is_knocked_out());
    }

    #[test]
    fn test_negative_fixed_floors_mp_at_zero() {
        let r = mp_only(HealMode::Fixed, -500.0);
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.mp(), 0);
    }

    #[test]
    fn test_percent_of_missing() {
        let r = hp_only(HealMode::PercentOfMissing, 10.0);
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 46);
    }

    #[test]
    fn test_percent_of_missing_rounds_half_up() {
        // 15% of 30 missing = 4.5 -> 5
        let r = hp_only(HealMode::PercentOfMissing, 15.0);
        let mut c = hurt(70);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 75);
    }

    #[test]
    fn test_percent_of_max() {
        let r = mp_only(HealMode::PercentOfMax, 20.0);
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.mp(), 20);
    }

    #[test]
    fn test_percent_of_max_rounds_half_up() {
        // 10% of 45 = 4.5 -> 5
        let r = mp_only(HealMode::PercentOfMax, 10.0);
        let mut c = Character::new("Natalie", 100, 45).with_mp(0);
        r.apply(&mut c, true);
        assert_eq!(c.mp(), 5);
    }

    #[test]
    fn test_formula_reads_stats() {
        let r = hp_only(HealMode::Formula, "me.luk * 2");
        let mut c = hurt(40).with_params(Params {
            luk: 12,
            ..Params::default()
        });
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 64);
    }

    #[test]
    fn test_formula_result_truncated() {
        // 100 / 3 = 33.33 -> 33
        let r = hp_only(HealMode::Formula, "mhp / 3");
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 73);
    }

    #[test]
    fn test_mp_formula_sees_healed_hp() {
        let r = rule(
            PoolConfig::new(HealMode::Fixed, 60.0),
            PoolConfig::new(HealMode::Formula, "if hp == mhp then 30 else 0"),
        );
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 100);
        assert_eq!(c.mp(), 40);
    }

    #[test]
    fn test_unparseable_formula_restores_nothing() {
        let r = rule(
            PoolConfig::new(HealMode::Formula, "me.luk *"),
            PoolConfig::new(HealMode::Fixed, 5.0),
        );
        assert_eq!(r.formula_errors().len(), 1);
        assert_eq!(r.formula_errors()[0].0, Pool::Hp);

        let mut c = hurt(40);
        let report = r.apply(&mut c, true);
        assert_eq!(report.outcome, RecoveryOutcome::Recovered { hp: 0, mp: 5 });
        assert_eq!(c.hp(), 40);
    }

    #[test]
    fn test_failing_formula_restores_nothing() {
        let r = hp_only(HealMode::Formula, "mhp / (mp - mp)");
        assert!(r.formula_errors().is_empty());
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 40);
    }

    #[test]
    fn test_only_on_win_blocks_other_outcomes() {
        let r = hp_only(HealMode::Fixed, 50.0);
        let mut c = hurt(40);
        let report = r.apply(&mut c, false);
        assert_eq!(report, RecoveryReport::untouched(RecoveryOutcome::NotTriggered));
        assert_eq!(c.hp(), 40);
    }

    #[test]
    fn test_any_outcome_when_not_win_only() {
        let r = RecoveryRule::new(RecoveryConfig {
            hp: PoolConfig::new(HealMode::Fixed, 50.0),
            only_on_win: false,
            ..RecoveryConfig::default()
        })
        .unwrap();
        let mut c = hurt(40);
        r.apply(&mut c, false);
        assert_eq!(c.hp(), 90);
    }

    #[test]
    fn test_knockout_removed_then_healed() {
        let r = hp_only(HealMode::PercentOfMax, 10.0);
        let mut c = Character::new("Natalie", 100, 20).with_status(Status::KnockedOut);
        let report = r.apply(&mut c, true);
        assert!(report.revived);
        // revived at 1, then +10
        assert_eq!(c.hp(), 11);
        assert!(!c.is_knocked_out());
    }

    #[test]
    fn test_knockout_kept_blocks_healing() {
        let r = RecoveryRule::new(RecoveryConfig {
            remove_knockout: false,
            ..RecoveryConfig::default()
        })
        .unwrap();
        let mut c = Character::new("Natalie", 100, 20)
            .with_mp(3)
            .with_status(Status::KnockedOut);
        let report = r.apply(&mut c, true);
        assert_eq!(
            report,
            RecoveryReport::untouched(RecoveryOutcome::StillKnockedOut)
        );
        assert_eq!(c.hp(), 0);
        assert_eq!(c.mp(), 3);
    }

    #[test]
    fn test_mismatched_amount_rejected() {
        let result = RecoveryRule::new(RecoveryConfig {
            hp: PoolConfig::new(HealMode::PercentOfMax, "mhp"),
            ..RecoveryConfig::default()
        });
        assert!(matches!(result, Err(RecoveryError::InvalidConfig(_))));

        let err = RecoveryRule::new(RecoveryConfig {
            mp: PoolConfig::new(HealMode::Formula, 40.0),
            ..RecoveryConfig::default()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: mp mode is formula but amount is a number"
        );
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let r = rule(
            PoolConfig::new(HealMode::Fixed, 1e300),
            PoolConfig::new(HealMode::Fixed, -1e300),
        );
        let mut c = hurt(40);
        r.apply(&mut c, true);
        assert_eq!(c.hp(), 100);
        assert_eq!(c.mp(), 0);
    }

    #[test]
    fn test_hook_applies_rule() {
        let r = hp_only(HealMode::Fixed, 10.0);
        assert_eq!(r.name(), "post_battle_recovery");
        let mut c = hurt(40);
        r.on_member_battle_end(&mut c, true);
        assert_eq!(c.hp(), 50);
    }
}
