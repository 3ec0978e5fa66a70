//! Battle Recovery - command line driver
//!
//! Loads a recovery config and a party file, ends one battle with the given
//! result, and prints the party afterwards.

use std::fs;
use std::path::PathBuf;

use battle_recovery::battle::{BattleEndDispatcher, BattleResult};
use battle_recovery::battler::{Character, Party};
use battle_recovery::core::{RecoveryConfig, Result};
use battle_recovery::recovery::RecoveryRule;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Apply post-battle recovery to a party
#[derive(Parser, Debug)]
#[command(name = "battle-recovery")]
#[command(about = "End a battle and apply post-battle HP/MP recovery to a party file")]
struct Args {
    /// Recovery config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Party roster (JSON)
    #[arg(long)]
    party: PathBuf,

    /// How the battle ended
    #[arg(long, value_enum, default_value_t = ResultArg::Win)]
    result: ResultArg,

    /// Print the party as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResultArg {
    Win,
    Escape,
    Abort,
    Defeat,
}

impl From<ResultArg> for BattleResult {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::Win => BattleResult::Win,
            ResultArg::Escape => BattleResult::Escape,
            ResultArg::Abort => BattleResult::Abort,
            ResultArg::Defeat => BattleResult::Defeat,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("battle_recovery=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecoveryConfig::load(path)?,
        None => RecoveryConfig::default(),
    };
    let rule = RecoveryRule::new(config)?;
    for (pool, error) in rule.formula_errors() {
        tracing::warn!(%pool, %error, "formula does not compile; it will restore nothing");
    }

    let content = fs::read_to_string(&args.party)?;
    let mut party: Party = serde_json::from_str(&content)?;
    tracing::info!("Loaded {} party members", party.len());

    let mut dispatcher = BattleEndDispatcher::new();
    dispatcher.register(rule);
    dispatcher.battle_end(&mut party, args.result.into());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&party)?);
    } else {
        for member in party.members() {
            println!("{}", format_member(member));
        }
    }

    Ok(())
}

fn format_member(member: &Character) -> String {
    let statuses: Vec<String> = member
        .statuses()
        .map(|status| format!("{:?}", status))
        .collect();
    format!(
        "{:<12} HP {:>5}/{:<5} MP {:>5}/{:<5} {}",
        member.name(),
        member.hp(),
        member.mhp(),
        member.mp(),
        member.mmp(),
        statuses.join(", ")
    )
}
