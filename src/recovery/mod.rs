pub mod rule;

pub use rule::{Pool, RecoveryOutcome, RecoveryReport, RecoveryRule};
