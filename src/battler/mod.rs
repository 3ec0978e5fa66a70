//! Battlers: party members and the roster that owns them

pub mod character;
pub mod party;
pub mod status;

pub use character::{Character, Params};
pub use party::Party;
pub use status::Status;
