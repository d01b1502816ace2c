//! Find every directory with a given name under a root, report how much
//! space each one takes, and delete them once confirmed.

pub mod cleaner;
pub mod error;
pub mod prompt;
pub mod scanner;
pub mod sweep;

pub use cleaner::{ReclamationResult, SizedMatch, format_size};
pub use error::SweepError;
pub use sweep::{DEFAULT_TARGET, Interaction, Outcome, Plan, SweepConfig};
