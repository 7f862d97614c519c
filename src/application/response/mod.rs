//! Command outcomes and the time-boxed replies they produce
//!
//! A handler raises an [`Outcome`]; the dispatcher hands it to the
//! [`ResponseClassifier`], which picks a colour from the [`Palette`], sends the
//! reply and withdraws it after the configured delay.

pub mod classifier;
pub mod outcome;
pub mod palette;

pub use classifier::{ExpiryHandle, ResponseClassifier, DEFAULT_EXPIRY};
pub use outcome::{Outcome, OutcomeKind, Severity};
pub use palette::{Colour, Palette};
