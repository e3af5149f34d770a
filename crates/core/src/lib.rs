#![forbid(unsafe_code)]

//! Domain layer for quiz sessions: items, outcomes, settings, and the pure
//! building blocks (normaliser, hints, navigation, ledger) the session
//! controller is assembled from.

pub mod error;
pub mod hint;
pub mod ledger;
pub mod matcher;
pub mod model;
pub mod navigator;
pub mod normalize;
pub mod render;
pub mod time;

pub use error::Error;
pub use time::Clock;
