//! # Evodrive Runtime
//!
//! Generation lifecycle, persistence and a reference world.
//!
//! The runtime drives the evolutionary loop: it races a population on a
//! track, scores finishers, and breeds the next generation from the
//! agents an operator selects. Evolution history and the leaderboard are
//! saved after every change so a session can pick up where it left off.

pub mod config;
pub mod history;
pub mod leaderboard;
pub mod session;
pub mod metrics;
pub mod circuit;
pub mod manager;
pub mod prelude;
