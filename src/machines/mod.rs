//! Example machines built on the engine.
//!
//! - [`motor`]: basic state table, typed payloads
//! - [`centrifuge`]: extended table with guard, entry and exit actions

pub mod centrifuge;
pub mod motor;
