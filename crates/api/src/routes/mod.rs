//! Route handlers

pub mod control;
pub mod frames;
pub mod settings;
pub mod snapshot;
