//! Build dependency fetcher library
//!
//! Download-and-unpack helpers shared by the `brave-deps` and `download-goma` CLIs.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
