// src/lib.rs

//! Vendor vs community contribution analysis for git repositories.
//!
//! Commit records are extracted from history in parallel ([`pool`], [`history`]), classified into vendor
//! categories ([`classifier`]), folded into per-category metrics ([`analyzer`]), optionally split into calendar
//! periods ([`timeline`]), and ranked for display ([`grouping`], [`renderer`]).

pub mod analyzer;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod grouping;
pub mod history;
pub mod model;
pub mod pool;
pub mod renderer;
pub mod timeline;

pub use error::{Error, Result};
