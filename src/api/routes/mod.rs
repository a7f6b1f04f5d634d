//! API Routes
//!
//! Route handlers organized by functionality.

pub mod clear;
pub mod export;
pub mod filter;
pub mod health;
pub mod latest;
pub mod stats;
