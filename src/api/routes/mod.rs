//! API Routes
//!
//! Route handlers organized by functionality.

pub mod accounts;
pub mod health;
pub mod reports;
