//! Services layer - business operations and utilities.
//!
//! This module contains business logic and operations:
//! - Preference and portal account persistence
//! - Document/language resolution
//! - Content fetching and markdown rendering
//! - The verification portal client

pub mod account_store;
pub mod fetcher;
pub mod markdown;
pub mod portal;
pub mod preference_store;
pub mod resolver;
