//! Controllers layer - orchestration and coordination.
//!
//! This module contains controllers that coordinate between
//! domain models, services, and the UI:
//! - Guide session (resolution state, notices, preferences)
//! - Content loading and stale-result filtering

pub mod content;
pub mod session;
