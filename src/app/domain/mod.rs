//! Domain layer - core data structures and types.
//!
//! This module contains the fundamental domain models:
//! - The guide catalog (documents and their language variants)
//! - Guide preferences and theme modes
//! - Application config and launch parameters
//! - The signed-in portal account and its token
//! - Message types for the event system

pub mod account;
pub mod catalog;
pub mod config;
pub mod content;
pub mod launch;
pub mod messages;
pub mod preferences;

pub use account::{Account, LoginData, StoredToken};
pub use catalog::{Catalog, CatalogProblem, Document, Language, filter_languages};
pub use config::GuideConfig;
pub use content::{FetchTarget, FetchTicket};
pub use launch::LaunchRequest;
pub use messages::Message;
pub use preferences::{EffectiveTheme, PreferenceUpdate, Preferences, ThemeMode, resolve_effective_theme};
