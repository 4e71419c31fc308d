//! Application layer - organized by Clean Architecture principles.
//!
//! # Structure
//!
//! - `domain/` - Core data structures (Catalog, Preferences, Config, Messages)
//! - `controllers/` - Orchestration (GuideSession, ContentLoader)
//! - `services/` - Business operations (preference store, resolver, fetcher, portal)
//! - `infrastructure/` - External integrations (platform, error)
//! - `state.rs` - Main application coordinator

pub mod controllers;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod state;

// Re-exports for convenient external access
pub use controllers::content::{ContentLoader, ContentState};
pub use controllers::session::GuideSession;
pub use domain::{Catalog, GuideConfig, LaunchRequest, Message, Preferences, ThemeMode};
pub use infrastructure::error::{AppError, Result};
pub use infrastructure::platform::{AmbientTheme, SystemAmbient, detect_system_dark_mode};
pub use services::account_store::AccountStore;
pub use services::fetcher::{ContentFetcher, HttpFetcher};
pub use services::preference_store::{FileBackend, MemoryBackend, PreferenceStore, StorageBackend};
pub use services::resolver::{Notice, NoticeKind, Resolution, ResolutionState, resolve};
