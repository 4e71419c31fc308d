use super::content::FetchTicket;
use super::preferences::ThemeMode;
use crate::app::infrastructure::error::FetchError;

/// All messages that can be sent through the FLTK channel.
/// Widget callbacks and fetch workers send these; the dispatch loop in main
/// hands them to `AppState::handle`.
#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    SidebarClicked,
    PreviousDocument,
    NextDocument,

    // Header
    LanguageChosen(i32),
    FilterLanguages,
    SetTheme(ThemeMode),
    ToggleSidebar,
    OpenPortal,

    // Content
    DismissNotice,
    RetryFetch,
    ContentLoaded(FetchTicket, Result<String, FetchError>),

    // Periodic re-check of the host color scheme
    AmbientTick,

    WindowClose,
}
