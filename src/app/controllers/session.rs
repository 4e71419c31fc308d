//! Stateful resolution driven by user intents.
//!
//! `GuideSession` owns the catalog, the preference store and the current
//! [`Resolution`]. Every intent re-runs [`resolve`] and hands back the
//! target to fetch when the (document, language) pair changed.

use tracing::{debug, warn};

use crate::app::domain::catalog::{Catalog, Document, Language};
use crate::app::domain::content::FetchTarget;
use crate::app::domain::preferences::{
    EffectiveTheme, PreferenceUpdate, Preferences, ThemeMode, resolve_effective_theme,
};
use crate::app::infrastructure::error::AppError;
use crate::app::infrastructure::platform::AmbientTheme;
use crate::app::services::preference_store::{PreferenceStore, StorageBackend};
use crate::app::services::resolver::{Notice, NoticeKind, Resolution, resolve};

pub struct GuideSession<B: StorageBackend> {
    catalog: Catalog,
    store: PreferenceStore<B>,
    preferences: Preferences,
    resolution: Resolution,
    notice: Option<Notice>,
}

impl<B: StorageBackend> GuideSession<B> {
    pub fn new(catalog: Catalog, store: PreferenceStore<B>) -> Self {
        let preferences = store.load();
        Self {
            catalog,
            store,
            preferences,
            resolution: Resolution::default(),
            notice: None,
        }
    }

    /// Resolve the launch request. Returns what to fetch, if anything.
    pub fn start(&mut self, document: Option<&str>, language: Option<&str>) -> Option<FetchTarget> {
        let resolution = resolve(&self.catalog, document, language, &self.preferences);
        self.apply(resolution)
    }

    /// Switch document. The language choice resets; the preference still
    /// applies.
    pub fn select_document(&mut self, document_id: &str) -> Option<FetchTarget> {
        let resolution = resolve(&self.catalog, Some(document_id), None, &self.preferences);
        self.apply(resolution)
    }

    /// Switch language on the current document. A switch away from the
    /// document default is remembered as the preferred language.
    pub fn select_language(&mut self, language_id: &str) -> Option<FetchTarget> {
        let document_id = self.resolution.document_id.clone();
        let resolution = resolve(
            &self.catalog,
            document_id.as_deref(),
            Some(language_id),
            &self.preferences,
        );

        let lands_off_default = resolution.target().is_some_and(|(doc, lang)| {
            lang == language_id
                && self
                    .catalog
                    .get_document(doc)
                    .is_some_and(|d| d.default_language_id != language_id)
        });
        if lands_off_default && self.preferences.language_id.as_deref() != Some(language_id) {
            self.persist(PreferenceUpdate::language(language_id));
        }

        self.apply(resolution)
    }

    /// Store a new theme mode. The in-memory value changes even when the
    /// write fails.
    pub fn set_theme(&mut self, mode: ThemeMode) -> Result<(), AppError> {
        let update = PreferenceUpdate::theme(mode);
        self.preferences.apply(update.clone());
        self.preferences = self.store.save(update)?;
        Ok(())
    }

    pub fn effective_theme(&self, ambient: &dyn AmbientTheme) -> EffectiveTheme {
        resolve_effective_theme(self.preferences.theme, ambient)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The settled (document, language) pair.
    pub fn current(&self) -> Option<(&str, &str)> {
        self.resolution.target()
    }

    pub fn current_document(&self) -> Option<&Document> {
        self.resolution
            .document_id
            .as_deref()
            .and_then(|id| self.catalog.get_document(id))
    }

    pub fn current_language(&self) -> Option<&Language> {
        let (doc, lang) = self.current()?;
        self.catalog.get_document(doc)?.language(lang)
    }

    /// What the current resolution points at; used for retry as well.
    pub fn current_target(&self) -> Option<FetchTarget> {
        let (document_id, language_id) = self.current()?;
        let language = self.current_language()?;
        Some(FetchTarget {
            document_id: document_id.to_string(),
            language_id: language_id.to_string(),
            location: language.location.clone(),
        })
    }

    /// Previous and next documents in catalog order.
    pub fn neighbours(&self) -> (Option<&Document>, Option<&Document>) {
        match self.resolution.document_id.as_deref() {
            Some(id) => self.catalog.neighbours(id),
            None => (None, None),
        }
    }

    fn persist(&mut self, update: PreferenceUpdate) {
        self.preferences.apply(update.clone());
        match self.store.save(update) {
            Ok(saved) => self.preferences = saved,
            Err(e) => warn!("Failed to save guide preferences: {}", e),
        }
    }

    fn apply(&mut self, resolution: Resolution) -> Option<FetchTarget> {
        if resolution == self.resolution {
            debug!("resolution unchanged");
            return None;
        }

        let changed_target = resolution.target() != self.resolution.target();
        self.raise_notice(resolution.notice.clone());
        self.resolution = resolution;

        if changed_target {
            self.current_target()
        } else {
            None
        }
    }

    fn raise_notice(&mut self, notice: Option<Notice>) {
        let showing_document_notice = self
            .notice
            .as_ref()
            .is_some_and(|n| n.kind == NoticeKind::Document);

        match notice {
            Some(notice) if notice.kind == NoticeKind::Document => self.notice = Some(notice),
            Some(notice) => {
                if !showing_document_notice {
                    self.notice = Some(notice);
                }
            }
            None => {
                if !showing_document_notice {
                    self.notice = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::preference_store::MemoryBackend;
    use crate::app::services::resolver::ResolutionState;

    fn session_with(prefs: Option<&str>) -> GuideSession<MemoryBackend> {
        let backend = match prefs {
            Some(raw) => MemoryBackend::with_contents(raw),
            None => MemoryBackend::default(),
        };
        GuideSession::new(Catalog::bundled().unwrap(), PreferenceStore::new(backend))
    }

    #[test]
    fn test_start_returns_fetch_target() {
        let mut session = session_with(None);
        let target = session.start(None, None).unwrap();
        assert_eq!(target.document_id, "setup");
        assert_eq!(target.language_id, "en");
        assert_eq!(target.location, "/guide/docs/setup/en.md");
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_repeat_is_idempotent() {
        let mut session = session_with(None);
        assert!(session.start(Some("setup"), Some("fr")).is_some());
        assert!(session.notice().is_some());
        session.dismiss_notice();

        let before = session.resolution().clone();
        assert!(session.select_language("fr").is_none());
        assert_eq!(session.resolution(), &before);
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_select_language_persists_non_default() {
        let mut session = session_with(None);
        session.start(Some("setup"), None);

        let target = session.select_language("hi").unwrap();
        assert_eq!(target.language_id, "hi");
        assert_eq!(session.preferences().language_id.as_deref(), Some("hi"));
        assert_eq!(
            session.store.backend().contents().as_deref(),
            Some(r#"{"lang":"hi","theme":"system"}"#)
        );

        session.select_language("en");
        assert_eq!(session.preferences().language_id.as_deref(), Some("hi"));
    }

    #[test]
    fn test_document_switch_drops_unavailable_language() {
        let mut session = session_with(Some(r#"{"lang":"es"}"#));
        session.start(Some("verification"), None);
        assert_eq!(session.current(), Some(("verification", "es")));

        let target = session.select_document("setup").unwrap();
        assert_eq!(target.language_id, "en");
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_document_notice_survives_language_notice() {
        let mut session = session_with(None);
        session.start(Some("missing-doc"), None);
        assert_eq!(session.notice(), Some(&Notice::document_missing()));

        session.select_language("zz");
        assert_eq!(session.notice(), Some(&Notice::document_missing()));

        session.dismiss_notice();
        session.select_language("xx");
        assert_eq!(session.notice(), Some(&Notice::language_missing()));
    }

    #[test]
    fn test_set_theme_and_effective_theme() {
        use std::cell::Cell;

        struct Ambient(Cell<bool>);
        impl AmbientTheme for Ambient {
            fn prefers_dark(&self) -> bool {
                self.0.get()
            }
        }

        let mut session = session_with(None);
        let ambient = Ambient(Cell::new(true));
        assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Dark);

        session.set_theme(ThemeMode::Light).unwrap();
        assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Light);

        session.set_theme(ThemeMode::System).unwrap();
        ambient.0.set(false);
        assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Light);
    }

    #[test]
    fn test_neighbours_follow_current_document() {
        let mut session = session_with(None);
        assert_eq!(session.neighbours(), (None, None));

        session.start(Some("verification"), None);
        let (prev, next) = session.neighbours();
        assert_eq!(prev.map(|d| d.id.as_str()), Some("setup"));
        assert_eq!(next.map(|d| d.id.as_str()), Some("youtube-link"));
    }

    #[test]
    fn test_empty_catalog_has_no_target() {
        let mut session = GuideSession::new(
            Catalog::default(),
            PreferenceStore::new(MemoryBackend::default()),
        );
        assert!(session.start(None, None).is_none());
        assert!(matches!(session.resolution().state(), ResolutionState::Idle));
        assert!(session.current_target().is_none());
    }
}
