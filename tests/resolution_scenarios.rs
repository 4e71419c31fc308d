use std::cell::Cell;

use guide_pad::app::controllers::session::GuideSession;
use guide_pad::app::domain::catalog::{Catalog, Document, Language};
use guide_pad::app::domain::launch::LaunchRequest;
use guide_pad::app::domain::preferences::{EffectiveTheme, ThemeMode};
use guide_pad::app::infrastructure::platform::AmbientTheme;
use guide_pad::app::services::preference_store::{MemoryBackend, PreferenceStore};
use guide_pad::app::services::resolver::{Notice, NoticeKind, ResolutionState};

struct FakeAmbient(Cell<bool>);

impl AmbientTheme for FakeAmbient {
    fn prefers_dark(&self) -> bool {
        self.0.get()
    }
}

fn document(id: &str, default: &str, langs: &[&str]) -> Document {
    Document {
        id: id.to_string(),
        name: id.to_string(),
        icon: None,
        default_language_id: default.to_string(),
        languages: langs
            .iter()
            .map(|lang| Language {
                id: lang.to_string(),
                name: lang.to_string(),
                location: format!("/docs/{}/{}.md", id, lang),
            })
            .collect(),
    }
}

fn setup_catalog() -> Catalog {
    Catalog::new(vec![document("setup", "en", &["en", "hi"])])
}

fn session(catalog: Catalog, stored: Option<&str>) -> GuideSession<MemoryBackend> {
    let backend = match stored {
        Some(raw) => MemoryBackend::with_contents(raw),
        None => MemoryBackend::default(),
    };
    GuideSession::new(catalog, PreferenceStore::new(backend))
}

#[test]
fn test_dark_preference_without_query() {
    let mut session = session(setup_catalog(), Some(r#"{"theme":"dark"}"#));
    let ambient = FakeAmbient(Cell::new(false));

    let target = session.start(None, None).expect("should fetch");
    assert_eq!((target.document_id.as_str(), target.language_id.as_str()), ("setup", "en"));
    assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Dark);
    assert!(session.notice().is_none());
}

#[test]
fn test_unknown_language_in_query_falls_back_to_default() {
    let request = LaunchRequest::from_query("?type=setup&lang=fr");
    let mut session = session(setup_catalog(), None);

    let target = session.start(request.document(), request.language()).unwrap();
    assert_eq!(target.language_id, "en");
    assert_eq!(session.notice(), Some(&Notice::language_missing()));
    assert!(session
        .resolution()
        .passed_through(|s| matches!(s, ResolutionState::LanguageMissing { .. })));
}

#[test]
fn test_unknown_document_in_query_falls_back_to_first() {
    let catalog = Catalog::new(vec![
        document("intro", "hi", &["en", "hi"]),
        document("setup", "en", &["en"]),
    ]);
    let request = LaunchRequest::from_query("?type=missing-doc");
    let mut session = session(catalog, None);

    let target = session.start(request.document(), request.language()).unwrap();
    assert_eq!(target.document_id, "intro");
    assert_eq!(target.language_id, "hi");

    let notice = session.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Document);
    assert!(!session
        .resolution()
        .passed_through(|s| matches!(s, ResolutionState::LanguageMissing { .. })));
}

#[test]
fn test_system_theme_follows_ambient_without_reload() {
    let mut session = session(setup_catalog(), Some(r#"{"theme":"light"}"#));
    let ambient = FakeAmbient(Cell::new(true));
    session.start(None, None);
    assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Light);

    session.set_theme(ThemeMode::System).unwrap();
    assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Dark);

    ambient.0.set(false);
    assert_eq!(session.effective_theme(&ambient), EffectiveTheme::Light);
}

#[test]
fn test_language_does_not_leak_across_documents() {
    let catalog = Catalog::new(vec![
        document("a", "en", &["en", "fr"]),
        document("b", "en", &["en", "de"]),
    ]);
    let mut session = session(catalog, None);

    session.start(Some("a"), None);
    session.select_language("fr");
    assert_eq!(session.current(), Some(("a", "fr")));

    let target = session.select_document("b").unwrap();
    assert_eq!(target.language_id, "en");
    assert_ne!(session.current(), Some(("b", "fr")));
    assert!(session.notice().is_none());

    // The remembered preference comes back on a document that has it
    let target = session.select_document("a").unwrap();
    assert_eq!(target.language_id, "fr");
}

#[test]
fn test_repeated_resolution_is_idempotent() {
    let mut session = session(setup_catalog(), None);
    session.start(Some("setup"), Some("hi"));
    let state = session.resolution().clone();

    assert!(session.select_language("hi").is_none());
    assert_eq!(session.resolution(), &state);

    session.start(Some("setup"), Some("fr"));
    session.dismiss_notice();
    session.start(Some("setup"), Some("fr"));
    assert!(session.notice().is_none());
}

#[test]
fn test_empty_catalog_stays_idle() {
    let mut session = session(Catalog::default(), None);
    assert!(session.start(Some("setup"), Some("en")).is_none());
    assert!(session.resolution().is_idle());
    assert!(session.current().is_none());
}
