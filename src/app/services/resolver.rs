//! Turns (requested document, requested language, stored preference) into
//! the concrete document and language to show.
//!
//! [`resolve`] is pure: it is re-run whenever one of its inputs changes and
//! carries no state between calls. The stateful side (which notice is on
//! screen, what is being fetched) lives in `controllers::session`.

use tracing::debug;

use crate::app::domain::catalog::{Catalog, Document};
use crate::app::domain::preferences::Preferences;

pub const DOCUMENT_MISSING_MESSAGE: &str = "Document not available";
pub const LANGUAGE_MISSING_MESSAGE: &str = "Language not available for this guide";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Document,
    Language,
}

/// A dismissable fallback notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: &'static str,
}

impl Notice {
    pub fn document_missing() -> Self {
        Self {
            kind: NoticeKind::Document,
            message: DOCUMENT_MISSING_MESSAGE,
        }
    }

    pub fn language_missing() -> Self {
        Self {
            kind: NoticeKind::Language,
            message: LANGUAGE_MISSING_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Idle,
    Resolving,
    Resolved {
        document_id: String,
        language_id: String,
    },
    DocumentMissing {
        requested: String,
    },
    LanguageMissing {
        document_id: String,
        requested: Option<String>,
    },
}

/// Outcome of one [`resolve`] call.
///
/// `transitions` records every state passed through, the last one being the
/// settled state. A document with no languages settles on `LanguageMissing`
/// with `language_id` unset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub document_id: Option<String>,
    pub language_id: Option<String>,
    pub notice: Option<Notice>,
    pub transitions: Vec<ResolutionState>,
}

impl Resolution {
    pub fn state(&self) -> &ResolutionState {
        self.transitions.last().unwrap_or(&ResolutionState::Idle)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state(), ResolutionState::Idle)
    }

    pub fn passed_through(&self, predicate: impl Fn(&ResolutionState) -> bool) -> bool {
        self.transitions.iter().any(predicate)
    }

    /// The settled (document, language) pair, if any.
    pub fn target(&self) -> Option<(&str, &str)> {
        match self.state() {
            ResolutionState::Resolved {
                document_id,
                language_id,
            } => Some((document_id.as_str(), language_id.as_str())),
            _ => None,
        }
    }
}

pub fn resolve(
    catalog: &Catalog,
    requested_document: Option<&str>,
    requested_language: Option<&str>,
    preferences: &Preferences,
) -> Resolution {
    let mut transitions = vec![ResolutionState::Resolving];
    let mut notice = None;

    let document = match requested_document {
        Some(id) => match catalog.get_document(id) {
            Some(doc) => Some(doc),
            None => {
                debug!(requested = id, "document not in catalog, falling back to first");
                transitions.push(ResolutionState::DocumentMissing {
                    requested: id.to_string(),
                });
                notice = Some(Notice::document_missing());
                catalog.first()
            }
        },
        None => catalog.first(),
    };

    let Some(document) = document else {
        transitions.push(ResolutionState::Idle);
        return Resolution {
            document_id: None,
            language_id: None,
            notice,
            transitions,
        };
    };

    let language_id = settle_language(
        document,
        requested_language,
        preferences.language_id.as_deref(),
        &mut transitions,
    );

    match &language_id {
        Some(language_id) => transitions.push(ResolutionState::Resolved {
            document_id: document.id.clone(),
            language_id: language_id.clone(),
        }),
        None => {
            if !matches!(transitions.last(), Some(ResolutionState::LanguageMissing { .. })) {
                transitions.push(ResolutionState::LanguageMissing {
                    document_id: document.id.clone(),
                    requested: requested_language.map(str::to_string),
                });
            }
        }
    }

    let language_missing = transitions
        .iter()
        .any(|s| matches!(s, ResolutionState::LanguageMissing { .. }));
    if language_missing && notice.is_none() {
        notice = Some(Notice::language_missing());
    }

    debug!(
        document = %document.id,
        language = ?language_id,
        notice = ?notice.as_ref().map(|n| n.kind),
        "resolved guide"
    );

    Resolution {
        document_id: Some(document.id.clone()),
        language_id,
        notice,
        transitions,
    }
}

/// Requested language, then preferred language, then the document default.
fn settle_language(
    document: &Document,
    requested: Option<&str>,
    preferred: Option<&str>,
    transitions: &mut Vec<ResolutionState>,
) -> Option<String> {
    let chosen = requested
        .and_then(|id| document.language(id))
        .or_else(|| preferred.and_then(|id| document.language(id)));

    if let Some(language) = chosen {
        return Some(language.id.clone());
    }

    // An unmatched stored preference on its own falls through silently; an
    // explicit request that nothing satisfies is surfaced.
    if requested.is_some() {
        transitions.push(ResolutionState::LanguageMissing {
            document_id: document.id.clone(),
            requested: requested.map(str::to_string),
        });
    }

    document.default_language().map(|l| l.id.clone())
}
