use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::app::infrastructure::error::CatalogError;

/// Catalog compiled into the binary, used unless a catalog path is configured.
const BUNDLED_CATALOG: &str = include_str!("../../../assets/docs.json");

/// One translated rendering of a guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: String,
    pub name: String,
    /// URL or host-relative path of the markdown source.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(rename = "defaultlang")]
    pub default_language_id: String,

    #[serde(rename = "lang", default)]
    pub languages: Vec<Language>,
}

impl Document {
    pub fn language(&self, id: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    pub fn has_language(&self, id: &str) -> bool {
        self.language(id).is_some()
    }

    /// The declared default language, or the first listed one when
    /// `defaultlang` names a language the document does not carry.
    pub fn default_language(&self) -> Option<&Language> {
        self.language(&self.default_language_id)
            .or_else(|| self.languages.first())
    }
}

/// Inconsistencies found by [`Catalog::validate`]. None of them stop the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogProblem {
    DuplicateDocument(String),
    DuplicateLanguage { document: String, language: String },
    MissingDefaultLanguage { document: String, language: String },
    NoLanguages(String),
}

impl fmt::Display for CatalogProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDocument(id) => write!(f, "document id '{}' appears more than once", id),
            Self::DuplicateLanguage { document, language } => {
                write!(f, "document '{}' lists language '{}' more than once", document, language)
            }
            Self::MissingDefaultLanguage { document, language } => write!(
                f,
                "document '{}' defaults to '{}', which is not one of its languages",
                document, language
            ),
            Self::NoLanguages(id) => write!(f, "document '{}' has no languages", id),
        }
    }
}

/// Read-only, ordered list of guides. Order defines sidebar and
/// previous/next navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    documents: Vec<Document>,
}

impl Catalog {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Parse the catalog bundled with the application.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        Ok(Self { documents })
    }

    /// Load a catalog file supplied at runtime.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn list_documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn first(&self) -> Option<&Document> {
        self.documents.first()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    /// Previous and next documents around `id`, in catalog order.
    pub fn neighbours(&self, id: &str) -> (Option<&Document>, Option<&Document>) {
        match self.position(id) {
            Some(idx) => {
                let prev = idx.checked_sub(1).and_then(|i| self.documents.get(i));
                let next = self.documents.get(idx + 1);
                (prev, next)
            }
            None => (None, None),
        }
    }

    pub fn validate(&self) -> Vec<CatalogProblem> {
        let mut problems = Vec::new();
        let mut seen_docs = HashSet::new();

        for doc in &self.documents {
            if !seen_docs.insert(doc.id.as_str()) {
                problems.push(CatalogProblem::DuplicateDocument(doc.id.clone()));
            }

            if doc.languages.is_empty() {
                problems.push(CatalogProblem::NoLanguages(doc.id.clone()));
                continue;
            }

            let mut seen_langs = HashSet::new();
            for lang in &doc.languages {
                if !seen_langs.insert(lang.id.as_str()) {
                    problems.push(CatalogProblem::DuplicateLanguage {
                        document: doc.id.clone(),
                        language: lang.id.clone(),
                    });
                }
            }

            if !doc.has_language(&doc.default_language_id) {
                problems.push(CatalogProblem::MissingDefaultLanguage {
                    document: doc.id.clone(),
                    language: doc.default_language_id.clone(),
                });
            }
        }

        problems
    }
}

/// Languages whose name or id contains `query`, ignoring case.
/// An empty query keeps everything.
pub fn filter_languages<'a>(languages: &'a [Language], query: &str) -> Vec<&'a Language> {
    let needle = query.trim().to_lowercase();
    languages
        .iter()
        .filter(|l| {
            needle.is_empty()
                || l.name.to_lowercase().contains(&needle)
                || l.id.to_lowercase().contains(&needle)
        })
        .collect()
}
