use url::form_urlencoded;

/// Document and language asked for at startup (`?type=...&lang=...`).
/// Only consulted once, for the first resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchRequest {
    pub document_id: Option<String>,
    pub language_id: Option<String>,
}

impl LaunchRequest {
    pub fn new(document_id: Option<String>, language_id: Option<String>) -> Self {
        Self {
            document_id: non_empty(document_id),
            language_id: non_empty(language_id),
        }
    }

    /// Parse a query string such as `?type=setup&lang=fr`. Empty values count
    /// as absent; the first occurrence of a key wins.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut request = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "type" => &mut request.document_id,
                "lang" => &mut request.language_id,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        request
    }

    /// Fill fields this request leaves empty from `fallback`.
    pub fn or(self, fallback: LaunchRequest) -> Self {
        Self {
            document_id: self.document_id.or(fallback.document_id),
            language_id: self.language_id.or(fallback.language_id),
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language_id.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
