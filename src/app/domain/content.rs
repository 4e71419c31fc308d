/// A resolved language variant whose markdown should be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    pub document_id: String,
    pub language_id: String,
    pub location: String,
}

/// Identifies one fetch attempt. A result is only rendered if its ticket is
/// still the one the loader is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub document_id: String,
    pub language_id: String,
}

