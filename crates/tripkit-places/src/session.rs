use uuid::Uuid;

/// Groups one autocomplete-then-resolve interaction for provider billing.
///
/// A token lives from the first keystroke of a search until a selection is
/// resolved; the search controller then regenerates it so the next search
/// bills as its own session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}
