/// Non-terminal rejection of a query; the pipeline simply does not proceed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationRejected {
    #[error("query shorter than {min} characters")]
    TooShort { min: usize },
    #[error("query must not contain spaces")]
    EmbeddedSpace,
}

/// Validation rules applied to a debounced query.
///
/// The empty string always passes: clearing the input is an explicit reset
/// path, distinct from a too-short query which blocks progress.
#[derive(Debug, Clone)]
pub struct QueryRules {
    pub min_len: usize,
    /// Disabled by default.
    pub reject_embedded_space: bool,
}

impl Default for QueryRules {
    fn default() -> Self {
        Self {
            min_len: 3,
            reject_embedded_space: false,
        }
    }
}

impl QueryRules {
    pub fn check(&self, query: &str) -> Result<(), ValidationRejected> {
        if query.is_empty() {
            return Ok(());
        }
        if query.chars().count() < self.min_len {
            return Err(ValidationRejected::TooShort { min: self.min_len });
        }
        if self.reject_embedded_space && query.contains(' ') {
            return Err(ValidationRejected::EmbeddedSpace);
        }
        Ok(())
    }
}
