// Role -> retrieval filter mapping

use crate::store::{MetadataFilter, ACCESS_LEVEL_KEY};

/// Role that sees the whole corpus
pub const PRIVILEGED_ROLE: &str = "c-level";

/// Maps a caller's role to the filter the document store enforces.
///
/// The privileged check ignores case; every other role is passed through
/// unchanged and matched literally against `access_level`. New roles need no
/// code change, only passages tagged with the same string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    privileged_role: String,
}

impl AccessPolicy {
    pub fn new(privileged_role: impl Into<String>) -> Self {
        Self {
            privileged_role: privileged_role.into(),
        }
    }

    /// `None` means the full corpus is visible
    pub fn filter_for(&self, role: &str) -> Option<MetadataFilter> {
        if self.is_privileged(role) {
            None
        } else {
            Some(MetadataFilter::eq(ACCESS_LEVEL_KEY, role))
        }
    }

    pub fn is_privileged(&self, role: &str) -> bool {
        role.to_lowercase() == self.privileged_role.to_lowercase()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(PRIVILEGED_ROLE)
    }
}
