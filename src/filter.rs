use std::path::Path;

/// Restricts a watch session to one file extension.
///
/// An empty filter watches everything. Input is accepted with or without the
/// leading dot and compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ExtensionFilter {
    extension: Option<String>,
}

impl ExtensionFilter {
    pub fn new(extension: &str) -> Self {
        let normalized = extension.trim().trim_start_matches('.');
        Self {
            extension: if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_ascii_lowercase())
            },
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, path: &Path) -> bool {
        match &self.extension {
            None => true,
            Some(wanted) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(wanted))
                .unwrap_or(false),
        }
    }
}
