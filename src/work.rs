//! Resolved catalog metadata for a single archive.

use std::fmt;

use crate::catalog::LookupError;

/// Archive extension used for both catalogs.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Title and maker resolved for one content identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    pub title: String,
    pub maker: String,
}

impl Work {
    /// Create a new work. Catalog strings are kept as given.
    #[must_use]
    pub fn new(title: &str, maker: &str) -> Self {
        Self {
            title: title.to_string(),
            maker: maker.to_string(),
        }
    }

    /// Build the target file name: `[maker] title.zip`.
    ///
    /// Characters coming from the catalog are used verbatim.
    ///
    /// ```rust
    /// use work_rename::work::Work;
    ///
    /// let work = Work::new("Sample", "Studio");
    /// assert_eq!(work.file_name(), "[Studio] Sample.zip");
    /// ```
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("[{}] {}{ARCHIVE_EXTENSION}", self.maker, self.title)
    }

    /// Both title and maker must contain more than whitespace for the work to be used.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.title) && !is_blank(&self.maker)
    }

    /// Return the work if complete, otherwise an empty field error for the given identifier.
    ///
    /// # Errors
    /// Returns [`LookupError::EmptyField`] if the title or maker is empty.
    pub fn validated(self, content_id: &str) -> Result<Self, LookupError> {
        if is_blank(&self.title) {
            Err(LookupError::EmptyField {
                content_id: content_id.to_string(),
                field: "title",
            })
        } else if is_blank(&self.maker) {
            Err(LookupError::EmptyField {
                content_id: content_id.to_string(),
                field: "maker",
            })
        } else {
            Ok(self)
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl fmt::Display for Work {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.maker)
    }
}
