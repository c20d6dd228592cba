//! Errors reported when loading fonts.

use opentype::{types::Tag, ReadError};

/// An error that prevented a font from being loaded.
///
/// Only failures in the file structure and in the tables every font must
/// carry (`head`, `maxp` and `cmap`) are reported here. Problems with optional
/// tables are logged and the table is treated as absent.
#[derive(Clone, Debug, thiserror::Error)]
pub enum LoadError {
    /// The data is neither a font nor a font collection.
    #[error("invalid font file: {0}")]
    File(#[source] ReadError),
    /// A member of a collection could not be located.
    #[error("font {index} of the collection: {source}")]
    Member {
        index: u32,
        #[source]
        source: ReadError,
    },
    /// A required table is missing or malformed.
    #[error("{}the {tag} table could not be read: {source}", describe_index(.index))]
    Table {
        tag: Tag,
        /// Position of the font in its collection.
        index: Option<u32>,
        #[source]
        source: ReadError,
    },
}

impl LoadError {
    pub(crate) fn table(tag: Tag, index: Option<u32>, source: ReadError) -> Self {
        Self::Table { tag, index, source }
    }

    /// Returns the position of the failing font within its collection.
    pub fn collection_index(&self) -> Option<u32> {
        match self {
            Self::File(_) => None,
            Self::Member { index, .. } => Some(*index),
            Self::Table { index, .. } => *index,
        }
    }

    /// Returns the tag of the table that failed to load.
    pub fn table_tag(&self) -> Option<Tag> {
        match self {
            Self::Table { tag, .. } => Some(*tag),
            _ => None,
        }
    }

    /// Returns the underlying parsing error.
    pub fn read_error(&self) -> &ReadError {
        match self {
            Self::File(source) | Self::Member { source, .. } | Self::Table { source, .. } => {
                source
            }
        }
    }
}

fn describe_index(index: &Option<u32>) -> String {
    index
        .map(|index| format!("font {index} of the collection: "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = LoadError::table(Tag::new(b"maxp"), Some(2), ReadError::OutOfBounds);
        assert_eq!(
            err.to_string(),
            "font 2 of the collection: the maxp table could not be read: An offset was out of bounds"
        );
        assert_eq!(err.collection_index(), Some(2));
        assert_eq!(err.table_tag(), Some(Tag::new(b"maxp")));
        let err = LoadError::table(
            Tag::new(b"head"),
            None,
            ReadError::TableIsMissing(Tag::new(b"head")),
        );
        assert_eq!(
            err.to_string(),
            "the head table could not be read: the head table is missing"
        );
        assert_eq!(err.read_error(), &ReadError::TableIsMissing(Tag::new(b"head")));
    }
}
