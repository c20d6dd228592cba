//! Reading OpenType, TrueType and AAT font files
//!
//! This crate provides memory safe parsing of font files. Every table is a
//! thin view over borrowed bytes: fields are decoded on access, offsets are
//! validated against the target read size before they are followed, and
//! arrays of fixed size records alias the font data rather than copying it.
//!
//! Malformed input never panics. Structural problems are reported as a
//! [`ReadError`]; lookups of glyphs or code points that are simply absent
//! return `None`.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use opentype::{FontRef, TableProvider};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! // Single fonts only. for font collections (.ttc) use FontRef::from_index
//! let font = FontRef::new(&font_bytes).expect("failed to read font data");
//! let head = font.head().expect("missing 'head' table");
//! let maxp = font.maxp().expect("missing 'maxp' table");
//!
//! println!("{} units per em, {} glyphs", head.units_per_em(), maxp.num_glyphs());
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod array;
mod font_data;
mod read;
mod table_provider;
pub mod tables;

pub use array::{Array, FixedRecord, RecordArray};
pub use font_data::{Cursor, FontData};
pub use read::{FontRead, FontReadWithArgs, ReadArgs, ReadError};
pub use table_provider::TableProvider;

/// Public re-export of the font-types crate.
pub extern crate font_types as types;

use types::{Tag, CFF_SFNT_VERSION, TRUE_SFNT_VERSION, TTC_HEADER_TAG, TT_SFNT_VERSION};

record! {
    /// A record in the table directory.
    pub struct TableRecord {
        /// Table identifier.
        pub tag: Tag,
        /// Checksum for the table.
        pub checksum: u32,
        /// Offset from the beginning of the font data.
        pub offset: u32,
        /// Length of the table.
        pub length: u32,
    }
}

/// The OpenType [table directory](https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory).
#[derive(Clone, Debug)]
pub struct TableDirectory<'a> {
    sfnt_version: u32,
    table_records: RecordArray<'a, TableRecord>,
}

impl<'a> TableDirectory<'a> {
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    pub fn num_tables(&self) -> u16 {
        self.table_records.len() as u16
    }

    pub fn table_records(&self) -> RecordArray<'a, TableRecord> {
        self.table_records
    }

    fn is_sorted(&self) -> bool {
        let mut last_tag = Tag::new(&[0u8; 4]);

        for tag in self.table_records.iter().map(|rec| rec.tag) {
            if tag <= last_tag {
                return false;
            }

            last_tag = tag;
        }

        true
    }
}

impl<'a> FontRead<'a> for TableDirectory<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(12)?;
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        cursor.advance_by(6);
        let table_records = cursor.read_records(num_tables as usize)?;
        Ok(TableDirectory {
            sfnt_version,
            table_records,
        })
    }
}

/// The header of a font collection file.
#[derive(Clone, Debug)]
struct TtcHeader<'a> {
    ttc_tag: Tag,
    table_directory_offsets: Array<'a, u32>,
}

impl<'a> FontRead<'a> for TtcHeader<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        data.check_len(12)?;
        let mut cursor = data.cursor();
        let ttc_tag: Tag = cursor.read()?;
        // major and minor version; version 2 adds DSIG fields we ignore
        cursor.advance_by(4);
        let num_fonts: u32 = cursor.read()?;
        let table_directory_offsets = cursor.read_array(num_fonts as usize)?;
        Ok(TtcHeader {
            ttc_tag,
            table_directory_offsets,
        })
    }
}

#[derive(Clone)]
/// Reference to the content of a font or font collection file.
pub enum FileRef<'a> {
    /// A single font.
    Font(FontRef<'a>),
    /// A collection of fonts.
    Collection(CollectionRef<'a>),
}

impl<'a> FileRef<'a> {
    /// Creates a new reference to a file representing a font or font collection.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        Ok(if let Ok(collection) = CollectionRef::new(data) {
            Self::Collection(collection)
        } else {
            Self::Font(FontRef::new(data)?)
        })
    }

    /// Returns an iterator over the fonts contained in the file.
    pub fn fonts(&self) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let (iter_one, iter_two) = match self {
            Self::Font(font) => (Some(Ok(font.clone())), None),
            Self::Collection(collection) => (None, Some(collection.iter())),
        };
        iter_two.into_iter().flatten().chain(iter_one)
    }
}

/// Reference to the content of a font collection file.
#[derive(Clone)]
pub struct CollectionRef<'a> {
    data: FontData<'a>,
    header: TtcHeader<'a>,
}

impl<'a> CollectionRef<'a> {
    /// Creates a new reference to a font collection.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        let header = TtcHeader::read(data)?;
        if header.ttc_tag != TTC_HEADER_TAG {
            Err(ReadError::InvalidTtc(header.ttc_tag))
        } else {
            Ok(Self { data, header })
        }
    }

    /// Returns the number of fonts in the collection.
    pub fn len(&self) -> u32 {
        self.header.table_directory_offsets.len() as u32
    }

    /// Returns true if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the font in the collection at the specified index.
    pub fn get(&self, index: u32) -> Result<FontRef<'a>, ReadError> {
        let offset = self
            .header
            .table_directory_offsets
            .get(index as usize)
            .ok_or(ReadError::InvalidCollectionIndex(index))? as usize;
        let table_dir_data = self.data.split_off(offset).ok_or(ReadError::OutOfBounds)?;
        FontRef::with_table_directory(
            self.data,
            TableDirectory::read(table_dir_data)?,
            Some(index),
        )
    }

    /// Returns an iterator over the fonts in the collection.
    pub fn iter(&self) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let copy = self.clone();
        (0..self.len()).map(move |ix| copy.get(ix))
    }
}

/// Reference to an in-memory font.
///
/// This is a simple implementation of the [`TableProvider`] trait backed
/// by a borrowed slice containing font data.
#[derive(Clone)]
pub struct FontRef<'a> {
    data: FontData<'a>,
    table_directory: TableDirectory<'a>,
    /// The index of this font in a TrueType collection
    ttc_index: Option<u32>,
    // Whether the table directory is sorted and thus we can use binary search for
    // finding table records. In principle, fonts are required to have a sorted
    // table directory, but certain fonts don't seem to follow that requirement.
    table_directory_sorted: bool,
}

impl<'a> FontRef<'a> {
    /// Creates a new reference to an in-memory font backed by the given data.
    ///
    /// The data must be a single font (not a font collection) and must begin with a
    /// table directory to be considered valid.
    ///
    /// To load a font from a font collection, use [`FontRef::from_index`] instead.
    pub fn new(data: &'a [u8]) -> Result<Self, ReadError> {
        let data = FontData::new(data);
        Self::with_table_directory(data, TableDirectory::read(data)?, None)
    }

    /// Creates a new reference to an in-memory font at the specified index
    /// backed by the given data.
    ///
    /// This accepts either font collection (ttc) or single font (ttf/otf)
    /// files. If a single font file is provided, the index parameter must
    /// be 0.
    pub fn from_index(data: &'a [u8], index: u32) -> Result<Self, ReadError> {
        let file = FileRef::new(data)?;
        match file {
            FileRef::Font(font) => {
                if index == 0 {
                    Ok(font)
                } else {
                    Err(ReadError::InvalidCollectionIndex(index))
                }
            }
            FileRef::Collection(collection) => collection.get(index),
        }
    }

    /// Returns the underlying font data.
    ///
    /// This is the base from which tables are loaded, meaning that for
    /// TrueType collection files, this will be the entire font file data.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    /// If the font is in a TrueType collection (ttc) file, returns the index
    /// of the font in that collection.
    pub fn ttc_index(&self) -> Option<u32> {
        self.ttc_index
    }

    /// Returns the associated table directory.
    pub fn table_directory(&self) -> &TableDirectory<'a> {
        &self.table_directory
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data(&self, tag: Tag) -> Option<FontData<'a>> {
        let records = self.table_directory.table_records();
        let entry = if self.table_directory_sorted {
            records.binary_search_by(|rec| rec.tag.cmp(&tag)).ok()
        } else {
            records.iter().position(|rec| rec.tag == tag)
        };

        entry.and_then(|idx| records.get(idx)).and_then(|record| {
            let start = record.offset as usize;
            let len = record.length as usize;
            if start == 0 {
                return None;
            }
            self.data.slice(start..start.checked_add(len)?)
        })
    }

    /// Returns an iterator over all of the available fonts in
    /// the given font data.
    pub fn fonts(
        data: &'a [u8],
    ) -> impl Iterator<Item = Result<FontRef<'a>, ReadError>> + 'a + Clone {
        let count = match FileRef::new(data) {
            Ok(FileRef::Font(_)) => 1,
            Ok(FileRef::Collection(ttc)) => ttc.len(),
            _ => 0,
        };
        (0..count).map(move |idx| FontRef::from_index(data, idx))
    }

    fn with_table_directory(
        data: FontData<'a>,
        table_directory: TableDirectory<'a>,
        ttc_index: Option<u32>,
    ) -> Result<Self, ReadError> {
        if [TT_SFNT_VERSION, CFF_SFNT_VERSION, TRUE_SFNT_VERSION]
            .contains(&table_directory.sfnt_version())
        {
            let table_directory_sorted = table_directory.is_sorted();

            Ok(FontRef {
                data,
                table_directory,
                ttc_index,
                table_directory_sorted,
            })
        } else {
            Err(ReadError::InvalidSfnt(table_directory.sfnt_version()))
        }
    }
}

impl<'a> TableProvider<'a> for FontRef<'a> {
    fn data_for_tag(&self, tag: Tag) -> Option<FontData<'a>> {
        self.table_data(tag)
    }
}
