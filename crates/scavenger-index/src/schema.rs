//! Index schema definition for the scavenger document index.
//!
//! Every document carries the eight contract fields:
//! - `key`: unique external identifier (string, stored, fast)
//! - `path`: the key again, analyzed so path segments are searchable
//! - `name`, `description`: display metadata (text, stored)
//! - `data`: full content (text, stored, source of highlight fragments)
//! - `fileExtension`, `dataSource`: categorical tags (string, stored, fast)
//! - `modifiedEpochTime`: seconds since the epoch at upsert (i64, indexed, fast)

use std::{fmt, str::FromStr};

use tantivy::schema::{
    FAST, Field, INDEXED, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing,
    TextOptions,
};

use crate::{IndexError, analyzer::SCAVENGER_TOKENIZER};

/// Contract field names.
pub mod names {
    /// Unique external identifier.
    pub const KEY: &str = "key";
    /// Analyzed copy of the key.
    pub const PATH: &str = "path";
    /// Display name.
    pub const NAME: &str = "name";
    /// Display description.
    pub const DESCRIPTION: &str = "description";
    /// Full textual content.
    pub const DATA: &str = "data";
    /// File extension tag.
    pub const FILE_EXTENSION: &str = "fileExtension";
    /// Ingestion source tag.
    pub const DATA_SOURCE: &str = "dataSource";
    /// Upsert time in seconds since the epoch.
    pub const MODIFIED_EPOCH_TIME: &str = "modifiedEpochTime";
}

/// How a field's values are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Analyzed free text.
    Text,
    /// A single untokenized value matched exactly.
    Raw,
    /// A signed 64-bit integer.
    Numeric,
}

/// One of the eight contract fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexField {
    /// `key`
    Key,
    /// `path`
    Path,
    /// `name`
    Name,
    /// `description`
    Description,
    /// `data`
    Data,
    /// `fileExtension`
    FileExtension,
    /// `dataSource`
    DataSource,
    /// `modifiedEpochTime`
    ModifiedEpochTime,
}

impl IndexField {
    /// Every contract field.
    pub const ALL: [Self; 8] = [
        Self::Key,
        Self::Path,
        Self::Name,
        Self::Description,
        Self::Data,
        Self::FileExtension,
        Self::DataSource,
        Self::ModifiedEpochTime,
    ];

    /// Fields searched when a request names none.
    pub const DEFAULT_SEARCH: [Self; 4] = [Self::Path, Self::Name, Self::Description, Self::Data];

    /// The contract name of this field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Key => names::KEY,
            Self::Path => names::PATH,
            Self::Name => names::NAME,
            Self::Description => names::DESCRIPTION,
            Self::Data => names::DATA,
            Self::FileExtension => names::FILE_EXTENSION,
            Self::DataSource => names::DATA_SOURCE,
            Self::ModifiedEpochTime => names::MODIFIED_EPOCH_TIME,
        }
    }

    /// How the field is indexed.
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Path | Self::Name | Self::Description | Self::Data => FieldKind::Text,
            Self::Key | Self::FileExtension | Self::DataSource => FieldKind::Raw,
            Self::ModifiedEpochTime => FieldKind::Numeric,
        }
    }
}

impl fmt::Display for IndexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexField {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| IndexError::InvalidField(s.to_string()))
    }
}

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Unique external identifier.
    pub key: Field,
    /// Analyzed copy of the key.
    pub path: Field,
    /// Display name.
    pub name: Field,
    /// Display description.
    pub description: Field,
    /// Full content.
    pub data: Field,
    /// File extension tag.
    pub file_extension: Field,
    /// Ingestion source tag.
    pub data_source: Field,
    /// Upsert time in seconds since the epoch.
    pub modified_epoch_time: Field,
}

impl IndexSchema {
    /// Creates a new index schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        // Raw fields: a single token each, exact matches only
        let key = builder.add_text_field(names::KEY, STRING | STORED | FAST);
        let file_extension = builder.add_text_field(names::FILE_EXTENSION, STRING | STORED | FAST);
        let data_source = builder.add_text_field(names::DATA_SOURCE, STRING | STORED | FAST);

        let path = builder.add_text_field(names::PATH, text_options());
        let name = builder.add_text_field(names::NAME, text_options());
        let description = builder.add_text_field(names::DESCRIPTION, text_options());
        let data = builder.add_text_field(names::DATA, text_options());

        let modified_epoch_time =
            builder.add_i64_field(names::MODIFIED_EPOCH_TIME, INDEXED | STORED | FAST);

        let schema = builder.build();

        Self {
            schema,
            key,
            path,
            name,
            description,
            data,
            file_extension,
            data_source,
            modified_epoch_time,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the Tantivy handle for a contract field.
    pub fn field(&self, field: IndexField) -> Field {
        match field {
            IndexField::Key => self.key,
            IndexField::Path => self.path,
            IndexField::Name => self.name,
            IndexField::Description => self.description,
            IndexField::Data => self.data,
            IndexField::FileExtension => self.file_extension,
            IndexField::DataSource => self.data_source,
            IndexField::ModifiedEpochTime => self.modified_epoch_time,
        }
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Options for analyzed, stored text with positions for phrase queries.
fn text_options() -> TextOptions {
    TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(SCAVENGER_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
        .set_stored()
}

#[cfg(test)]
mod test {
    use tantivy::schema::FieldType;

    use super::*;

    #[test]
    fn schema_uses_contract_names() {
        let schema = IndexSchema::new();
        for field in IndexField::ALL {
            let handle = schema.schema().get_field(field.name()).unwrap();
            assert_eq!(handle, schema.field(field), "{field}");
        }
    }

    #[test]
    fn raw_fields_are_untokenized_stored_and_fast() {
        let schema = IndexSchema::new();
        for field in [
            IndexField::Key,
            IndexField::FileExtension,
            IndexField::DataSource,
        ] {
            let entry = schema.schema().get_field_entry(schema.field(field));
            assert!(entry.is_indexed(), "{field} should be indexed");
            assert!(entry.is_stored(), "{field} should be stored");
            assert!(entry.is_fast(), "{field} should be fast");

            if let FieldType::Str(opts) = entry.field_type() {
                let indexing = opts.get_indexing_options().unwrap();
                assert_eq!(indexing.tokenizer(), "raw");
            } else {
                panic!("{field} should be text type");
            }
        }
    }

    #[test]
    fn text_fields_are_tokenized_and_stored() {
        let schema = IndexSchema::new();
        for field in IndexField::DEFAULT_SEARCH {
            let entry = schema.schema().get_field_entry(schema.field(field));
            assert!(entry.is_indexed(), "{field} should be indexed");
            assert!(entry.is_stored(), "{field} should be stored");

            if let FieldType::Str(opts) = entry.field_type() {
                let indexing = opts.get_indexing_options().unwrap();
                assert_eq!(indexing.tokenizer(), SCAVENGER_TOKENIZER);
                assert_eq!(
                    indexing.index_option(),
                    IndexRecordOption::WithFreqsAndPositions
                );
            } else {
                panic!("{field} should be text type");
            }
        }
    }

    #[test]
    fn modified_time_is_numeric() {
        let schema = IndexSchema::new();
        let entry = schema.schema().get_field_entry(schema.modified_epoch_time);
        assert!(entry.is_indexed());
        assert!(entry.is_stored());
        assert!(entry.is_fast());
        assert!(matches!(entry.field_type(), FieldType::I64(_)));
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("dataSource".parse::<IndexField>().unwrap(), IndexField::DataSource);
        assert_eq!(
            "modifiedEpochTime".parse::<IndexField>().unwrap().kind(),
            FieldKind::Numeric
        );
        let err = "title".parse::<IndexField>().unwrap_err();
        assert!(matches!(err, IndexError::InvalidField(name) if name == "title"));
    }

    #[test]
    fn field_kinds() {
        assert_eq!(IndexField::Path.kind(), FieldKind::Text);
        assert_eq!(IndexField::Key.kind(), FieldKind::Raw);
    }
}
