//! Delimited-text point reader.
//!
//! Overview
//! -----------------
//! [`PointReader`] adapts any [`std::io::Read`] source of delimited text into a lazy
//! stream of [`TrajectoryPoint`]s. The column layout is configurable through
//! [`ReaderOptions`]: field delimiter, comment character, null marker, timestamp
//! format, and a mapping from point fields (object id, timestamp, coordinates,
//! named properties) to column indices.
//!
//! Parsing is line by line through the `csv` crate; errors are reported per record
//! through the iterator, so one malformed row does not poison the rest of the
//! stream.

use std::io::Read;

use crate::domain::Domain;
use crate::point::{BasePoint, TrajectoryPoint};
use crate::properties::PropertyValue;
use crate::time::{self, Timestamp};
use crate::trajkit_errors::TrajkitError;

/// What a mapped property column parses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyColumnKind {
    Real,
    Integer,
    String,
    Time,
}

/// Column layout and lexical conventions of the input.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub field_delimiter: u8,
    pub comment_character: u8,
    /// Field text treated as "no value"; mapped property columns holding it
    /// produce [`PropertyValue::Null`].
    pub null_value: String,
    /// Timestamp format; `None` uses the process-wide default input format.
    pub timestamp_format: Option<String>,
    pub object_id_column: usize,
    pub timestamp_column: usize,
    /// Coordinate columns in coordinate order; `None` means the columns right
    /// after the timestamp, one per domain dimension.
    pub coordinate_columns: Option<Vec<usize>>,
    property_columns: Vec<(String, usize, PropertyColumnKind)>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            field_delimiter: b',',
            comment_character: b'#',
            null_value: String::new(),
            timestamp_format: None,
            object_id_column: 0,
            timestamp_column: 1,
            coordinate_columns: None,
            property_columns: Vec::new(),
        }
    }
}

impl ReaderOptions {
    /// Attach a named property parsed from the given column.
    pub fn map_property_column(
        mut self,
        name: &str,
        column: usize,
        kind: PropertyColumnKind,
    ) -> Self {
        self.property_columns.push((name.to_string(), column, kind));
        self
    }
}

/// Lazy reader of trajectory points from delimited text.
pub struct PointReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    domain: Domain,
    options: ReaderOptions,
}

impl<R: Read> PointReader<R> {
    /// Reader with default options: comma-delimited, `#` comments,
    /// `object_id, timestamp, coordinates...` column order.
    pub fn new(source: R, domain: Domain) -> Self {
        Self::with_options(source, domain, ReaderOptions::default())
    }

    pub fn with_options(source: R, domain: Domain, options: ReaderOptions) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(options.field_delimiter)
            .comment(Some(options.comment_character))
            .has_headers(false)
            .flexible(true)
            .from_reader(source)
            .into_records();
        PointReader {
            records,
            domain,
            options,
        }
    }

    fn timestamp_format(&self) -> String {
        self.options
            .timestamp_format
            .clone()
            .unwrap_or_else(time::default_input_format)
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Result<TrajectoryPoint, TrajkitError> {
        let field = |column: usize, name: &str| -> Result<&str, TrajkitError> {
            let text = record.get(column).map(str::trim).unwrap_or("");
            if text.is_empty() || text == self.options.null_value {
                Err(TrajkitError::EmptyField(name.to_string()))
            } else {
                Ok(text)
            }
        };

        let object_id = field(self.options.object_id_column, "object_id")?;
        let timestamp_text = field(self.options.timestamp_column, "timestamp")?;
        let timestamp = Timestamp::parse(timestamp_text, &self.timestamp_format())?;

        let default_columns: Vec<usize> = (0..self.domain.dimension())
            .map(|i| self.options.timestamp_column + 1 + i)
            .collect();
        let columns = self
            .options
            .coordinate_columns
            .as_deref()
            .unwrap_or(&default_columns);
        let mut coords = Vec::with_capacity(columns.len());
        for &column in columns {
            let text = field(column, "coordinate")?;
            coords.push(
                text.parse::<f64>()
                    .map_err(|_| TrajkitError::LexicalCastError(text.to_string()))?,
            );
        }
        let base = BasePoint::new(self.domain, &coords)?;
        let mut point = TrajectoryPoint::new(base, object_id, timestamp)?;

        for (name, column, kind) in &self.options.property_columns {
            let text = record.get(*column).map(str::trim).unwrap_or("");
            if text.is_empty() || text == self.options.null_value {
                point.set_property(name, PropertyValue::Null);
                continue;
            }
            let value = match kind {
                PropertyColumnKind::Real => PropertyValue::Real(
                    text.parse()
                        .map_err(|_| TrajkitError::LexicalCastError(text.to_string()))?,
                ),
                PropertyColumnKind::Integer => PropertyValue::Integer(
                    text.parse()
                        .map_err(|_| TrajkitError::LexicalCastError(text.to_string()))?,
                ),
                PropertyColumnKind::String => PropertyValue::String(text.to_string()),
                PropertyColumnKind::Time => {
                    PropertyValue::Moment(Timestamp::parse(text, &self.timestamp_format())?)
                }
            };
            point.set_property(name, value);
        }
        Ok(point)
    }
}

impl<R: Read> Iterator for PointReader<R> {
    type Item = Result<TrajectoryPoint, TrajkitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(error) => return Some(Err(error.into())),
        };
        Some(self.parse_record(&record))
    }
}
