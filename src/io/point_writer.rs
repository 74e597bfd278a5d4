//! Delimited-text point writer.
//!
//! Overview
//! -----------------
//! [`PointWriter`] renders trajectory points (or whole trajectories) as delimited
//! text through the `csv` crate. Output conventions come from [`WriterOptions`]:
//! tab-delimited, newline-terminated, double-quote quoting with embedded quotes
//! doubled, empty string for null properties, and a header row by default.
//!
//! The property columns are fixed by the first point written: its property keys,
//! in ascending order. Later points missing one of those keys emit the null
//! marker; extra keys are ignored.

use std::io::Write;

use crate::point::TrajectoryPoint;
use crate::properties::PropertyValue;
use crate::time;
use crate::trajectory::Trajectory;
use crate::trajkit_errors::TrajkitError;

/// Output conventions for delimited text.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub field_delimiter: u8,
    /// Record terminator; `"\r\n"` selects CRLF, anything else uses its first
    /// byte.
    pub record_delimiter: String,
    pub quote_character: u8,
    /// Text emitted for null or missing properties.
    pub null_value: String,
    /// Digits after the decimal point for coordinates.
    pub coordinate_precision: usize,
    pub write_header: bool,
    /// Timestamp format; `None` uses the process-wide default output format.
    pub timestamp_format: Option<String>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            field_delimiter: b'\t',
            record_delimiter: "\n".to_string(),
            quote_character: b'"',
            null_value: String::new(),
            coordinate_precision: 6,
            write_header: true,
            timestamp_format: None,
        }
    }
}

/// Streaming writer of trajectory points as delimited text.
pub struct PointWriter<W: Write> {
    writer: csv::Writer<W>,
    options: WriterOptions,
    /// Property columns, fixed by the first point written.
    property_names: Option<Vec<String>>,
}

impl<W: Write> PointWriter<W> {
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        let terminator = if options.record_delimiter == "\r\n" {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(*options.record_delimiter.as_bytes().first().unwrap_or(&b'\n'))
        };
        let writer = csv::WriterBuilder::new()
            .delimiter(options.field_delimiter)
            .quote(options.quote_character)
            .terminator(terminator)
            .flexible(true)
            .from_writer(sink);
        PointWriter {
            writer,
            options,
            property_names: None,
        }
    }

    /// Write one point, emitting the header first if configured and not yet done.
    pub fn write_point(&mut self, point: &TrajectoryPoint) -> Result<(), TrajkitError> {
        if self.property_names.is_none() {
            let mut names: Vec<String> =
                point.properties().iter().map(|(k, _)| k.clone()).collect();
            names.sort();
            if self.options.write_header {
                self.write_header(point, &names)?;
            }
            self.property_names = Some(names);
        }

        let mut record: Vec<String> = Vec::new();
        record.push(point.object_id().to_string());
        record.push(self.format_timestamp(&point.timestamp())?);
        for &c in point.base_point().coordinates() {
            record.push(format!("{:.*}", self.options.coordinate_precision, c));
        }
        let names = self.property_names.clone().unwrap_or_default();
        for name in &names {
            let rendered = match point.properties().get(name) {
                Ok(value) => self.format_property(value)?,
                Err(_) => self.options.null_value.clone(),
            };
            record.push(rendered);
        }
        self.writer.write_record(&record)?;
        Ok(())
    }

    /// Write every point of an iterable.
    pub fn write_points<'a, I>(&mut self, points: I) -> Result<(), TrajkitError>
    where
        I: IntoIterator<Item = &'a TrajectoryPoint>,
    {
        for point in points {
            self.write_point(point)?;
        }
        Ok(())
    }

    /// Write every point of a trajectory.
    pub fn write_trajectory(&mut self, trajectory: &Trajectory) -> Result<(), TrajkitError> {
        self.write_points(trajectory)
    }

    pub fn flush(&mut self) -> Result<(), TrajkitError> {
        self.writer.flush()?;
        Ok(())
    }

    fn write_header(
        &mut self,
        point: &TrajectoryPoint,
        property_names: &[String],
    ) -> Result<(), TrajkitError> {
        let mut header: Vec<String> = vec!["object_id".to_string(), "timestamp".to_string()];
        for i in 0..point.base_point().dimension() {
            header.push(coordinate_name(point, i));
        }
        header.extend(property_names.iter().cloned());
        self.writer.write_record(&header)?;
        Ok(())
    }

    fn format_timestamp(&self, timestamp: &crate::time::Timestamp) -> Result<String, TrajkitError> {
        if !timestamp.is_valid() {
            return Ok(self.options.null_value.clone());
        }
        match &self.options.timestamp_format {
            Some(format) => timestamp.format(format),
            None => timestamp.format(&time::default_output_format()),
        }
    }

    fn format_property(&self, value: &PropertyValue) -> Result<String, TrajkitError> {
        Ok(match value {
            PropertyValue::Null => self.options.null_value.clone(),
            PropertyValue::Integer(i) => i.to_string(),
            PropertyValue::Real(r) => r.to_string(),
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Moment(t) => self.format_timestamp(t)?,
        })
    }
}

fn coordinate_name(point: &TrajectoryPoint, index: usize) -> String {
    use crate::domain::Domain;
    match (point.domain(), index) {
        (Domain::Terrestrial, 0) => "longitude".to_string(),
        (Domain::Terrestrial, 1) => "latitude".to_string(),
        (_, 0) => "x".to_string(),
        (_, 1) => "y".to_string(),
        _ => "z".to_string(),
    }
}
