//! Error taxonomy shared by every format driver.
//!
//! Decoding can only fail on malformed or short input; encoding can only
//! fail on model data that does not fit the fixed on-disk layout. Both
//! directions return errors as values, and per-object failures during a
//! scene export are collected into an [`ExportIssue`] log instead of
//! aborting the whole operation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The stream ended before a field could be read completely.
    #[error("stream truncated at byte {offset}, {needed} more byte(s) required")]
    TruncatedStream { offset: usize, needed: usize },

    /// A polyhedron declared a plane count outside the legal 4..=6 range.
    #[error("polyhedron declares {count} bounding planes, expected 4 to 6")]
    PlaneCount { count: u32 },

    /// Input bytes remained after the last record of the format.
    #[error("{remaining} unread byte(s) after the final record")]
    TrailingBytes { remaining: usize },

    /// A count field implies more data than the stream can possibly hold.
    #[error("count field {count} at byte {offset} exceeds remaining input")]
    CountOverflow { offset: usize, count: u32 },

    /// A CSV sheet row could not be parsed.
    #[error("animation sheet row {row}: {reason}")]
    SheetRow { row: usize, reason: String },

    /// Wraps the failure of one record with its ordinal position.
    #[error("record {ordinal}: {source}")]
    Record {
        ordinal: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Tags an error with the ordinal of the record being decoded.
    pub fn at_record(self, ordinal: usize) -> Self {
        DecodeError::Record {
            ordinal,
            source: Box::new(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// A string does not fit its fixed-length, null-padded field.
    #[error("string {value:?} exceeds the {capacity}-byte field")]
    FieldTooLong { value: String, capacity: usize },

    /// A polygon or frame refers to an element outside its owner.
    #[error("index {index} out of range, limit {limit}")]
    IndexOutOfRange { index: i64, limit: usize },

    /// Grid fill would produce more frames than the slot allows.
    #[error("grid fill needs {requested} frames but the slot allows {max}")]
    FrameCountExceeded { requested: usize, max: usize },

    /// Lookup-grid cell size outside the supported range.
    #[error("cell size {0} outside the supported range {CELL_SIZE_MIN}..={CELL_SIZE_MAX}")]
    CellSizeOutOfRange(f32),

    /// Footprint/cell-size ratio would allocate an unreasonable grid.
    #[error("lookup grid of {cols}x{rows} cells exceeds the safety ceiling")]
    GridTooLarge { cols: u32, rows: u32 },

    /// Geometry too degenerate to derive a plane or hull from.
    #[error("degenerate {what}, no plane can be derived")]
    DegenerateGeometry { what: &'static str },

    /// A value does not fit the fixed-width on-disk integer.
    #[error("value {value} does not fit field {field}")]
    ValueOutOfRange { field: &'static str, value: i64 },

    /// The CSV animation sheet writer failed to serialize a row.
    #[error("animation sheet: {reason}")]
    Sheet { reason: String },

    /// The container handed to `encode` does not match the format tag.
    #[error("container {container} cannot be encoded as {format}")]
    ContainerMismatch {
        format: &'static str,
        container: &'static str,
    },

    /// Wraps the failure of one record with its ordinal position.
    #[error("record {ordinal}: {source}")]
    Record {
        ordinal: usize,
        #[source]
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    pub fn at_record(self, ordinal: usize) -> Self {
        EncodeError::Record {
            ordinal,
            source: Box::new(self),
        }
    }
}

pub const CELL_SIZE_MIN: f32 = 512.0;
pub const CELL_SIZE_MAX: f32 = 8192.0;

/// One object that failed to convert during a scene export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportIssue {
    /// Name of the scene object the failure belongs to.
    pub object: String,
    pub error: EncodeError,
}

/// Per-operation failure collector, returned alongside partial results.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IssueLog {
    issues: Vec<ExportIssue>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, object: &str, error: EncodeError) {
        self.issues.push(ExportIssue {
            object: object.to_string(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[ExportIssue] {
        &self.issues
    }
}
