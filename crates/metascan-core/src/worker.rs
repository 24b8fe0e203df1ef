//! Worker lifecycle contracts shared by every metadata reader.
//!
//! Life cycle of a reader:
//!
//! ```text
//!     init(params)
//!          |
//!        read() <-------------------+
//!          |                        |
//!   ( end of data? ) -- no --> << process >>
//!          |
//!         yes
//!          |
//!       close()
//! ```
//!
//! End of data is signalled by `read` returning `Ok(None)`.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crate::data::DataObject;
use crate::error::{ImportError, Result};
use crate::params::ImportParams;

/// A reader that pulls data objects out of a metadata source.
///
/// `init` validates the supplied parameters and fails fast, before any
/// source is opened. `read` is pull-based and synchronous: each call
/// yields the next data object, or `None` once the source is exhausted.
/// `close` releases whatever the reader still holds; failures during
/// close-only are logged, never raised.
pub trait DataObjectReader {
    /// Validate parameters and configure the reader.
    fn init(&mut self, params: &ImportParams) -> Result<()>;

    /// Read the next data object, or `None` at end of data.
    fn read(&mut self) -> Result<Option<DataObject>>;

    /// Perform closing actions.
    fn close(&mut self);

    /// Raw classification data collected in type mode. Readers that do not
    /// collect type metadata report it as unsupported.
    fn type_metadata(&self) -> Result<&TypeMetaData> {
        Err(ImportError::TypeMetaDataUnsupported)
    }
}

/// Line-oriented status sink appended to while a reader works.
///
/// The sink is write-only from the reader's point of view; informational
/// and error lines are appended during processing and never read back.
pub struct StatusLog {
    writer: Box<dyn Write + Send>,
}

impl StatusLog {
    /// Wrap a writer as a status log.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// A status log that discards everything written to it.
    pub fn sink() -> Self {
        Self::new(io::sink())
    }

    /// Append one status line and flush.
    pub fn append(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| ImportError::Io {
                context: "status log write failed".to_string(),
                source: e,
            })
    }
}

impl fmt::Debug for StatusLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLog").finish_non_exhaustive()
    }
}

/// Raw per-field classification data gathered in type mode.
///
/// Type mode exists for rule authoring: it exposes the property names a
/// reader publishes and, for each scanned field, the property values a
/// rule template could refer to. Stored as one property-value map per
/// field, in scan order:
///
/// ```text
/// properties = ["attribute", "type", "size", "scale"]
/// entries = [
///   {"attribute": "CUST-ID",   "type": "UINT", "size": "5", "scale": "0"},
///   {"attribute": "CUST-RATE", "type": "SNUM", "size": "7", "scale": "2"},
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeMetaData {
    properties: Vec<String>,
    entries: Vec<HashMap<String, String>>,
}

impl TypeMetaData {
    /// Create an empty type metadata collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property name published by the reader.
    pub fn add_property(&mut self, property: impl Into<String>) {
        self.properties.push(property.into());
    }

    /// The property names published by the reader.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Append the property-value map of one scanned field.
    pub fn add(&mut self, entry: HashMap<String, String>) {
        self.entries.push(entry);
    }

    /// The property-value maps in scan order.
    pub fn entries(&self) -> &[HashMap<String, String>] {
        &self.entries
    }
}
