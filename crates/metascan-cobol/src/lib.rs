#![forbid(unsafe_code)]
//! COBOL copybook metadata scanner.
//!
//! Harvests data-description metadata from fixed-format copybooks and
//! normalizes it into the shared output model:
//!
//! - **source**: physical line handling and declaration reconstruction
//! - **syntax**: clause extraction and picture string manipulation
//! - **metadata**: declaration classification (category, size, scale)
//! - **reader**: the copybook data object reader (single file or PDS)
//!
//! Only the data-division subset needed for metadata is understood:
//! PICTURE, USAGE, VALUE/VALUES, level numbers, and condition-name
//! entries. Procedural COBOL is never read.

pub mod metadata;
pub mod reader;
pub mod source;
pub mod syntax;

pub use metadata::{FieldCategory, FieldMetadata};
pub use reader::{CopybookReader, CopybookScope};
pub use source::{DeclarationReader, Indicator};
