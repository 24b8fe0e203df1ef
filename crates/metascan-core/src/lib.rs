#![forbid(unsafe_code)]
//! Core import framework for metascan.
//!
//! This crate provides the pieces shared by every metadata reader:
//!
//! - **Output model**: intermediate data objects and attributes produced
//!   by readers, independent of the source they were scanned from
//! - **Rules**: category/name keyed mapping templates plus the expression
//!   engine that evaluates arithmetic embedded in them
//! - **Worker lifecycle**: the reader contract (`init`, `read`, `close`),
//!   the type-mode payload, and the status log sink
//! - **Errors**: the closed error taxonomy for import processing

pub mod case;
pub mod data;
pub mod error;
pub mod params;
pub mod rule;
pub mod worker;

pub use case::CaseMode;
pub use data::{Attribute, AttributeCode, DataObject};
pub use error::{ImportError, Result};
pub use params::ImportParams;
pub use rule::{RuleMap, RuleStore};
pub use worker::{DataObjectReader, StatusLog, TypeMetaData};
