//! Schema model: columns, groups and validation descriptors describing the
//! shape of one sheet.

pub mod types;

pub use types::*;
