//! Layout engine: A1 range addressing and the projection of a sheet schema
//! onto header values and formatting/validation requests.
//!
//! Nothing in this module performs I/O.

pub mod builder;
pub mod range;
pub mod requests;

pub use builder::SheetLayout;
pub use range::{bounded_columns, bounded_range, column_index_to_letter, column_number_to_letter, generate_range, qualify};
pub use requests::{Color, GridRange, Request, ValueRange};
