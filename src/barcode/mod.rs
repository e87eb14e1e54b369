//! The barcode form and the components its exports are built from.
//!
//! - [`code`]: random 7-digit codes and a reader producing them
//! - [`image`]: CODE128 rendering to PNG
//! - [`row`]: spreadsheet rows
//! - [`export`]: archive and spreadsheet exports as batch steps
//! - [`form`]: the form state tying them together

pub mod code;

pub mod export;

pub mod form;

pub mod image;

pub mod row;
