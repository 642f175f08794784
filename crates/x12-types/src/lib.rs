//! Shared X12 primitive types.
//!
//! This crate defines the core data structures used across the X12 parser
//! and acknowledgement pipeline.
//!
//! # Types
//!
//! - [`X12Delimiters`] — the three delimiter characters, detected from ISA
//! - [`Segment`] — one delimited record with positional elements
//! - [`Finding`] — a non-fatal validation or structure issue
//! - [`Loop`], [`Transaction`], [`FunctionalGroup`], [`Interchange`] — the
//!   hierarchical document produced by the parser

mod delimiters;
mod document;
mod finding;
mod segment;

pub use delimiters::X12Delimiters;
pub use document::{FunctionalGroup, Interchange, Loop, Transaction};
pub use finding::Finding;
pub use segment::{Element, Segment};
