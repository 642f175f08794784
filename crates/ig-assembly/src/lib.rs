//! Guide-driven X12 document assembly.
//!
//! Two-pass approach:
//! 1. Decode the raw interchange into a flat ordered segment list
//! 2. Match segments into the guide schema's loop tree, validating each
//!    segment against its effective (base + contextual) definition
//!
//! # Usage
//! ```ignore
//! let schema = GuideSchema::from_json(&json)?;
//! let interchange = parse(&raw, &schema);
//! let findings = collect_findings(&interchange);
//! ```
//!
//! Parsing is total: every input produces an [`x12_types::Interchange`],
//! and every problem — structural or content — is a finding attached to
//! the entity where it was observed.

pub mod error;
pub mod matcher;
pub mod parse;
pub mod report;
pub mod service;
pub mod tokenize;
pub mod validator;

pub use error::StructureError;
pub use matcher::StructuralMatcher;
pub use parse::parse;
pub use report::{collect_findings, LocatedFinding};
pub use service::{ValidationOutcome, ValidationService};
pub use tokenize::{decode, find_segment, guide_version, DecodedStream};
pub use validator::SegmentValidator;
