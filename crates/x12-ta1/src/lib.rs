//! Interchange envelope (TA1) validation and acknowledgement generation.
//!
//! The envelope validator enforces a fixed taxonomy of ISA/IEA-level
//! checks, each identified by a three-digit note code. The generator
//! produces a standalone acknowledgement interchange (ISA + TA1 + IEA)
//! that swaps sender and receiver and reports the syntactic fate of the
//! received interchange.

mod codes;
mod generator;
mod validator;

pub use codes::{AckCode, Ta1NoteCode};
pub use generator::Ta1Generator;
pub use validator::validate_interchange_envelope;
