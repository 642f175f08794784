use thiserror::Error;

/// Defects in the guide schema's structure tree discovered while locating
/// the transaction-set loop.
///
/// These never cross the public API as errors: the driver downgrades them
/// to a transaction-level finding and returns the document anyway.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("ISA_LOOP not found in schema structure")]
    IsaLoopNotFound,

    #[error("GS_LOOP not found in schema structure")]
    GsLoopNotFound,

    #[error("ST_LOOP not found in schema structure")]
    StLoopNotFound,
}
