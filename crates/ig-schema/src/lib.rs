//! Implementation-guide schema model for X12 transactions.
//!
//! A guide schema is a JSON document describing one transaction family
//! (e.g. the HIPAA 837 Professional): base segment definitions, sparse
//! contextual overlays that specialize a segment for one position in the
//! structure tree, and the recursive loop/segment structure itself.
//!
//! Schemas are loaded once and treated as read-only for the lifetime of a
//! parse; they may be shared freely across threads.

mod model;
mod overlay;
mod registry;

pub use model::{
    AssertionClause, AssertionKind, BaseElement, CodeDefinition, ConditionClause,
    ConditionOperator, Conditions, ContextualDefinition, DataType, ElementOverride, GuideSchema,
    Repeat, SegmentDefinition, Severity, StructureLoop, StructureNode, StructureSegment,
    SyntaxRule, Usage, UNBOUNDED_REPEAT,
};
pub use overlay::effective_definition;
pub use registry::{load_schema_file, SchemaError, SchemaRegistry};
