//! High-level validation façade.
//!
//! Holds a schema registry and offers one-call validation of raw EDI
//! content against a named guide schema. Setup problems (unknown schema)
//! are reported as findings, not errors — callers always get an outcome.

use std::path::Path;

use ig_schema::{GuideSchema, SchemaRegistry};
use tracing::info;
use x12_types::Finding;

use crate::parse::parse;
use crate::report::{collect_findings, LocatedFinding};

/// The result of validating one document.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub findings: Vec<LocatedFinding>,
}

/// Validation service over a filesystem schema registry.
pub struct ValidationService {
    registry: SchemaRegistry,
}

impl ValidationService {
    pub fn new(schema_base_path: impl AsRef<Path>) -> Self {
        Self {
            registry: SchemaRegistry::new(schema_base_path.as_ref()),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate EDI content against a named base schema.
    pub fn validate(&self, content: &str, schema_name: &str) -> ValidationOutcome {
        info!(schema = schema_name, "starting validation");
        let Some(schema) = self.registry.get_base_schema(schema_name) else {
            return ValidationOutcome {
                valid: false,
                findings: vec![LocatedFinding {
                    location: "Document".to_string(),
                    finding: Finding::new(format!(
                        "Validation failed: schema not found: {schema_name}"
                    )),
                }],
            };
        };
        self.validate_with_schema(content, schema)
    }

    /// Validate EDI content against an already-loaded schema.
    pub fn validate_with_schema(&self, content: &str, schema: &GuideSchema) -> ValidationOutcome {
        let interchange = parse(content, schema);
        let findings = collect_findings(&interchange);
        let valid = findings.is_empty();
        info!(valid, findings = findings.len(), "validation completed");
        ValidationOutcome { valid, findings }
    }
}
