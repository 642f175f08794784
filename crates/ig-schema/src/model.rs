use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Requirement designator for elements, segments, and loops.
///
/// `R` = required, `S` = situational, `N` = not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Usage {
    R,
    S,
    N,
}

/// X12 element data types.
///
/// The numeric types (`N0`..`N2`, `R`) constrain the value to parse as a
/// number; `DT`/`TM` shapes are enforced through format tokens, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "ID")]
    Id,
    #[serde(rename = "AN")]
    An,
    #[serde(rename = "DT")]
    Dt,
    #[serde(rename = "TM")]
    Tm,
    N0,
    N1,
    N2,
    R,
    Composite,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            DataType::Id => "ID",
            DataType::An => "AN",
            DataType::Dt => "DT",
            DataType::Tm => "TM",
            DataType::N0 => "N0",
            DataType::N1 => "N1",
            DataType::N2 => "N2",
            DataType::R => "R",
            DataType::Composite => "Composite",
        };
        f.write_str(token)
    }
}

/// One allowed code value for an `ID` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDefinition {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

/// A single element definition inside a segment definition.
///
/// Composite elements carry their sub-elements as an ordered list and no
/// scalar constraints of their own. `is_identifier` marks the elements
/// whose validity decides which loop context a segment belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseElement {
    pub xid: String,
    #[serde(default)]
    pub data_ele: Option<String>,
    pub name: String,
    pub usage: Usage,
    pub seq: usize,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "minLength")]
    pub min_length: Option<usize>,
    #[serde(default, rename = "maxLength")]
    pub max_length: Option<usize>,
    /// Format token such as `CCYYMMDD` or `HHMM`; unknown tokens pass.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub valid_codes: Option<Vec<CodeDefinition>>,
    #[serde(default)]
    pub sub_elements: Option<Vec<BaseElement>>,
    #[serde(default)]
    pub is_identifier: bool,
}

/// Severity attached to a syntax rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Error
    }
}

/// Comparison operator in a syntax-rule condition clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Is,
    IsNot,
    IsPresent,
    IsNotPresent,
}

/// One condition clause: an element reference, an operator, and an
/// optional comparison value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionClause {
    pub element: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Condition group: `ALL_OF` (AND) or `ANY_OF` (OR) over clauses.
/// A rule with neither group fires unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, rename = "ALL_OF")]
    pub all_of: Option<Vec<ConditionClause>>,
    #[serde(default, rename = "ANY_OF")]
    pub any_of: Option<Vec<ConditionClause>>,
}

/// Kinds of assertions a syntax rule can make once its conditions hold.
///
/// Only `MUST_BE_PRESENT`, `MUST_HAVE_LENGTH`, and `ANY_OF_MUST_BE_PRESENT`
/// are enforced; the remaining kinds are accepted from schema files and
/// ignored by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssertionKind {
    MustBeFormat,
    MustHaveLength,
    MustBePresent,
    MustNotBePresent,
    AnyOfMustBePresent,
}

/// One assertion executed when a rule's conditions are met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClause {
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub elements: Option<Vec<String>>,
    pub assertion: AssertionKind,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A conditional cross-element rule attached to a segment definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxRule {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub description: String,
    #[serde(rename = "snipLevel")]
    pub snip_level: u8,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default, rename = "then")]
    pub assertions: Vec<AssertionClause>,
}

/// A base segment definition, keyed by segment id in the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub usage: Usage,
    #[serde(default = "default_max_use", alias = "maxUse")]
    pub max_use: u32,
    pub elements: Vec<BaseElement>,
    #[serde(default)]
    pub rules: Option<Vec<SyntaxRule>>,
}

fn default_max_use() -> u32 {
    1
}

/// Sparse per-element override carried by a contextual definition.
///
/// Absent fields leave the base definition untouched; present fields
/// replace it. Overrides never remove constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
    #[serde(default, rename = "dataType")]
    pub data_type: Option<DataType>,
    #[serde(default, rename = "minLength")]
    pub min_length: Option<usize>,
    #[serde(default, rename = "maxLength")]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub valid_codes: Option<Vec<CodeDefinition>>,
    #[serde(default)]
    pub is_identifier: Option<bool>,
    /// Sub-element overrides keyed by sub-element xid.
    #[serde(default)]
    pub sub_elements: Option<HashMap<String, ElementOverride>>,
}

/// An overlay specializing a base segment definition for one position in
/// the structure tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Element overrides keyed by element xid.
    #[serde(default)]
    pub elements: Option<HashMap<String, ElementOverride>>,
}

/// Repeat count of a structure loop: an integer, or a token such as `">1"`.
/// Any token that does not parse as an integer means effectively unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Repeat {
    Count(u32),
    Token(String),
}

/// Stand-in limit for unbounded repeats.
pub const UNBOUNDED_REPEAT: u32 = 99_999;

impl Repeat {
    /// The effective occurrence limit.
    pub fn limit(&self) -> u32 {
        match self {
            Repeat::Count(n) => *n,
            Repeat::Token(token) => token.trim().parse().unwrap_or(UNBOUNDED_REPEAT),
        }
    }
}

/// A segment reference inside the structure tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSegment {
    pub xid: String,
    #[serde(default)]
    pub name: Option<String>,
    pub usage: Usage,
    pub max_use: u32,
    /// Both spellings appear in the wild.
    #[serde(
        default,
        rename = "baseDefinitionId",
        alias = "segmentDefinitionId"
    )]
    pub base_definition_id: Option<String>,
    #[serde(default, rename = "contextDefinitionId")]
    pub context_definition_id: Option<String>,
}

impl StructureSegment {
    /// The base segment definition id, defaulting to the node's xid.
    pub fn definition_id(&self) -> &str {
        self.base_definition_id.as_deref().unwrap_or(&self.xid)
    }
}

/// A loop in the structure tree: an ordered list of child segments and
/// loops. A loop always starts with a segment (possibly through nested
/// loops).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureLoop {
    pub xid: String,
    pub name: String,
    pub usage: Usage,
    pub repeat: Repeat,
    #[serde(default)]
    pub children: Vec<StructureNode>,
}

/// One child of a structure loop, discriminated by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureNode {
    Segment(StructureSegment),
    Loop(StructureLoop),
}

impl StructureNode {
    pub fn xid(&self) -> &str {
        match self {
            StructureNode::Segment(s) => &s.xid,
            StructureNode::Loop(l) => &l.xid,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StructureNode::Segment(s) => s.name.as_deref().unwrap_or(&s.xid),
            StructureNode::Loop(l) => &l.name,
        }
    }

    pub fn usage(&self) -> Usage {
        match self {
            StructureNode::Segment(s) => s.usage,
            StructureNode::Loop(l) => l.usage,
        }
    }

    /// The effective occurrence limit: `max_use` for segments, `repeat`
    /// for loops.
    pub fn limit(&self) -> u32 {
        match self {
            StructureNode::Segment(s) => s.max_use,
            StructureNode::Loop(l) => l.repeat.limit(),
        }
    }

    /// The id of the first segment this node can start with.
    ///
    /// For a loop, recurses into its first child; `None` for a loop with
    /// no children.
    pub fn starting_segment_id(&self) -> Option<&str> {
        match self {
            StructureNode::Segment(s) => Some(&s.xid),
            StructureNode::Loop(l) => l.children.first().and_then(|c| c.starting_segment_id()),
        }
    }

    /// The contextual definition id used for trial validation of this
    /// node's starting segment.
    pub fn starting_context_id(&self) -> Option<&str> {
        match self {
            StructureNode::Segment(s) => s.context_definition_id.as_deref(),
            StructureNode::Loop(l) => match l.children.first() {
                Some(StructureNode::Segment(s)) => s.context_definition_id.as_deref(),
                _ => None,
            },
        }
    }
}

/// A complete implementation-guide schema for one transaction family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSchema {
    #[serde(rename = "transactionName")]
    pub transaction_name: String,
    pub version: String,
    pub description: String,
    /// Legacy top-level rules; retained for compatibility, not evaluated.
    #[serde(default)]
    pub rules: Vec<serde_json::Value>,
    #[serde(default, rename = "contextualDefinitions")]
    pub contextual_definitions: HashMap<String, ContextualDefinition>,
    #[serde(default, rename = "segmentDefinitions")]
    pub segment_definitions: HashMap<String, SegmentDefinition>,
    pub structure: Vec<StructureLoop>,
}

impl GuideSchema {
    /// Parse a guide schema from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn segment_definition(&self, id: &str) -> Option<&SegmentDefinition> {
        self.segment_definitions.get(id)
    }

    pub fn contextual_definition(&self, id: &str) -> Option<&ContextualDefinition> {
        self.contextual_definitions.get(id)
    }

    pub fn version_key(&self) -> &str {
        &self.version
    }
}
