//! Effective-definition merging.
//!
//! A contextual definition is a sparse overlay: rather than storing a full
//! segment definition per structure position, the effective definition is
//! materialized on demand by cloning the base and applying the overlay
//! element-wise. Element order is always taken from the base.

use crate::model::{BaseElement, ContextualDefinition, ElementOverride, SegmentDefinition};

/// Merge a base segment definition with an optional contextual overlay.
///
/// Present override fields replace the corresponding base fields; absent
/// fields leave the base untouched. For composites, sub-element overrides
/// (keyed by sub-element xid) are applied to the base composite's ordered
/// sub-element list. Overrides never remove constraints.
pub fn effective_definition(
    base: &SegmentDefinition,
    context: Option<&ContextualDefinition>,
) -> SegmentDefinition {
    let mut effective = base.clone();
    let Some(overrides) = context.and_then(|c| c.elements.as_ref()) else {
        return effective;
    };
    if overrides.is_empty() {
        return effective;
    }

    for element in &mut effective.elements {
        if let Some(ov) = overrides.get(&element.xid) {
            apply_override(element, ov);
        }
    }
    effective
}

fn apply_override(element: &mut BaseElement, ov: &ElementOverride) {
    if let (Some(subs), Some(sub_overrides)) =
        (element.sub_elements.as_mut(), ov.sub_elements.as_ref())
    {
        for sub in subs.iter_mut() {
            if let Some(sub_ov) = sub_overrides.get(&sub.xid) {
                apply_fields(sub, sub_ov);
            }
        }
    }
    apply_fields(element, ov);
}

fn apply_fields(element: &mut BaseElement, ov: &ElementOverride) {
    if let Some(name) = &ov.name {
        element.name = name.clone();
    }
    if let Some(usage) = ov.usage {
        element.usage = usage;
    }
    if let Some(data_type) = ov.data_type {
        element.data_type = data_type;
    }
    if let Some(min_length) = ov.min_length {
        element.min_length = Some(min_length);
    }
    if let Some(max_length) = ov.max_length {
        element.max_length = Some(max_length);
    }
    if let Some(format) = &ov.format {
        element.format = Some(format.clone());
    }
    if let Some(valid_codes) = &ov.valid_codes {
        element.valid_codes = Some(valid_codes.clone());
    }
    if let Some(is_identifier) = ov.is_identifier {
        element.is_identifier = is_identifier;
    }
}
