//! Wire-tag assignment for fields and enum values.
//!
//! Numbers are computed per target: fields excluded from the target are
//! dropped before the pass, so they neither reserve their declared number
//! nor advance the counter. A later auto-numbered field may therefore take
//! a number an excluded field declared.

use std::collections::HashMap;

use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::{EnumDef, EnumValue, Field, TypeDef};

/// A field included in a target, with its assigned wire tag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberedField<'a> {
    pub field: &'a Field,
    pub number: u32,
}

/// Enum values with their wire tags
#[derive(Debug, Clone, PartialEq)]
pub struct EnumNumbering<'a> {
    /// `<NAME>_UNSPECIFIED`, present unless a value claims 0 explicitly
    pub sentinel: Option<String>,
    pub values: Vec<(&'a EnumValue, i32)>,
}

/// Two included fields ended up sharing a wire tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fields '{first}' and '{second}' of '{type_name}' both use number {number}")]
pub struct NumberingCollision {
    pub type_name: String,
    pub number: u32,
    pub first: String,
    pub second: String,
}

/// Assign tags to the fields of `ty` that are included in `target`.
pub fn number_fields(ty: &TypeDef, target: Target) -> Vec<NumberedField<'_>> {
    let mut next_auto: u32 = 1;
    ty.included_fields(target)
        .map(|field| {
            let number = match field.number {
                Some(n) => {
                    next_auto = next_auto.max(n.saturating_add(1));
                    n
                }
                None => {
                    let n = next_auto;
                    next_auto += 1;
                    n
                }
            };
            NumberedField { field, number }
        })
        .collect()
}

/// Assign tags to enum values, reserving 0 for the sentinel when free.
pub fn number_enum(e: &EnumDef) -> EnumNumbering<'_> {
    let claims_zero = e.values.iter().any(|v| v.number == Some(0));
    let sentinel = (!claims_zero).then(|| format!("{}_UNSPECIFIED", e.name.to_uppercase()));

    let mut next_auto: i32 = 1;
    let values = e
        .values
        .iter()
        .map(|value| {
            let number = match value.number {
                Some(n) => {
                    next_auto = next_auto.max(n.saturating_add(1));
                    n
                }
                None => {
                    let n = next_auto;
                    next_auto += 1;
                    n
                }
            };
            (value, number)
        })
        .collect();

    EnumNumbering { sentinel, values }
}

/// Internal-consistency check over an assigned numbering.
pub fn check_collisions(
    type_name: &str,
    numbered: &[NumberedField<'_>],
) -> Result<(), NumberingCollision> {
    let mut seen: HashMap<u32, &str> = HashMap::new();
    for nf in numbered {
        if let Some(first) = seen.insert(nf.number, &nf.field.name) {
            return Err(NumberingCollision {
                type_name: type_name.to_string(),
                number: nf.number,
                first: first.to_string(),
                second: nf.field.name.clone(),
            });
        }
    }
    Ok(())
}
