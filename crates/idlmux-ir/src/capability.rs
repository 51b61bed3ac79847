//! Capabilities a target implements once each.
//!
//! Emitters pick the strategy that matches what their format can express
//! natively: tagged variants, declarative disjunctions, or discriminated
//! schemas for unions; native maps, entry lists, or recursive objects for maps.

use idlmux_spec::registry::ResolveError;
use idlmux_spec::types::common::Target;
use idlmux_spec::types::definitions::{EnumDef, FieldType, TypeDef, UnionDef};

use crate::numbering::{self, EnumNumbering, NumberedField};
use crate::scope::RenderScope;

/// Wire-tag assignment for targets with numbered fields.
pub trait FieldNumbering {
    const TARGET: Target;

    fn number_fields<'a>(&self, ty: &'a TypeDef) -> Vec<NumberedField<'a>> {
        numbering::number_fields(ty, Self::TARGET)
    }

    fn number_enum<'a>(&self, e: &'a EnumDef) -> EnumNumbering<'a> {
        numbering::number_enum(e)
    }
}

/// Rendering of `map<key, value>` field types.
pub trait MapSynthesis {
    /// Per-emission state, created fresh for every document
    type State: Default;
    type Output;

    fn synthesize_map(
        &self,
        key: &str,
        value: &FieldType,
        scope: &RenderScope<'_>,
        state: &mut Self::State,
    ) -> Self::Output;
}

/// Rendering of union declarations.
pub trait UnionRendering {
    type Output;

    fn render_union(
        &self,
        union: &UnionDef,
        scope: &RenderScope<'_>,
    ) -> Result<Self::Output, ResolveError>;
}
