use super::candidate::field_type_candidate_oids;
use crate::{
    catalog::{Catalog, CatalogType, Oid, TypeCategory, TypeClass, oid},
    relation::Column,
};
use tagsql_ir::HostType;

/// Array types whose elements never coerce individually.
const VECTOR_TYPES: &[Oid] = &[oid::INT2VECTOR, oid::OIDVECTOR];

/// True if the server would accept a value of `ty` for `column` through a
/// cast.
#[must_use]
pub fn can_coerce(catalog: &Catalog, column: &Column, ty: &HostType) -> bool {
    let col = &column.ty;
    let ty = ty.deref_optional();

    if col.category == TypeCategory::String {
        return true;
    }

    // NOTE: domains and composites are not inspected yet
    if matches!(col.class, TypeClass::Domain | TypeClass::Composite) {
        return true;
    }

    let element = array_element(catalog, col);
    if let Some(elem) = element
        && elem.category == TypeCategory::String
        && ty.is_sequence()
    {
        return true;
    }

    if field_type_candidate_oids(ty, catalog)
        .into_iter()
        .any(|candidate| coercible_oid(catalog, col.oid, candidate))
    {
        return true;
    }

    // element-wise for sequence fields against array columns
    match (element, ty.sequence_elem()) {
        (Some(elem), Some(field_elem)) => field_type_candidate_oids(field_elem, catalog)
            .into_iter()
            .any(|candidate| coercible_oid(catalog, elem.oid, candidate)),
        _ => false,
    }
}

/// Single-oid coercion test used by both the scalar and element paths.
#[must_use]
pub fn coercible_oid(catalog: &Catalog, target: Oid, candidate: Oid) -> bool {
    target == candidate
        || matches!(target, oid::ANY | oid::ANYELEMENT)
        || candidate == oid::UNKNOWN
        || catalog.can_cast_implicit_or_assignment(target, candidate)
}

fn array_element<'a>(catalog: &'a Catalog, col: &CatalogType) -> Option<&'a CatalogType> {
    if !col.is_array() || VECTOR_TYPES.contains(&col.oid) {
        return None;
    }

    catalog.type_by_oid(col.element)
}
