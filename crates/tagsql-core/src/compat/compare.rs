use crate::catalog::{Catalog, CatalogType, Oid, TypeCategory, TypeClass, oid};
use tagsql_ir::op::CmpOp;

/// True if the server resolves `column <op> candidate` for at least one
/// candidate type.
#[must_use]
pub fn can_compare(catalog: &Catalog, column: &CatalogType, candidates: &[Oid], op: CmpOp) -> bool {
    if candidates.contains(&oid::UNKNOWN) && column.category == TypeCategory::String {
        return true;
    }

    // enum labels are sent as untyped text parameters
    if column.class == TypeClass::Enum && candidates.contains(&oid::TEXT) {
        return true;
    }

    let name = op.base_operator();
    candidates
        .iter()
        .any(|candidate| catalog.resolve_operator(name, column.oid, *candidate).is_some())
}
