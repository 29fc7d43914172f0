use convert_case::{Case, Casing};

/// Derive a column name from a host field name (`CreatedAt` -> `created_at`).
#[must_use]
pub fn column_name(field: &str) -> String {
    field.to_case(Case::Snake)
}

/// Case-insensitive ASCII prefix test, returning the remainder on success.
#[must_use]
pub fn strip_prefix_ci<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if value.len() < prefix.len() || !value.is_char_boundary(prefix.len()) {
        return None;
    }

    let (head, tail) = value.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix).then_some(tail)
}
