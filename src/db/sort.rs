//! `sort=<property>[,asc|desc]` query parameters, resolved against an entity's
//! sortable properties before any SQL is built.

use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SortError {
    #[error("unknown sort property '{0}'")]
    UnknownProperty(String),

    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),
}

/// Parse every `sort` parameter of a raw query string, in order.
///
/// Other parameters are ignored. Column names only ever come from `sortable`,
/// so the result is safe to splice into SQL.
pub fn parse_sort(
    query: Option<&str>,
    sortable: &[(&'static str, &'static str)],
) -> Result<Vec<SortOrder>, SortError> {
    let Some(query) = query else {
        return Ok(Vec::new());
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == "sort")
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(_, v)| parse_one(&v, sortable))
        .collect()
}

fn parse_one(
    value: &str,
    sortable: &[(&'static str, &'static str)],
) -> Result<SortOrder, SortError> {
    let mut parts = value.split(',').map(str::trim);
    let property = parts.next().unwrap_or_default();
    let column = sortable
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, column)| *column)
        .ok_or_else(|| SortError::UnknownProperty(property.to_string()))?;

    let direction = match parts.next() {
        None | Some("") => Direction::Asc,
        Some(d) if d.eq_ignore_ascii_case("asc") => Direction::Asc,
        Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
        Some(d) => return Err(SortError::UnknownDirection(d.to_string())),
    };

    Ok(SortOrder { column, direction })
}

/// ` ORDER BY ...` clause (with leading space), or an empty string.
pub fn order_by_clause(orders: &[SortOrder]) -> String {
    if orders.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = orders
        .iter()
        .map(|o| format!("{} {}", o.column, o.direction.as_sql()))
        .collect();
    format!(" ORDER BY {}", terms.join(", "))
}
