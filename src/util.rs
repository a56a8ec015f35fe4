//! Shared utility helpers.

use crate::error::PbixError;

/// A parsed `Table.Field` qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    pub table: String,
    pub field: String,
}

impl Qualifier {
    /// The full `Table.Field` string, reconstructed from its parts.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.field)
    }
}

/// Split a `Table.Field` qualifier on its single separating `.`.
///
/// Per the qualifier syntax rule, the input MUST contain exactly one `.`;
/// zero or more than one is a caller input error.
pub fn parse_qualifier(qualifier: &str) -> Result<Qualifier, PbixError> {
    let mut parts = qualifier.splitn(2, '.');
    let table = parts.next().unwrap_or("");
    let rest = parts.next();
    match rest {
        Some(field) if !table.is_empty() && !field.is_empty() && !field.contains('.') => {
            Ok(Qualifier {
                table: table.to_string(),
                field: field.to_string(),
            })
        }
        _ => Err(PbixError::QualifierSyntax {
            qualifier: qualifier.to_string(),
        }),
    }
}
