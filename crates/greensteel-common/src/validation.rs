//! Input validation utilities.
//!
//! New rows are validated against the same rules the registration API enforces before
//! they are written, so a fixture that the service would reject never reaches the database.

use validator::Validate;

use crate::error::DbCheckError;

/// Validate a new record, returning a DbCheckError::Validation on failure.
pub fn validate_record<T: Validate>(record: &T) -> Result<(), DbCheckError> {
    record.validate().map_err(|e| DbCheckError::Validation {
        message: format_validation_errors(&e),
    })
}

/// Format validation errors into a human-readable string, ordered by field name.
fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => format!("{field}: {m}"),
                None => format!("{field}: invalid value ({})", e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
