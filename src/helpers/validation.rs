use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// Validates `value` and reports the first violated field, in `field_order`,
/// as a bad request carrying that field's message.
pub fn validate_in_order<T: Validate>(value: &T, field_order: &[&str]) -> Result<(), ApiError> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(ApiError::BadRequest(first_message(&errors, field_order))),
    }
}

/// Message of the first violated field in `field_order`. Falls back to any
/// violated field when none of the listed ones failed.
pub fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> String {
    let field_errors = errors.field_errors();

    let ordered = field_order.iter().find_map(|wanted| {
        field_errors.iter().find_map(|(name, errs)| {
            let name: &str = name.as_ref();
            (name == *wanted).then_some(*errs)
        })
    });

    ordered
        .or_else(|| field_errors.values().next().copied())
        .and_then(|errs| errs.first())
        .and_then(|err| err.message.as_ref())
        .map(|message| message.to_string())
        .unwrap_or_else(|| "Invalid request".to_string())
}

/// True when the string is absent or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validator rule rejecting blank strings.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if is_blank(value) {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Treats a blank optional string as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}

/// Reads an explicit `null` as the default value so that the field
/// validators, not the JSON decoder, report it.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// [`null_as_default`] for a list and for each of its items.
pub fn null_items_as_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}
