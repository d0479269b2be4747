//! Field-level input checks producing validation [`AppError`]s.

use crate::factory::create_validation_error;
use crate::models::AppError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Custom check. Returns the failure message, or `None` when the value passes.
pub type CustomCheck = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Constraints for one field.
#[derive(Clone, Default)]
pub struct ValidationRule {
    /// Reject absent or empty values.
    pub required: bool,
    /// Minimum length in characters.
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    pub max_length: Option<usize>,
    /// Extra check run after the length checks.
    pub custom: Option<CustomCheck>,
    /// Replaces whichever message a failing check would produce.
    pub message: Option<String>,
}

impl ValidationRule {
    /// Rule with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the minimum length.
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set the maximum length.
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Install a custom check.
    #[must_use]
    pub fn custom(mut self, check: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.custom = Some(Arc::new(check));
        self
    }

    /// Override the failure message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("custom", &self.custom.as_ref().map(|_| "<check>"))
            .field("message", &self.message)
            .finish()
    }
}

/// Check one value. Empty optional fields always pass.
pub fn validate_field(field: &str, value: Option<&str>, rule: &ValidationRule) -> Option<AppError> {
    let value = value.unwrap_or_default();
    if value.is_empty() {
        return rule
            .required
            .then(|| failure(field, value, rule, "required", None, format!("{field} is required")));
    }

    let length = value.chars().count();
    if let Some(min) = rule.min_length.filter(|min| length < *min) {
        return Some(failure(
            field,
            value,
            rule,
            "minLength",
            Some(min),
            format!("{field} must be at least {min} characters"),
        ));
    }
    if let Some(max) = rule.max_length.filter(|max| length > *max) {
        return Some(failure(
            field,
            value,
            rule,
            "maxLength",
            Some(max),
            format!("{field} cannot exceed {max} characters"),
        ));
    }

    let message = rule.custom.as_ref().and_then(|check| check(value))?;
    Some(failure(field, value, rule, "custom", None, message))
}

/// Check several fields in order and return the first failure.
///
/// ```rust
/// use hireline_errors::validation::{validate_input, ValidationRule};
///
/// let name = ValidationRule::new().required().max_length(40);
/// let bio = ValidationRule::new().max_length(280);
///
/// assert!(validate_input(&[("name", Some("Ada"), &name), ("bio", None, &bio)]).is_ok());
/// let err = validate_input(&[("name", Some(""), &name)]).unwrap_err();
/// assert_eq!(err.message(), "name is required");
/// ```
pub fn validate_input(fields: &[(&str, Option<&str>, &ValidationRule)]) -> Result<(), AppError> {
    fields
        .iter()
        .find_map(|(field, value, rule)| validate_field(field, *value, rule))
        .map_or(Ok(()), Err)
}

fn failure(
    field: &str,
    value: &str,
    rule: &ValidationRule,
    constraint: &str,
    limit: Option<usize>,
    default_message: String,
) -> AppError {
    let mut constraints = BTreeMap::new();
    constraints.insert(constraint.to_owned(), limit.map_or_else(|| "true".to_owned(), |n| n.to_string()));
    let message = rule.message.clone().unwrap_or(default_message);
    create_validation_error(field, message, Some(value.to_owned()), Some(constraints))
}
