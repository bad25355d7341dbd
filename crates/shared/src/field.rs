use serde::Serialize;
use validator::ValidationErrors;

/// A single rejected input field, as reported back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` errors into one entry per field.
///
/// `fields` maps struct field names to the names used on the wire and fixes
/// the output order. Fields that fail but are not listed are appended in name
/// order so that no violation is dropped.
pub fn field_errors(errors: &ValidationErrors, fields: &[(&str, &str)]) -> Vec<FieldError> {
    let mut failed = errors
        .field_errors()
        .into_iter()
        .map(|(name, errors)| (name.to_string(), errors))
        .collect::<Vec<_>>();
    failed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = Vec::with_capacity(failed.len());

    for (name, wire) in fields {
        if let Some((_, errors)) = failed.iter().find(|(k, _)| k.as_str() == *name) {
            if let Some(error) = errors.first() {
                out.push(FieldError::new(*wire, message_of(error)));
            }
        }
    }

    for (name, errors) in &failed {
        if fields.iter().any(|(known, _)| *known == name.as_str()) {
            continue;
        }
        if let Some(error) = errors.first() {
            out.push(FieldError::new(name.clone(), message_of(error)));
        }
    }

    out
}

fn message_of(error: &validator::ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 2, message = "too short"))]
        first_name: String,
        #[validate(email)]
        email: String,
        #[validate(length(max = 3, message = "too long"))]
        zeta: String,
    }

    #[test]
    fn test_field_errors_follow_declared_order() {
        let probe = Probe {
            first_name: "a".to_string(),
            email: "nope".to_string(),
            zeta: "abcd".to_string(),
        };
        let errors = probe.validate().unwrap_err();

        let out = field_errors(&errors, &[("email", "email"), ("first_name", "firstName")]);

        assert_eq!(
            out,
            vec![
                FieldError::new("email", "Invalid value (email)"),
                FieldError::new("firstName", "too short"),
                FieldError::new("zeta", "too long"),
            ]
        );
    }

    #[test]
    fn test_field_error_serializes_flat() {
        let json = serde_json::to_value(FieldError::new("notes", "bad")).unwrap();
        assert_eq!(json, serde_json::json!({"field": "notes", "message": "bad"}));
    }
}
