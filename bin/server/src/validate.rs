//! Field validation for the supply-request form.
//!
//! The same pure functions run on both sides: the form validates before
//! submitting so errors render inline, and the server functions validate
//! again before touching the database.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use stockroom_core::DepartmentId;

/// Maximum length of an item name.
pub const ITEM_NAME_MAX: usize = 120;
/// Maximum length of a description.
pub const DESCRIPTION_MAX: usize = 1000;
/// Inclusive quantity bounds.
pub const QUANTITY_MIN: i32 = 1;
pub const QUANTITY_MAX: i32 = 999;

/// Raw form fields as entered by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    pub item_name: String,
    pub description: String,
    pub quantity: String,
    /// Department id, or empty for "none".
    pub department_id: String,
}

/// A validated request, ready for persistence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidRequest {
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub department_id: Option<DepartmentId>,
}

/// A single field violation, rendered next to the field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validates the raw form, returning either a persistable request or the
/// full list of field violations.
pub fn validate_request_form(form: &RequestForm) -> Result<ValidRequest, Vec<FieldError>> {
    let mut errors = Vec::new();

    let item_name = form.item_name.trim();
    if item_name.is_empty() {
        errors.push(FieldError::new("item_name", "Item name is required"));
    } else if item_name.chars().count() > ITEM_NAME_MAX {
        errors.push(FieldError::new(
            "item_name",
            format!("Item name must be at most {ITEM_NAME_MAX} characters"),
        ));
    }

    let description = form.description.trim();
    if description.chars().count() > DESCRIPTION_MAX {
        errors.push(FieldError::new(
            "description",
            format!("Description must be at most {DESCRIPTION_MAX} characters"),
        ));
    }

    let quantity = match form.quantity.trim().parse::<i32>() {
        Ok(q) if (QUANTITY_MIN..=QUANTITY_MAX).contains(&q) => Some(q),
        Ok(_) => {
            errors.push(FieldError::new(
                "quantity",
                format!("Quantity must be between {QUANTITY_MIN} and {QUANTITY_MAX}"),
            ));
            None
        }
        Err(_) => {
            errors.push(FieldError::new("quantity", "Quantity must be a whole number"));
            None
        }
    };

    let department_id = if form.department_id.trim().is_empty() {
        None
    } else {
        match DepartmentId::from_str(form.department_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("department_id", "Unknown department"));
                None
            }
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidRequest {
        item_name: item_name.to_string(),
        description: if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        },
        quantity: quantity.expect("validated above"),
        department_id,
    })
}

/// Returns the message for a field, if any, for inline rendering.
#[must_use]
pub fn field_message<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RequestForm {
        RequestForm {
            item_name: "Whiteboard markers".to_string(),
            description: "Assorted colors".to_string(),
            quantity: "12".to_string(),
            department_id: String::new(),
        }
    }

    #[test]
    fn accepts_valid_form() {
        let valid = validate_request_form(&valid_form()).expect("should validate");
        assert_eq!(valid.item_name, "Whiteboard markers");
        assert_eq!(valid.description.as_deref(), Some("Assorted colors"));
        assert_eq!(valid.quantity, 12);
        assert!(valid.department_id.is_none());
    }

    #[test]
    fn trims_whitespace_and_drops_empty_description() {
        let form = RequestForm {
            item_name: "  Stapler  ".to_string(),
            description: "   ".to_string(),
            quantity: " 1 ".to_string(),
            department_id: String::new(),
        };
        let valid = validate_request_form(&form).expect("should validate");
        assert_eq!(valid.item_name, "Stapler");
        assert!(valid.description.is_none());
        assert_eq!(valid.quantity, 1);
    }

    #[test]
    fn rejects_empty_item_name() {
        let form = RequestForm {
            item_name: "   ".to_string(),
            ..valid_form()
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert_eq!(field_message(&errors, "item_name"), Some("Item name is required"));
    }

    #[test]
    fn rejects_overlong_item_name() {
        let form = RequestForm {
            item_name: "x".repeat(ITEM_NAME_MAX + 1),
            ..valid_form()
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert!(field_message(&errors, "item_name").is_some());
    }

    #[test]
    fn rejects_overlong_description() {
        let form = RequestForm {
            description: "x".repeat(DESCRIPTION_MAX + 1),
            ..valid_form()
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert!(field_message(&errors, "description").is_some());
    }

    #[test]
    fn rejects_non_numeric_quantity() {
        let form = RequestForm {
            quantity: "a dozen".to_string(),
            ..valid_form()
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert_eq!(
            field_message(&errors, "quantity"),
            Some("Quantity must be a whole number")
        );
    }

    #[test]
    fn rejects_out_of_range_quantity() {
        for quantity in ["0", "-3", "1000"] {
            let form = RequestForm {
                quantity: quantity.to_string(),
                ..valid_form()
            };
            let errors = validate_request_form(&form).unwrap_err();
            assert!(field_message(&errors, "quantity").is_some(), "{quantity}");
        }
    }

    #[test]
    fn rejects_malformed_department_id() {
        let form = RequestForm {
            department_id: "not-an-id".to_string(),
            ..valid_form()
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert_eq!(field_message(&errors, "department_id"), Some("Unknown department"));
    }

    #[test]
    fn accepts_valid_department_id() {
        let id = stockroom_core::DepartmentId::new();
        let form = RequestForm {
            department_id: id.to_string(),
            ..valid_form()
        };
        let valid = validate_request_form(&form).expect("should validate");
        assert_eq!(valid.department_id, Some(id));
    }

    #[test]
    fn collects_multiple_errors() {
        let form = RequestForm {
            item_name: String::new(),
            description: String::new(),
            quantity: "zero".to_string(),
            department_id: "bogus".to_string(),
        };
        let errors = validate_request_form(&form).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
