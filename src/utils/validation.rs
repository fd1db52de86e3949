use validator::{ValidationErrors, ValidationErrorsKind};

/// Extrait le message de la première règle violée, pour les réponses 400.
/// Descend dans les erreurs imbriquées (listes d'items, structs).
pub fn first_error_message(errors: &ValidationErrors) -> String {
    walk(errors).unwrap_or_else(|| "Invalid request".to_string())
}

fn walk(errors: &ValidationErrors) -> Option<String> {
    for kind in errors.errors().values() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    return match &error.message {
                        Some(message) => Some(message.to_string()),
                        None => Some(error.code.to_string()),
                    };
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(message) = walk(inner) {
                    return Some(message);
                }
            }
            ValidationErrorsKind::List(map) => {
                for inner in map.values() {
                    if let Some(message) = walk(inner) {
                        return Some(message);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Inner {
        #[validate(range(min = 1, message = "must be positive"))]
        value: i32,
    }

    #[derive(Deserialize, Validate)]
    struct Outer {
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[test]
    fn test_flat_field_message() {
        #[derive(Deserialize, Validate)]
        struct Flat {
            #[validate(length(min = 5, message = "too short"))]
            text: String,
        }

        let errors = Flat { text: "ab".to_string() }.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "too short");
    }

    #[test]
    fn test_nested_list_message() {
        let outer = Outer {
            items: vec![Inner { value: 0 }],
        };

        let errors = outer.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "must be positive");
    }
}
