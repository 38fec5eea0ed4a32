use delta_model::{FieldDefinition, FieldSet, FieldType, Restriction, Value, MAX_DEPTH};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Deliberately permissive; we're not trying to fully validate RFC 5322,
    // just catch obviously malformed input the way a form field would.
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email regex is valid");
}

/// Validates a single field's value against its definition, with access to
/// the full row for predicates that compare across fields (spec §4.2).
/// Returns the list of error messages for this field (empty if valid).
pub fn validate_field(def: &FieldDefinition, value: Option<&Value>, row: &FieldSet) -> Vec<String> {
    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => {
            return if def.required {
                vec!["field is required".to_string()]
            } else {
                Vec::new()
            };
        }
    };

    let mut errors = Vec::new();

    if let Err(depth_err) = check_depth(value) {
        errors.push(depth_err);
        return errors;
    }

    if let Err(e) = check_type(def.field_type, value) {
        errors.push(e);
    }

    for restriction in &def.restrictions {
        if let Err(e) = check_restriction(restriction, value, row) {
            errors.push(e);
        }
    }

    errors
}

fn check_depth(value: &Value) -> Result<(), String> {
    if value.depth() > MAX_DEPTH {
        return Err(format!(
            "value nesting exceeds the maximum depth of {MAX_DEPTH}"
        ));
    }
    Ok(())
}

fn check_type(field_type: FieldType, value: &Value) -> Result<(), String> {
    match field_type {
        // Compound types are intentionally not shape-checked here; their
        // contents are whatever the mapper produced.
        FieldType::Object | FieldType::Array => Ok(()),
        FieldType::String => match value {
            Value::String(_) => Ok(()),
            _ => Err("expected a string".to_string()),
        },
        FieldType::Number => match value {
            Value::Number(_) => Ok(()),
            _ => Err("expected a number".to_string()),
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(()),
            _ => Err("expected a boolean".to_string()),
        },
        FieldType::Date => match value {
            Value::String(s) => {
                if chrono::DateTime::parse_from_rfc3339(s).is_ok()
                    || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                {
                    Ok(())
                } else {
                    Err(format!("'{s}' is not a recognized date"))
                }
            }
            _ => Err("expected a date string".to_string()),
        },
        FieldType::Email => match value {
            Value::String(s) if EMAIL_RE.is_match(s) => Ok(()),
            Value::String(s) => Err(format!("'{s}' is not a valid email address")),
            _ => Err("expected an email string".to_string()),
        },
        FieldType::Url => match value {
            Value::String(s) => url::Url::parse(s)
                .map(|_| ())
                .map_err(|_| format!("'{s}' is not a valid URL")),
            _ => Err("expected a URL string".to_string()),
        },
        FieldType::SingleChoice => match value {
            Value::String(_) => Ok(()),
            _ => Err("expected a single choice string".to_string()),
        },
        FieldType::MultiChoice => match value {
            Value::Array(items) if items.iter().all(|v| matches!(v, Value::String(_))) => Ok(()),
            _ => Err("expected an array of choice strings".to_string()),
        },
    }
}

fn check_restriction(restriction: &Restriction, value: &Value, row: &FieldSet) -> Result<(), String> {
    match restriction {
        Restriction::MinLength(min) => match value {
            Value::String(s) if s.chars().count() < *min => {
                Err(format!("must be at least {min} characters"))
            }
            Value::Array(items) if items.len() < *min => {
                Err(format!("must have at least {min} items"))
            }
            _ => Ok(()),
        },
        Restriction::MaxLength(max) => match value {
            Value::String(s) if s.chars().count() > *max => {
                Err(format!("must be at most {max} characters"))
            }
            Value::Array(items) if items.len() > *max => {
                Err(format!("must have at most {max} items"))
            }
            _ => Ok(()),
        },
        Restriction::MinValue(min) => match value {
            Value::Number(n) if n.as_f64().unwrap_or(f64::NAN) < *min => {
                Err(format!("must be at least {min}"))
            }
            _ => Ok(()),
        },
        Restriction::MaxValue(max) => match value {
            Value::Number(n) if n.as_f64().unwrap_or(f64::NAN) > *max => {
                Err(format!("must be at most {max}"))
            }
            _ => Ok(()),
        },
        Restriction::Pattern(re) => match value {
            Value::String(s) if !re.is_match(s) => {
                Err(format!("'{s}' does not match pattern {}", re.as_str()))
            }
            _ => Ok(()),
        },
        Restriction::Choices {
            options,
            case_sensitive,
        } => {
            let candidates: Vec<&str> = match value {
                Value::String(s) => vec![s.as_str()],
                Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
                _ => return Ok(()),
            };
            for candidate in candidates {
                let found = options.iter().any(|o| {
                    if *case_sensitive {
                        o == candidate
                    } else {
                        o.eq_ignore_ascii_case(candidate)
                    }
                });
                if !found {
                    return Err(format!("'{candidate}' is not one of the allowed choices"));
                }
            }
            Ok(())
        }
        Restriction::Custom(predicate) => predicate(value, row),
    }
}
