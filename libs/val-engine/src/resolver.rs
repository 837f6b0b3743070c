use serde_json::Value;
use val_api::symbol::SymbolTable;

/// Resolve a raw enum field against its symbol table.
///
/// Strings are upper-cased before lookup; an integer that names a member of
/// the table is taken as-is. Anything else, including an absent field, maps
/// to the table's fallback. Never fails.
pub fn resolve(table: &SymbolTable, raw: Option<&Value>) -> i32 {
    let resolved = match raw {
        Some(Value::String(s)) => table.value(&s.to_uppercase()),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .filter(|v| table.contains(*v)),
        _ => None,
    };

    match resolved {
        Some(v) => v,
        None => {
            if let Some(raw) = raw {
                tracing::debug!(
                    table = table.name,
                    raw = %raw,
                    fallback = table.symbol(table.fallback).unwrap_or("?"),
                    "unresolved enum value, using fallback"
                );
            }
            table.fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use val_api::record::{alert, location};

    #[test]
    fn test_resolve_case_insensitive() {
        assert_eq!(
            resolve(&alert::PRIORITY, Some(&json!("warning"))),
            alert::Priority::Warning as i32
        );
        assert_eq!(
            resolve(&alert::PRIORITY, Some(&json!("Emergency_Alarm"))),
            alert::Priority::EmergencyAlarm as i32
        );
    }

    #[test]
    fn test_resolve_unknown_symbol_falls_back() {
        assert_eq!(
            resolve(&alert::PRIORITY, Some(&json!("bogus"))),
            alert::Priority::Unknown as i32
        );
    }

    #[test]
    fn test_resolve_absent_falls_back() {
        assert_eq!(resolve(&alert::AUDIO, None), alert::Audio::Unknown as i32);
    }

    #[test]
    fn test_quality_falls_back_to_no_fix() {
        assert_eq!(
            resolve(&location::QUALITY, Some(&json!("SATELLITE"))),
            location::Quality::NoFix as i32
        );
        assert_eq!(
            resolve(&location::QUALITY, Some(&json!("rtk_fixed"))),
            location::Quality::RtkFixed as i32
        );
    }

    #[test]
    fn test_resolve_numeric() {
        assert_eq!(resolve(&alert::VISUAL, Some(&json!(3))), alert::Visual::Flashing as i32);
        assert_eq!(resolve(&alert::VISUAL, Some(&json!(99))), alert::Visual::Unknown as i32);
        assert_eq!(resolve(&alert::VISUAL, Some(&json!(-1))), alert::Visual::Unknown as i32);
    }

    #[test]
    fn test_resolve_wrong_type_falls_back() {
        assert_eq!(resolve(&alert::CATEGORY, Some(&json!(null))), 0);
        assert_eq!(resolve(&alert::CATEGORY, Some(&json!(true))), 0);
        assert_eq!(resolve(&alert::CATEGORY, Some(&json!({"a": 1}))), 0);
    }
}
