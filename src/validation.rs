use serde_json::Value;

/// Check that every key in `keys` is carried by `payload` with a usable
/// value. A present string must be non-blank and a present non-string must
/// be non-null, unless `allow_empty` relaxes both. Returns the comma-joined
/// names of the failing keys, in input order, on failure.
pub fn validate_required_fields(
    keys: &[&str],
    payload: &Value,
    allow_empty: bool,
) -> Result<(), String> {
    let mut missing: Vec<&str> = Vec::new();
    for key in keys {
        match payload.get(*key) {
            None => missing.push(key),
            Some(Value::String(s)) if s.trim().is_empty() && !allow_empty => missing.push(key),
            Some(Value::Null) if !allow_empty => missing.push(key),
            Some(_) => {}
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing.join(", "))
    }
}
