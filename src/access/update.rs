use serde_json::Value;

use crate::error::ApiError;
use crate::store::{Resource, Store};
use crate::validation::validate_required_fields;

/// Validate that `payload` carries a `new_data` object and apply it as a
/// field-by-field patch to `resource`. A missing `new_data` key is a
/// validation failure; a patch naming an unknown field is rejected by the
/// store with a distinct failure shape.
pub async fn update_resource(
    store: &dyn Store,
    payload: &Value,
    resource: &Resource,
) -> Result<(), ApiError> {
    if let Err(missing) = validate_required_fields(&["new_data"], payload, true) {
        return Err(ApiError::Validation { missing });
    }
    let patch = match payload.get("new_data") {
        Some(Value::Object(map)) => map,
        _ => {
            return Err(ApiError::Validation {
                missing: "new_data".to_string(),
            })
        }
    };
    store.update(resource, patch).await?;
    Ok(())
}
