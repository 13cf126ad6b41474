//! Generic resource access shared by every endpoint: fetch-or-report-absence
//! and validate-then-update. Absence and empty result sets come back as
//! `Failure` values (inside `ApiError::NotFound`), never as panics or bare
//! engine errors.

pub mod update;

pub use update::update_resource;

use crate::error::{ApiError, Failure};
use crate::store::{Resource, Store};

/// Fetch one resource of `kind`, normalizing absence into a Failure naming
/// the kind.
pub async fn get_one(store: &dyn Store, kind: &str, id: i64) -> Result<Resource, ApiError> {
    match store.get(kind, id).await? {
        Some(resource) => Ok(resource),
        None => Err(ApiError::NotFound(Failure::new(
            format!("The {kind} does not exist."),
            format!("Ensure {kind}_id is of an existent {kind}."),
        ))),
    }
}

/// Fetch every resource of `kind`. An empty collection is normalized into a
/// Failure so callers branch on "no such resources" the same way everywhere.
pub async fn get_all(store: &dyn Store, kind: &str) -> Result<Vec<Resource>, ApiError> {
    let resources = store.get_all(kind).await?;
    if resources.is_empty() {
        return Err(ApiError::NotFound(Failure::new(
            format!("No {kind}s exist."),
            format!("Add {kind}s to the database."),
        )));
    }
    Ok(resources)
}

/// Case-insensitive substring match of `query` against `field` across the
/// whole collection. Linear scan; empty match sets get the same Failure
/// shape as `get_all`.
pub async fn search(
    store: &dyn Store,
    kind: &str,
    field: &str,
    query: &str,
) -> Result<Vec<Resource>, ApiError> {
    let needle = query.to_lowercase();
    let matches: Vec<Resource> = store
        .get_all(kind)
        .await?
        .into_iter()
        .filter(|r| r.str_field(field).to_lowercase().contains(&needle))
        .collect();
    if matches.is_empty() {
        return Err(ApiError::NotFound(Failure::new(
            format!("No {kind}s match the searched value."),
            "Ensure arguments are of existent objects.",
        )));
    }
    Ok(matches)
}
