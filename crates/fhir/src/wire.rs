//! Parsing and rendering of wire resources.
//!
//! Parsing uses `serde_path_to_error` to surface a best-effort path (e.g. `name[0].given`) to
//! the failing field when the text does not match the wire schema, then checks that
//! `resourceType` names the expected resource.

use crate::datatypes::ResourceType;
use crate::{FhirError, FhirResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A top-level FHIR resource with a fixed `resourceType`.
pub trait WireResource: Serialize + DeserializeOwned {
    /// The resource type this struct models.
    const RESOURCE_TYPE: ResourceType;

    /// The `resourceType` tag as read from the wire.
    fn resource_type_tag(&self) -> &str;

    /// The logical id, if the resource carries one.
    fn id(&self) -> Option<&str>;
}

/// Parse a resource from JSON text.
///
/// # Errors
///
/// Returns [`FhirError`] if:
/// - the text is not valid JSON,
/// - any field has an unexpected type or any unknown key is present,
/// - `resourceType` does not name `R`.
pub fn parse_json<R: WireResource>(json_text: &str) -> FhirResult<R> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    let resource = serde_path_to_error::deserialize::<_, R>(&mut deserializer)
        .map_err(schema_mismatch::<R, _>)?;
    deserializer.end()?;
    check_resource_type(resource)
}

/// Parse a resource from YAML text.
///
/// # Errors
///
/// As for [`parse_json`].
pub fn parse_yaml<R: WireResource>(yaml_text: &str) -> FhirResult<R> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    let resource = serde_path_to_error::deserialize::<_, R>(deserializer)
        .map_err(schema_mismatch::<R, _>)?;
    check_resource_type(resource)
}

/// Render a resource as pretty-printed JSON.
pub fn render_json<R: WireResource>(resource: &R) -> FhirResult<String> {
    serde_json::to_string_pretty(resource).map_err(|e| {
        FhirError::Translation(format!(
            "Failed to serialise {}: {e}",
            R::RESOURCE_TYPE
        ))
    })
}

/// Render a resource as YAML.
pub fn render_yaml<R: WireResource>(resource: &R) -> FhirResult<String> {
    serde_yaml::to_string(resource).map_err(|e| {
        FhirError::Translation(format!(
            "Failed to serialise {}: {e}",
            R::RESOURCE_TYPE
        ))
    })
}

fn schema_mismatch<R: WireResource, E: std::fmt::Display>(
    err: serde_path_to_error::Error<E>,
) -> FhirError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    FhirError::Translation(format!(
        "{} schema mismatch at {path}: {source}",
        R::RESOURCE_TYPE
    ))
}

fn check_resource_type<R: WireResource>(resource: R) -> FhirResult<R> {
    let expected = R::RESOURCE_TYPE.as_str();
    if resource.resource_type_tag() != expected {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType '{expected}', got '{}'",
            resource.resource_type_tag()
        )));
    }
    Ok(resource)
}
