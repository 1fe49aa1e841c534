//! Record name and namespace derivation
//!
//! Names and namespaces are derived from free-form identifiers: record names
//! from element paths, namespaces from canonical structure-definition URLs.
//! A URL outside the canonical shape is a fatal compilation error; there is
//! no fallback namespace.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SchemaError;

/// Namespace root for all generated records.
pub const ROOT_NAMESPACE: &str = "org.octofhir.avro";

static STRUCTURE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^http://hl7\.org/fhir(/.*)?/StructureDefinition/([^/]+)$")
        .expect("structure definition URL pattern is valid")
});

/// Record name for an element path: the path with separators removed, so
/// `Patient.contact` becomes `Patientcontact`.
pub fn record_name_for(element_path: &str) -> String {
    element_path.replace('.', "")
}

/// Namespace for a canonical structure-definition URL.
///
/// `http://hl7.org/fhir/StructureDefinition/Patient` maps to the root
/// namespace; a profile segment, as in
/// `http://hl7.org/fhir/us/core/StructureDefinition/Patient`, is appended to
/// the root with path separators turned into namespace separators.
pub fn namespace_for(structure_definition_url: &str) -> Result<String, SchemaError> {
    let captures = STRUCTURE_URL_PATTERN
        .captures(structure_definition_url)
        .ok_or_else(|| {
            SchemaError::UnrecognizedStructureUrl(structure_definition_url.to_string())
        })?;

    match captures.get(1) {
        Some(profile) if !profile.as_str().is_empty() => {
            Ok(format!("{ROOT_NAMESPACE}{}", profile.as_str().replace('/', ".")))
        }
        _ => Ok(ROOT_NAMESPACE.to_string()),
    }
}

/// Record name for a parent extension: the URL's trailing segment, split on
/// hyphen and underscore, each part capitalized and joined.
pub fn extension_record_name(extension_url: &str) -> String {
    trailing_segment(extension_url)
        .split(['-', '_'])
        .map(capitalize)
        .collect()
}

/// Trailing path segment of a URI, or the whole string when it has none.
pub fn trailing_segment(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Lower-case the first character, for choice field names.
pub fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_record_name_concatenates_path_segments() {
        assert_eq!(record_name_for("Patient"), "Patient");
        assert_eq!(record_name_for("Patient.contact.name"), "Patientcontactname");
    }

    #[rstest]
    #[case("http://hl7.org/fhir/StructureDefinition/Patient", "org.octofhir.avro")]
    #[case(
        "http://hl7.org/fhir/us/core/StructureDefinition/Patient",
        "org.octofhir.avro.us.core"
    )]
    #[case(
        "http://hl7.org/fhir/some-profile/StructureDefinition/Patient",
        "org.octofhir.avro.some-profile"
    )]
    fn test_namespace_for_canonical_urls(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(namespace_for(url).unwrap(), expected);
    }

    #[rstest]
    #[case("http://example.com/StructureDefinition/Patient")]
    #[case("http://hl7.org/fhir/StructureDefinition/")]
    #[case("http://hl7.org/fhir/Patient")]
    #[case("not a url")]
    fn test_namespace_for_malformed_urls_is_fatal(#[case] url: &str) {
        assert!(matches!(
            namespace_for(url),
            Err(SchemaError::UnrecognizedStructureUrl(_))
        ));
    }

    #[test]
    fn test_extension_record_name_camel_cases_url_segment() {
        assert_eq!(
            extension_record_name("http://hl7.org/fhir/us/core/StructureDefinition/us-core-race"),
            "UsCoreRace"
        );
        assert_eq!(
            extension_record_name("http://example.com/StructureDefinition/my_extension"),
            "MyExtension"
        );
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("Quantity"), "quantity");
        assert_eq!(lower_camel("string"), "string");
        assert_eq!(lower_camel(""), "");
    }
}
