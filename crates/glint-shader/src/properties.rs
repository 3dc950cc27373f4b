//! Declarative schemas of configurable shader inputs
//!
//! A schema is the single source of truth for "what is configurable" on a
//! shader. The UI layer generates controls from it and never mutates it;
//! the shader pulls a typed snapshot out of the host's live settings
//! object, so compilation never touches UI-owned state.

use glint_core::{GlintError, PropertyGroup, PropertyKind, PropertyValue, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One configurable input: its kind, identity, UI strings, and the value
/// snapshotted at the last extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShaderProperty {
    pub kind: PropertyKind,
    pub id: String,
    pub label: String,
    pub description: String,
    pub required: bool,
    pub value: Option<PropertyValue>,
}

/// Insertion-ordered property collection. Order is significant for UI
/// presentation, not for compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShaderProperties {
    properties: Vec<ShaderProperty>,
}

impl ShaderProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an optional property descriptor
    pub fn add(&mut self, kind: PropertyKind, id: &str, label: &str, description: &str) {
        self.push(kind, id, label, description, false);
    }

    /// Append a property the settings object must always supply
    pub fn add_required(&mut self, kind: PropertyKind, id: &str, label: &str, description: &str) {
        self.push(kind, id, label, description, true);
    }

    fn push(&mut self, kind: PropertyKind, id: &str, label: &str, description: &str, required: bool) {
        self.properties.push(ShaderProperty {
            kind,
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            required,
            value: None,
        });
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShaderProperty> {
        self.properties.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ShaderProperty> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// The snapshotted value of a property, if one was extracted
    pub fn value(&self, id: &str) -> Option<&PropertyValue> {
        self.get(id)?.value.as_ref()
    }

    /// Convenience accessor for file-kind properties
    pub fn path(&self, id: &str) -> Option<&Path> {
        self.value(id)?.as_path()
    }

    /// Copy the current value of every descriptor out of `settings`.
    ///
    /// Extraction is strict: a missing required field or a value of the
    /// wrong shape fails loudly instead of coercing. The one deliberate
    /// accommodation is that file-kind properties accept strings (the
    /// natural settings encoding for a path); an empty string means unset.
    pub fn from_property_group(&mut self, settings: &dyn PropertyGroup) -> Result<()> {
        for prop in &mut self.properties {
            prop.value = match settings.property(&prop.id) {
                None => None,
                Some(value) => match (prop.kind, value) {
                    (
                        PropertyKind::SourceFile | PropertyKind::Image,
                        PropertyValue::Text(text),
                    ) => {
                        if text.is_empty() {
                            None
                        } else {
                            Some(PropertyValue::Path(text.into()))
                        }
                    }
                    (kind, value) if value.matches_kind(kind) => Some(value),
                    (kind, value) => {
                        return Err(GlintError::PropertyKindMismatch {
                            field: prop.id.clone(),
                            expected: kind.type_name().to_string(),
                            got: value.type_name().to_string(),
                        })
                    }
                },
            };
            if prop.required && prop.value.is_none() {
                return Err(GlintError::MissingProperty(prop.id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn schema() -> ShaderProperties {
        let mut props = ShaderProperties::new();
        props.add_required(
            PropertyKind::SourceFile,
            "vert_filename",
            "Vertex",
            "GLSL vertex shader source file",
        );
        props.add(PropertyKind::Image, "diffuse", "Diffuse", "Diffuse image");
        props.add(PropertyKind::Scalar, "exposure", "Exposure", "");
        props
    }

    #[test]
    fn extracts_values_in_insertion_order() {
        let mut props = schema();
        let mut settings = HashMap::new();
        settings.insert(
            "vert_filename".to_string(),
            PropertyValue::Path(PathBuf::from("main.vert")),
        );
        settings.insert("exposure".to_string(), PropertyValue::Scalar(1.5));

        props.from_property_group(&settings).unwrap();

        let ids: Vec<&str> = props.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["vert_filename", "diffuse", "exposure"]);
        assert_eq!(props.path("vert_filename"), Some(Path::new("main.vert")));
        assert_eq!(props.value("diffuse"), None);
        assert_eq!(
            props.value("exposure"),
            Some(&PropertyValue::Scalar(1.5))
        );
    }

    #[test]
    fn missing_required_field_fails() {
        let mut props = schema();
        let settings: HashMap<String, PropertyValue> = HashMap::new();
        let err = props.from_property_group(&settings).unwrap_err();
        assert!(matches!(err, GlintError::MissingProperty(field) if field == "vert_filename"));
    }

    #[test]
    fn kind_mismatch_fails_instead_of_coercing() {
        let mut props = schema();
        let mut settings = HashMap::new();
        settings.insert(
            "vert_filename".to_string(),
            PropertyValue::Path(PathBuf::from("main.vert")),
        );
        settings.insert("exposure".to_string(), PropertyValue::Bool(true));

        let err = props.from_property_group(&settings).unwrap_err();
        match err {
            GlintError::PropertyKindMismatch { field, expected, got } => {
                assert_eq!(field, "exposure");
                assert_eq!(expected, "scalar");
                assert_eq!(got, "bool");
            }
            other => panic!("expected PropertyKindMismatch, got {other:?}"),
        }
    }

    #[test]
    fn file_kind_accepts_strings_from_toml_settings() {
        let mut props = schema();
        let settings: toml::value::Table = toml::from_str(
            r#"
            vert_filename = "shaders/main.vert"
            diffuse = ""
            "#,
        )
        .unwrap();

        props.from_property_group(&settings).unwrap();
        assert_eq!(
            props.path("vert_filename"),
            Some(Path::new("shaders/main.vert"))
        );
        // Empty string means unset, not a zero-length path
        assert_eq!(props.value("diffuse"), None);
    }

    #[test]
    fn empty_required_file_field_fails() {
        let mut props = schema();
        let mut settings = HashMap::new();
        settings.insert(
            "vert_filename".to_string(),
            PropertyValue::Text(String::new()),
        );
        let err = props.from_property_group(&settings).unwrap_err();
        assert!(matches!(err, GlintError::MissingProperty(_)));
    }
}
