//! Property value types and the host settings-object interface

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The kind of input a shader property accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    SourceFile,
    Image,
    Scalar,
    Color,
    Bool,
    Text,
}

impl PropertyKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyKind::SourceFile => "source_file",
            PropertyKind::Image => "image",
            PropertyKind::Scalar => "scalar",
            PropertyKind::Color => "color",
            PropertyKind::Bool => "bool",
            PropertyKind::Text => "text",
        }
    }
}

/// A value pulled out of the host's settings object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Path(PathBuf),
    Scalar(f32),
    Color([f32; 4]),
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Path(_) => "path",
            PropertyValue::Scalar(_) => "scalar",
            PropertyValue::Color(_) => "color",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Text(_) => "text",
        }
    }

    /// Whether this value satisfies the declared kind of a property
    pub fn matches_kind(&self, kind: PropertyKind) -> bool {
        matches!(
            (kind, self),
            (PropertyKind::SourceFile, PropertyValue::Path(_))
                | (PropertyKind::Image, PropertyValue::Path(_))
                | (PropertyKind::Scalar, PropertyValue::Scalar(_))
                | (PropertyKind::Color, PropertyValue::Color(_))
                | (PropertyKind::Bool, PropertyValue::Bool(_))
                | (PropertyKind::Text, PropertyValue::Text(_))
        )
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            PropertyValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }
}

/// Named-field readable settings container supplied by the host UI layer.
///
/// The shader core only ever reads from this; the UI layer owns the live
/// object and its mutation.
pub trait PropertyGroup {
    fn property(&self, id: &str) -> Option<PropertyValue>;
}

impl PropertyGroup for HashMap<String, PropertyValue> {
    fn property(&self, id: &str) -> Option<PropertyValue> {
        self.get(id).cloned()
    }
}

/// TOML tables double as a settings source, with the obvious mappings.
/// Numeric arrays of length 3 or 4 are read as colors (alpha defaults to 1).
impl PropertyGroup for toml::value::Table {
    fn property(&self, id: &str) -> Option<PropertyValue> {
        match self.get(id)? {
            toml::Value::String(s) => Some(PropertyValue::Text(s.clone())),
            toml::Value::Float(f) => Some(PropertyValue::Scalar(*f as f32)),
            toml::Value::Integer(i) => Some(PropertyValue::Scalar(*i as f32)),
            toml::Value::Boolean(b) => Some(PropertyValue::Bool(*b)),
            toml::Value::Array(arr) if arr.len() == 3 || arr.len() == 4 => {
                let mut color = [0.0, 0.0, 0.0, 1.0];
                for (i, v) in arr.iter().enumerate() {
                    color[i] = match v {
                        toml::Value::Float(f) => *f as f32,
                        toml::Value::Integer(n) => *n as f32,
                        _ => return None,
                    };
                }
                Some(PropertyValue::Color(color))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_kind_accepts_path_for_file_kinds() {
        let value = PropertyValue::Path(PathBuf::from("shader.vert"));
        assert!(value.matches_kind(PropertyKind::SourceFile));
        assert!(value.matches_kind(PropertyKind::Image));
        assert!(!value.matches_kind(PropertyKind::Scalar));
    }

    #[test]
    fn toml_table_maps_values() {
        let table: toml::value::Table = toml::from_str(
            r#"
            vert_filename = "shaders/main.vert"
            intensity = 2.5
            enabled = true
            ambient_color = [0.1, 0.2, 0.3]
            "#,
        )
        .unwrap();

        assert_eq!(
            table.property("vert_filename"),
            Some(PropertyValue::Text("shaders/main.vert".to_string()))
        );
        assert_eq!(
            table.property("intensity"),
            Some(PropertyValue::Scalar(2.5))
        );
        assert_eq!(table.property("enabled"), Some(PropertyValue::Bool(true)));
        assert_eq!(
            table.property("ambient_color"),
            Some(PropertyValue::Color([0.1, 0.2, 0.3, 1.0]))
        );
        assert_eq!(table.property("missing"), None);
    }
}
