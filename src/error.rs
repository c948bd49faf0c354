use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a QGIS project or translating it to a mapfile.
#[derive(Error, Debug)]
pub enum Qgis2MapError {
    /// A required element or attribute is absent from the project document.
    #[error("missing required field `{field}`{}", layer_suffix(.layer))]
    MissingField {
        field: String,
        layer: Option<String>,
    },

    /// A field is present but its value cannot be interpreted.
    #[error("invalid value `{value}` for field `{field}`{}", layer_suffix(.layer))]
    InvalidValue {
        field: String,
        value: String,
        layer: Option<String>,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("project document has no root element")]
    EmptyDocument,

    #[error("no .qgs project found in archive {0}")]
    NoProjectInArchive(PathBuf),

    #[error("formatting error while writing the mapfile: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Qgis2MapError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            layer: None,
        }
    }

    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            layer: None,
        }
    }

    /// Attaches the layer being translated, unless one is already recorded.
    pub fn in_layer(mut self, name: &str) -> Self {
        match &mut self {
            Self::MissingField { layer, .. } | Self::InvalidValue { layer, .. }
                if layer.is_none() =>
            {
                *layer = Some(name.to_string());
            }
            _ => {}
        }
        self
    }
}

fn layer_suffix(layer: &Option<String>) -> String {
    match layer {
        Some(name) => format!(" in layer '{}'", name),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Qgis2MapError>;
