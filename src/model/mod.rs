pub mod connection;
pub mod layer;
pub mod renderer;

pub use connection::{Connection, PostgisConnection, WmsConnection, WmsSubLayer};
pub use layer::{GeometryKind, LabelConfig, LayerNode, LayerSource, ProviderKind, ScaleRange};
pub use renderer::{ClassDefinition, Renderer, Rgb, StyleSpec, SymbolSpec};

use crate::error::{Qgis2MapError, Result};
use crate::parser::Element;

/// Map extent as written in the project, kept as decimal strings so the
/// mapfile reproduces them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extent {
    pub xmin: String,
    pub ymin: String,
    pub xmax: String,
    pub ymax: String,
}

/// A parsed QGIS project.
#[derive(Debug, Clone)]
pub struct ProjectDocument {
    root: Element,
    source: Option<String>,
}

impl ProjectDocument {
    pub fn new(root: Element, source: Option<String>) -> Self {
        Self { root, source }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Where the project was loaded from, if known.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn extent(&self) -> Result<Extent> {
        let bound = |name: &str| {
            self.root
                .find_text(name)
                .map(str::to_string)
                .ok_or_else(|| Qgis2MapError::missing(name))
        };
        Ok(Extent {
            xmin: bound("xmin")?,
            ymin: bound("ymin")?,
            xmax: bound("xmax")?,
            ymax: bound("ymax")?,
        })
    }

    /// proj4 text of the map's destination coordinate system.
    ///
    /// Projects carry no global CRS definition, so this is taken from the
    /// first `destinationsrs` element, which normally belongs to the first
    /// layer. Layers declaring another destination are not consulted.
    pub fn destination_proj4(&self) -> Result<&str> {
        self.root
            .find("destinationsrs")
            .and_then(|srs| srs.find_text("proj4"))
            .ok_or_else(|| Qgis2MapError::missing("destinationsrs/proj4"))
    }

    /// Every `maplayer` in document order.
    pub fn layers(&self) -> Result<Vec<LayerNode>> {
        self.root
            .find_all("maplayer")
            .into_iter()
            .enumerate()
            .map(|(index, element)| LayerNode::from_element(element, index))
            .collect()
    }
}
