use std::fmt;

use tracing::debug;

use super::connection::{Connection, PostgisConnection, WmsConnection};
use super::renderer::Renderer;
use crate::error::{Qgis2MapError, Result};
use crate::parser::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl GeometryKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "point" => Some(Self::Point),
            "line" => Some(Self::Line),
            "polygon" => Some(Self::Polygon),
            _ => None,
        }
    }

    /// Point and line styles carry a `SIZE`, polygon styles do not.
    pub fn has_size(self) -> bool {
        matches!(self, Self::Point | Self::Line)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Point => "POINT",
            Self::Line => "LINE",
            Self::Polygon => "POLYGON",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSource {
    Vector(GeometryKind),
    Raster,
}

impl LayerSource {
    pub fn geometry(self) -> Option<GeometryKind> {
        match self {
            Self::Vector(geometry) => Some(geometry),
            Self::Raster => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    None,
    Postgres,
    Wms,
    Other(String),
}

impl From<Option<&str>> for ProviderKind {
    fn from(value: Option<&str>) -> Self {
        match value {
            None => Self::None,
            Some("postgres") => Self::Postgres,
            Some("wms") => Self::Wms,
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

/// Scale range a layer is restricted to. Empty bounds are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleRange {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConfig {
    pub field: String,
    /// The layer's label flag; only gates `LABELITEM`.
    pub enabled: bool,
    pub angle: Option<String>,
    pub buffer: Option<String>,
}

impl LabelConfig {
    fn from_layer(layer: &Element) -> Option<Self> {
        let attributes = layer.find("labelattributes")?;
        let field = attributes.find("label")?.attr("field")?.trim();
        if field.is_empty() {
            return None;
        }
        let value = |name: &str| {
            attributes
                .find(name)
                .and_then(|e| e.attr("value"))
                .map(str::to_string)
        };
        Some(Self {
            field: field.to_string(),
            enabled: layer.child("label").and_then(Element::text) == Some("1"),
            angle: value("angle"),
            buffer: value("buffersize"),
        })
    }
}

/// A QGIS map layer with everything the mapfile needs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerNode {
    pub name: String,
    pub source: LayerSource,
    pub data_source: String,
    pub provider: ProviderKind,
    pub connection: Connection,
    pub proj4: String,
    pub transparency: u8,
    pub scale_range: Option<ScaleRange>,
    pub label: Option<LabelConfig>,
    pub renderer: Renderer,
}

impl LayerNode {
    /// Builds a layer from its `maplayer` element. `index` identifies the
    /// layer in errors when it has no name.
    pub fn from_element(element: &Element, index: usize) -> Result<Self> {
        let name = element
            .find_text("layername")
            .ok_or_else(|| Qgis2MapError::missing("layername").in_layer(&format!("#{}", index + 1)))?
            .to_string();
        Self::read(element, name.clone()).map_err(|e| e.in_layer(&name))
    }

    fn read(element: &Element, name: String) -> Result<Self> {
        let source = match element.attr("type") {
            Some("vector") => {
                let geometry = element
                    .attr("geometry")
                    .ok_or_else(|| Qgis2MapError::missing("maplayer@geometry"))?;
                LayerSource::Vector(
                    GeometryKind::parse(geometry)
                        .ok_or_else(|| Qgis2MapError::invalid("maplayer@geometry", geometry))?,
                )
            }
            Some("raster") => LayerSource::Raster,
            Some(other) => return Err(Qgis2MapError::invalid("maplayer@type", other)),
            None => return Err(Qgis2MapError::missing("maplayer@type")),
        };

        let data_source = element
            .find_text("datasource")
            .ok_or_else(|| Qgis2MapError::missing("datasource"))?
            .to_string();

        let provider = ProviderKind::from(element.find_text("provider"));
        let connection = match (&provider, source) {
            (ProviderKind::Postgres, _) => Connection::Postgis(PostgisConnection::parse(&data_source)),
            (ProviderKind::Wms, LayerSource::Raster) => {
                Connection::Wms(WmsConnection::from_layer(element, &data_source)?)
            }
            (provider, _) => {
                if let ProviderKind::Other(kind) = provider {
                    debug!("Provider '{}' written as a plain DATA source", kind);
                }
                Connection::Data(data_source.clone())
            }
        };

        let proj4 = element
            .find_text("proj4")
            .ok_or_else(|| Qgis2MapError::missing("proj4"))?
            .to_string();

        let transparency_text = element
            .find_text("transparencyLevelInt")
            .ok_or_else(|| Qgis2MapError::missing("transparencyLevelInt"))?;
        let transparency: u8 = transparency_text
            .parse()
            .map_err(|_| Qgis2MapError::invalid("transparencyLevelInt", transparency_text))?;

        Ok(Self {
            name,
            source,
            data_source,
            provider,
            connection,
            proj4,
            transparency,
            scale_range: scale_range(element),
            label: LabelConfig::from_layer(element),
            renderer: Renderer::from_layer(element)?,
        })
    }

    pub fn geometry(&self) -> Option<GeometryKind> {
        self.source.geometry()
    }

    /// Opacity as the 0-100 percentage MapServer calls `TRANSPARENCY`.
    pub fn transparency_percent(&self) -> u8 {
        (100.0 * f64::from(self.transparency) / 255.0).round() as u8
    }
}

// The flag is compared as text: only "1" enables the range.
fn scale_range(element: &Element) -> Option<ScaleRange> {
    if element.attr("scaleBasedVisibilityFlag") != Some("1") {
        return None;
    }
    let bound = |name: &str| {
        element
            .attr(name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    Some(ScaleRange {
        min: bound("minScale"),
        max: bound("maxScale"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rgb;
    use crate::parser::parse_element_tree;

    fn vector_layer(attributes: &str, body: &str) -> String {
        format!(
            r#"<maplayer type="vector" {}>
                 <layername>parcels</layername>
                 <datasource>/data/parcels.shp</datasource>
                 <transparencyLevelInt>255</transparencyLevelInt>
                 <coordinatetransform>
                   <sourcesrs><spatialrefsys><proj4>+proj=longlat +datum=WGS84</proj4></spatialrefsys></sourcesrs>
                 </coordinatetransform>
                 {}
               </maplayer>"#,
            attributes, body
        )
    }

    fn build(xml: &str) -> Result<LayerNode> {
        let element = parse_element_tree(xml.as_bytes()).unwrap();
        LayerNode::from_element(&element, 0)
    }

    #[test]
    fn test_vector_layer() {
        let layer = build(&vector_layer(
            r#"geometry="Polygon""#,
            r#"<provider>ogr</provider>
               <singlesymbol><symbol><fillcolor red="1" green="1" blue="1"/></symbol></singlesymbol>"#,
        ))
        .unwrap();

        assert_eq!(layer.name, "parcels");
        assert_eq!(layer.source, LayerSource::Vector(GeometryKind::Polygon));
        assert_eq!(layer.provider, ProviderKind::Other("ogr".to_string()));
        assert_eq!(layer.connection, Connection::Data("/data/parcels.shp".to_string()));
        assert_eq!(layer.proj4, "+proj=longlat +datum=WGS84");
        assert_eq!(layer.transparency_percent(), 100);
        assert_eq!(layer.scale_range, None);
        assert_eq!(layer.label, None);
        match layer.renderer {
            Renderer::SingleSymbol(style) => assert_eq!(style.fill, Some(Rgb::new(1, 1, 1))),
            other => panic!("unexpected renderer: {other:?}"),
        }
    }

    #[test]
    fn test_missing_name() {
        let xml = r#"<maplayer type="raster"><datasource>x.tif</datasource></maplayer>"#;
        match build(xml) {
            Err(Qgis2MapError::MissingField { field, layer }) => {
                assert_eq!(field, "layername");
                assert_eq!(layer.as_deref(), Some("#1"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_geometry() {
        match build(&vector_layer("", "")) {
            Err(Qgis2MapError::MissingField { field, layer }) => {
                assert_eq!(field, "maplayer@geometry");
                assert_eq!(layer.as_deref(), Some("parcels"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_geometry() {
        assert!(matches!(
            build(&vector_layer(r#"geometry="Unknown geometry""#, "")),
            Err(Qgis2MapError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_transparency_rounding() {
        let percent = |value: u8| {
            let xml = vector_layer(r#"geometry="Point""#, "")
                .replace(">255<", &format!(">{}<", value));
            build(&xml).unwrap().transparency_percent()
        };
        assert_eq!(percent(255), 100);
        assert_eq!(percent(0), 0);
        assert_eq!(percent(128), 50);
        assert_eq!(percent(127), 50);
        assert_eq!(percent(1), 0);
        assert_eq!(percent(2), 1);
    }

    #[test]
    fn test_transparency_out_of_range() {
        let xml = vector_layer(r#"geometry="Point""#, "").replace(">255<", ">256<");
        assert!(matches!(build(&xml), Err(Qgis2MapError::InvalidValue { .. })));
    }

    #[test]
    fn test_scale_flag_is_compared_as_text() {
        let layer = build(&vector_layer(
            r#"geometry="Line" scaleBasedVisibilityFlag="1" minScale="1000" maxScale="""#,
            "",
        ))
        .unwrap();
        assert_eq!(
            layer.scale_range,
            Some(ScaleRange {
                min: Some("1000".to_string()),
                max: None,
            })
        );

        let layer = build(&vector_layer(
            r#"geometry="Line" scaleBasedVisibilityFlag="true" minScale="1000" maxScale="5000""#,
            "",
        ))
        .unwrap();
        assert_eq!(layer.scale_range, None);
    }

    #[test]
    fn test_label_config() {
        let layer = build(&vector_layer(
            r#"geometry="Point""#,
            r#"<label>1</label>
               <labelattributes>
                 <label text="" field="NAME"/>
                 <angle value="45" fieldname=""/>
                 <buffersize value="2" units="pt" fieldname=""/>
               </labelattributes>"#,
        ))
        .unwrap();
        assert_eq!(
            layer.label,
            Some(LabelConfig {
                field: "NAME".to_string(),
                enabled: true,
                angle: Some("45".to_string()),
                buffer: Some("2".to_string()),
            })
        );
    }

    #[test]
    fn test_label_without_field_or_flag() {
        let layer = build(&vector_layer(
            r#"geometry="Point""#,
            r#"<label>1</label><labelattributes><label text="" field=""/></labelattributes>"#,
        ))
        .unwrap();
        assert_eq!(layer.label, None);

        let layer = build(&vector_layer(
            r#"geometry="Point""#,
            r#"<label>0</label><labelattributes><label field="NAME"/></labelattributes>"#,
        ))
        .unwrap();
        let label = layer.label.unwrap();
        assert!(!label.enabled);
        assert_eq!(label.angle, None);
    }

    #[test]
    fn test_postgres_provider() {
        let xml = vector_layer(r#"geometry="Point""#, "<provider>postgres</provider>")
            .replace("/data/parcels.shp", "dbname=gis table=wells (geom)");
        let layer = build(&xml).unwrap();
        match layer.connection {
            Connection::Postgis(pg) => {
                assert_eq!(pg.dbname, "gis");
                assert_eq!(pg.data_statement(), "geom FROM wells");
            }
            other => panic!("unexpected connection: {other:?}"),
        }
    }

    #[test]
    fn test_wms_provider_on_vector_is_plain_data() {
        let layer = build(&vector_layer(r#"geometry="Point""#, "<provider>wms</provider>")).unwrap();
        assert_eq!(layer.provider, ProviderKind::Wms);
        assert!(matches!(layer.connection, Connection::Data(_)));
    }
}
