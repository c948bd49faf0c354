use std::fmt::Write;

use super::class::write_renderer;
use crate::error::Result;
use crate::model::{Connection, LayerNode, LayerSource};
use crate::proj4::format_proj4;
use crate::symbol::SymbolRegistry;

/// Writes one `LAYER` block, registering the symbols its styles use.
pub(crate) fn write_layer(
    out: &mut String,
    layer: &LayerNode,
    symbols: &mut SymbolRegistry,
) -> Result<()> {
    writeln!(out, "  LAYER")?;
    writeln!(out, "    NAME '{}'", layer.name)?;
    match layer.source {
        LayerSource::Vector(geometry) => writeln!(out, "    TYPE {}", geometry)?,
        LayerSource::Raster => writeln!(out, "    TYPE RASTER")?,
    }

    if let Some(range) = &layer.scale_range {
        if let Some(min) = &range.min {
            writeln!(out, "    MINSCALE {}", min)?;
        }
        if let Some(max) = &range.max {
            writeln!(out, "    MAXSCALE {}", max)?;
        }
    }

    match &layer.connection {
        Connection::Postgis(pg) => {
            writeln!(out, "    CONNECTIONTYPE postgis")?;
            writeln!(out, "    CONNECTION '{}'", pg.connection_string())?;
            writeln!(out, "    DATA '{}'", pg.data_statement())?;
        }
        Connection::Wms(wms) => {
            writeln!(out, "    CONNECTIONTYPE WMS")?;
            writeln!(out, "    CONNECTION '{}'", wms.url)?;
            writeln!(out, "    METADATA")?;
            writeln!(out, "      'wms_name' '{}'", wms.names())?;
            writeln!(out, "      'wms_server_version' '1.1.1'")?;
            writeln!(out, "      'wms_srs' 'EPSG:4326 EPSG:{}'", wms.epsg)?;
            writeln!(out, "      'wms_format' '{}'", wms.format)?;
            writeln!(out, "      'wms_style' '{}'", wms.styles())?;
            writeln!(out, "    END")?;
        }
        Connection::Data(data) => writeln!(out, "    DATA '{}'", data)?,
    }

    writeln!(out, "    METADATA")?;
    writeln!(out, "      'wms_title' '{}'", layer.name)?;
    writeln!(out, "    END")?;

    writeln!(out, "    STATUS DEFAULT")?;
    writeln!(out, "    TRANSPARENCY {}", layer.transparency_percent())?;

    writeln!(out, "    PROJECTION")?;
    out.push_str(&format_proj4(&layer.proj4, "      "));
    writeln!(out, "    END")?;

    if let Some(label) = layer.label.as_ref().filter(|label| label.enabled) {
        writeln!(out, "    LABELITEM '{}'", label.field)?;
    }

    write_renderer(out, layer, symbols)?;

    writeln!(out, "  END")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        GeometryKind, LabelConfig, PostgisConnection, ProviderKind, Renderer, ScaleRange,
        WmsConnection, WmsSubLayer,
    };

    fn layer(source: LayerSource, connection: Connection) -> LayerNode {
        LayerNode {
            name: "rivers".to_string(),
            source,
            data_source: String::new(),
            provider: ProviderKind::None,
            connection,
            proj4: "+proj=longlat +datum=WGS84".to_string(),
            transparency: 128,
            scale_range: None,
            label: None,
            renderer: Renderer::None,
        }
    }

    fn render(layer: &LayerNode) -> String {
        let mut out = String::new();
        write_layer(&mut out, layer, &mut SymbolRegistry::new()).unwrap();
        out
    }

    #[test]
    fn test_plain_data_layer() {
        let out = render(&layer(
            LayerSource::Vector(GeometryKind::Line),
            Connection::Data("/data/rivers.shp".to_string()),
        ));
        assert_eq!(
            out,
            "  LAYER
    NAME 'rivers'
    TYPE LINE
    DATA '/data/rivers.shp'
    METADATA
      'wms_title' 'rivers'
    END
    STATUS DEFAULT
    TRANSPARENCY 50
    PROJECTION
      'proj=longlat'
      'datum=WGS84'
    END
  END

"
        );
    }

    #[test]
    fn test_postgis_layer() {
        let pg = PostgisConnection::parse("host=db1 dbname=hydro user=me password=pw table=rivers");
        let out = render(&layer(
            LayerSource::Vector(GeometryKind::Line),
            Connection::Postgis(pg),
        ));
        assert!(out.contains("    CONNECTIONTYPE postgis\n"));
        assert!(out.contains("    CONNECTION 'host=db1 dbname=hydro password=pw user=me'\n"));
        assert!(out.contains("    DATA 'the_geom FROM rivers'\n"));
    }

    #[test]
    fn test_wms_layer_has_two_metadata_blocks() {
        let wms = WmsConnection {
            url: "http://example.com/wms?".to_string(),
            sublayers: vec![
                WmsSubLayer {
                    name: "a".to_string(),
                    style: None,
                },
                WmsSubLayer {
                    name: "b".to_string(),
                    style: Some("s".to_string()),
                },
            ],
            format: "image/jpeg".to_string(),
            epsg: "26915".to_string(),
        };
        let out = render(&layer(LayerSource::Raster, Connection::Wms(wms)));

        assert!(out.contains("    TYPE RASTER\n"));
        assert!(out.contains("    CONNECTIONTYPE WMS\n"));
        assert!(out.contains("    CONNECTION 'http://example.com/wms?'\n"));
        assert!(out.contains("      'wms_name' 'a,b'\n"));
        assert!(out.contains("      'wms_srs' 'EPSG:4326 EPSG:26915'\n"));
        assert!(out.contains("      'wms_format' 'image/jpeg'\n"));
        assert!(out.contains("      'wms_style' ',s'\n"));
        assert_eq!(out.matches("    METADATA\n").count(), 2);
        assert!(!out.contains("DATA '"));
    }

    #[test]
    fn test_scale_range_and_label_item() {
        let mut node = layer(
            LayerSource::Vector(GeometryKind::Point),
            Connection::Data("wells.shp".to_string()),
        );
        node.scale_range = Some(ScaleRange {
            min: Some("100".to_string()),
            max: Some("25000".to_string()),
        });
        node.label = Some(LabelConfig {
            field: "NAME".to_string(),
            enabled: true,
            angle: None,
            buffer: None,
        });
        let out = render(&node);
        assert!(out.contains("    TYPE POINT\n    MINSCALE 100\n    MAXSCALE 25000\n"));
        assert!(out.contains("    LABELITEM 'NAME'\n"));

        node.label.as_mut().unwrap().enabled = false;
        assert!(!render(&node).contains("LABELITEM"));
    }
}
