use tracing::debug;

use crate::error::{Qgis2MapError, Result};
use crate::parser::Element;

/// How MapServer reaches a layer's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    Postgis(PostgisConnection),
    Wms(WmsConnection),
    /// File based sources (OGR, GDAL, GRASS) and unknown providers.
    Data(String),
}

/// PostGIS connection parameters parsed from a QGIS data source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgisConnection {
    pub host: String,
    pub dbname: String,
    pub user: String,
    pub password: String,
    pub port: Option<String>,
    pub table: String,
    pub geometry_column: String,
}

impl Default for PostgisConnection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            dbname: "gisdata".to_string(),
            user: String::new(),
            password: String::new(),
            port: None,
            table: String::new(),
            geometry_column: "the_geom".to_string(),
        }
    }
}

impl PostgisConnection {
    /// Parses a space separated list of `key=value` pairs and an optional
    /// `(column)` naming the geometry column. Single quotes around values are
    /// removed; keys the mapfile does not use are ignored.
    pub fn parse(data_source: &str) -> Self {
        let mut pg = Self::default();
        for token in data_source.split_whitespace() {
            if let Some(column) = token.strip_prefix('(') {
                pg.geometry_column = column.strip_suffix(')').unwrap_or(column).to_string();
                continue;
            }
            let Some((key, value)) = token.split_once('=') else {
                debug!("Ignoring postgres connection token '{}'", token);
                continue;
            };
            let value = unquote(value).to_string();
            match key {
                "host" => pg.host = value,
                "dbname" => pg.dbname = value,
                "user" => pg.user = value,
                "password" => pg.password = value,
                "port" => pg.port = Some(value),
                "table" => pg.table = value,
                _ => debug!("Ignoring postgres connection key '{}'", key),
            }
        }
        pg
    }

    /// The `CONNECTION` string understood by MapServer.
    pub fn connection_string(&self) -> String {
        let mut connection = format!(
            "host={} dbname={} password={} user={}",
            self.host, self.dbname, self.password, self.user
        );
        if let Some(port) = &self.port {
            connection.push_str(&format!(" port={}", port));
        }
        connection
    }

    /// The `DATA` statement selecting the geometry column from the table.
    pub fn data_statement(&self) -> String {
        format!("{} FROM {}", self.geometry_column, self.table)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmsSubLayer {
    pub name: String,
    pub style: Option<String>,
}

/// A remote WMS raster layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WmsConnection {
    pub url: String,
    pub sublayers: Vec<WmsSubLayer>,
    pub format: String,
    pub epsg: String,
}

impl WmsConnection {
    /// Reads the WMS settings stored in a raster layer's `rasterproperties`
    /// and the EPSG code of its source SRS.
    pub fn from_layer(layer: &Element, url: &str) -> Result<Self> {
        let properties = layer
            .find("rasterproperties")
            .ok_or_else(|| Qgis2MapError::missing("rasterproperties"))?;

        let sublayers = properties
            .find_all("wmsSublayer")
            .into_iter()
            .map(|sublayer| {
                Ok(WmsSubLayer {
                    name: sublayer
                        .find_text("name")
                        .ok_or_else(|| Qgis2MapError::missing("wmsSublayer/name"))?
                        .to_string(),
                    style: sublayer.find_text("style").map(str::to_string),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let format = properties
            .find_text("wmsFormat")
            .ok_or_else(|| Qgis2MapError::missing("wmsFormat"))?;

        let epsg = layer
            .find("coordinatetransform")
            .and_then(|ct| ct.find("sourcesrs"))
            .and_then(|srs| srs.find("spatialrefsys"))
            .and_then(|srs| srs.find_text("epsg"))
            .ok_or_else(|| Qgis2MapError::missing("sourcesrs/spatialrefsys/epsg"))?;

        Ok(Self {
            url: url.to_string(),
            sublayers,
            format: format.to_string(),
            epsg: epsg.to_string(),
        })
    }

    pub fn names(&self) -> String {
        self.sublayers
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Sub-layer styles joined like the names, empty for unstyled sub-layers.
    pub fn styles(&self) -> String {
        self.sublayers
            .iter()
            .map(|s| s.style.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(",")
    }
}
