use std::fmt;
use std::str::FromStr;

use crate::error::Qgis2MapError;

/// MapServer map units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    Dd,
    Feet,
    Inches,
    Kilometers,
    #[default]
    Meters,
    Miles,
    NauticalMiles,
    Pixels,
}

impl Units {
    pub const ALL: [Units; 8] = [
        Units::Dd,
        Units::Feet,
        Units::Inches,
        Units::Kilometers,
        Units::Meters,
        Units::Miles,
        Units::NauticalMiles,
        Units::Pixels,
    ];

    /// Lower-case keyword written to the `UNITS` directive.
    pub fn keyword(self) -> &'static str {
        match self {
            Units::Dd => "dd",
            Units::Feet => "feet",
            Units::Inches => "inches",
            Units::Kilometers => "kilometers",
            Units::Meters => "meters",
            Units::Miles => "miles",
            Units::NauticalMiles => "nauticalmiles",
            Units::Pixels => "pixels",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Units {
    type Err = Qgis2MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Units::ALL
            .into_iter()
            .find(|units| units.keyword() == wanted)
            .ok_or_else(|| Qgis2MapError::invalid("units", s))
    }
}

/// Map-wide settings that are not stored in the QGIS project.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub map_name: String,
    pub units: Units,
    pub image_type: String,
    pub width: u32,
    pub height: u32,
    pub min_scale: Option<String>,
    pub max_scale: Option<String>,
    pub template: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub image_path: String,
    pub image_url: String,
    pub wms_online_resource: String,
    pub wms_srs: String,
    /// Also write an `OUTPUTFORMAT` block for the image type.
    pub output_format_block: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            map_name: "QGIS-MAP".to_string(),
            units: Units::default(),
            image_type: "png".to_string(),
            width: 600,
            height: 600,
            min_scale: None,
            max_scale: None,
            template: None,
            header: None,
            footer: None,
            image_path: "/tmp/".to_string(),
            image_url: "/tmp/".to_string(),
            wms_online_resource: "http://my.host.com/cgi-bin/mapserv?map=wms.map&".to_string(),
            wms_srs: "EPSG:4326".to_string(),
            output_format_block: false,
        }
    }
}

/// Treats an empty string the same as an absent value.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
