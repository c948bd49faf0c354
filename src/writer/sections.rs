//! Map-level sections: everything outside the `LAYER` blocks.

use std::fmt::Write;

use crate::error::Result;
use crate::model::Extent;
use crate::options::{non_empty, MapOptions};
use crate::proj4::format_proj4;
use crate::symbol::SymbolRegistry;

pub(crate) fn write_map_section(
    out: &mut String,
    options: &MapOptions,
    source: Option<&str>,
    extent: &Extent,
) -> Result<()> {
    match source {
        Some(source) => writeln!(out, "# Map file created from QGIS project file {}", source)?,
        None => writeln!(out, "# Map file created from a QGIS project")?,
    }
    writeln!(out, "# Edit this file to customize for your map interface")?;
    writeln!(out, "MAP")?;
    writeln!(out, "  NAME '{}'", options.map_name)?;
    writeln!(out, "  # Map image size")?;
    writeln!(out, "  SIZE {} {}", options.width, options.height)?;
    writeln!(out, "  UNITS {}", options.units)?;
    writeln!(out)?;
    writeln!(
        out,
        "  EXTENT {} {} {} {}",
        extent.xmin, extent.ymin, extent.xmax, extent.ymax
    )?;
    Ok(())
}

pub(crate) fn write_projection_section(out: &mut String, proj4: &str) -> Result<()> {
    writeln!(out, "  PROJECTION")?;
    out.push_str(&format_proj4(proj4, "    "));
    writeln!(out, "  END")?;
    Ok(())
}

pub(crate) fn write_output_format(out: &mut String, options: &MapOptions) -> Result<()> {
    writeln!(out, "  # Background color for the map canvas -- change as desired")?;
    writeln!(out, "  IMAGECOLOR 192 192 192")?;
    writeln!(out, "  IMAGEQUALITY 95")?;
    writeln!(out, "  IMAGETYPE {}", options.image_type)?;

    if options.output_format_block {
        let lower = options.image_type.to_lowercase();
        writeln!(out, "  OUTPUTFORMAT")?;
        writeln!(out, "    NAME {}", options.image_type)?;
        writeln!(out, "    DRIVER 'GD/{}'", options.image_type.to_uppercase())?;
        writeln!(out, "    MIMETYPE 'image/{}'", lower)?;
        writeln!(out, "    IMAGEMODE PC256")?;
        writeln!(out, "    EXTENSION '{}'", lower)?;
        writeln!(out, "  END")?;
    }
    Ok(())
}

pub(crate) fn write_legend_section(out: &mut String) -> Result<()> {
    out.push_str(
        "  # Legend
  LEGEND
    IMAGECOLOR 255 255 255
    STATUS ON
    KEYSIZE 18 12
    LABEL
      TYPE BITMAP
      SIZE MEDIUM
      COLOR 0 0 89
    END
  END

",
    );
    Ok(())
}

pub(crate) fn write_web_section(out: &mut String, options: &MapOptions) -> Result<()> {
    writeln!(out, "  # Web interface definition. Only the template parameter")?;
    writeln!(out, "  # is required to display a map. See MapServer documentation")?;
    writeln!(out, "  WEB")?;
    writeln!(out, "    # Set IMAGEPATH to the path where MapServer should")?;
    writeln!(out, "    # write its output.")?;
    writeln!(out, "    IMAGEPATH '{}'", options.image_path)?;
    writeln!(out)?;
    writeln!(out, "    # Set IMAGEURL to the url that points to IMAGEPATH")?;
    writeln!(out, "    # as defined in your web server configuration")?;
    writeln!(out, "    IMAGEURL '{}'", options.image_url)?;
    writeln!(out)?;

    writeln!(out, "    # WMS server settings")?;
    writeln!(out, "    METADATA")?;
    writeln!(out, "      'wms_title'           '{}'", options.map_name)?;
    writeln!(out, "      'wms_onlineresource'  '{}'", options.wms_online_resource)?;
    writeln!(out, "      'wms_srs'             '{}'", options.wms_srs)?;
    writeln!(out, "    END")?;
    writeln!(out)?;

    writeln!(out, "    # Scale range at which web interface will operate")?;
    if let Some(min_scale) = non_empty(&options.min_scale) {
        writeln!(out, "    MINSCALE {}", min_scale)?;
    }
    if let Some(max_scale) = non_empty(&options.max_scale) {
        writeln!(out, "    MAXSCALE {}", max_scale)?;
    }

    writeln!(out, "    # Template and header/footer settings")?;
    writeln!(out, "    # Only the template parameter is required to display a map. See MapServer documentation")?;
    if let Some(template) = non_empty(&options.template) {
        writeln!(out, "    TEMPLATE '{}'", template)?;
    }
    if let Some(header) = non_empty(&options.header) {
        writeln!(out, "    HEADER '{}'", header)?;
    }
    if let Some(footer) = non_empty(&options.footer) {
        writeln!(out, "    FOOTER '{}'", footer)?;
    }
    writeln!(out, "  END")?;
    writeln!(out)?;
    Ok(())
}

/// Writes every collected symbol definition. Takes the registry by value:
/// nothing may be registered once the symbols are out.
pub(crate) fn write_symbol_section(out: &mut String, symbols: SymbolRegistry) -> Result<()> {
    for definition in symbols.definitions() {
        out.push_str(definition);
        writeln!(out)?;
    }
    Ok(())
}
