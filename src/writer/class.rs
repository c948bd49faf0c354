//! `CLASS` sections for the four QGIS renderers.

use std::fmt::Write;

use crate::error::{Qgis2MapError, Result};
use crate::model::{ClassDefinition, GeometryKind, LabelConfig, LayerNode, Renderer, StyleSpec};
use crate::symbol::SymbolRegistry;

pub(crate) fn write_renderer(
    out: &mut String,
    layer: &LayerNode,
    symbols: &mut SymbolRegistry,
) -> Result<()> {
    let geometry = layer.geometry();
    let label = layer.label.as_ref();

    match &layer.renderer {
        Renderer::SingleSymbol(style) => {
            writeln!(out, "    CLASS")?;
            writeln!(out, "      NAME '{}'", layer.name)?;
            write_style(out, geometry, style, symbols)?;
            write_label(out, label)?;
            writeln!(out, "    END")?;
        }
        Renderer::Graduated { field, classes } => {
            writeln!(out, "    CLASSITEM '{}'", field)?;
            for class in classes {
                let lower = class.lower()?;
                let upper = class.upper()?;
                writeln!(out, "    CLASS")?;
                match &class.label {
                    Some(name) => writeln!(out, "      NAME '{}'", name)?,
                    None => writeln!(out, "      NAME '{} < {} < {}'", lower, field, upper)?,
                }
                writeln!(
                    out,
                    "      EXPRESSION ( ([{0}] >= {1}) AND ([{0}] <= {2}) )",
                    field, lower, upper
                )?;
                write_style(out, geometry, &class.style, symbols)?;
                write_label(out, label)?;
                writeln!(out, "    END")?;
            }
        }
        Renderer::Continuous {
            field,
            lowest,
            highest,
        } => write_color_ramp(out, field, lowest, highest, label)?,
        Renderer::UniqueValue { field, classes } => {
            writeln!(out, "    CLASSITEM '{}'", field)?;
            for class in classes {
                let value = class.lower()?;
                writeln!(out, "    CLASS")?;
                match &class.label {
                    Some(name) => writeln!(out, "      NAME '{}'", name)?,
                    None => writeln!(out, "      NAME '{} = {}'", field, value)?,
                }
                writeln!(out, "      EXPRESSION '{}'", value)?;
                write_style(out, geometry, &class.style, symbols)?;
                write_label(out, label)?;
                writeln!(out, "    END")?;
            }
        }
        Renderer::None => {}
    }
    Ok(())
}

// MapServer cannot draw a legend entry for a colour ramp, so the class has no NAME.
fn write_color_ramp(
    out: &mut String,
    field: &str,
    lowest: &ClassDefinition,
    highest: &ClassDefinition,
    label: Option<&LabelConfig>,
) -> Result<()> {
    writeln!(out, "    CLASS")?;
    writeln!(out, "      STYLE")?;
    writeln!(
        out,
        "        COLORRANGE {} {}",
        lowest.style.fill()?,
        highest.style.fill()?
    )?;
    writeln!(out, "        DATARANGE {} {}", lowest.lower()?, highest.lower()?)?;
    writeln!(out, "        RANGEITEM '{}'", field)?;
    writeln!(out, "      END")?;
    writeln!(out, "      STYLE")?;
    writeln!(out, "        OUTLINECOLOR {}", lowest.style.outline()?)?;
    writeln!(out, "      END")?;
    write_label(out, label)?;
    writeln!(out, "    END")?;
    Ok(())
}

fn write_style(
    out: &mut String,
    geometry: Option<GeometryKind>,
    style: &StyleSpec,
    symbols: &mut SymbolRegistry,
) -> Result<()> {
    writeln!(out, "      STYLE")?;
    writeln!(out, "        SYMBOL {}", symbols.resolve(geometry, &style.symbol))?;
    if geometry.is_some_and(GeometryKind::has_size) {
        let size = style
            .symbol
            .size
            .as_deref()
            .ok_or_else(|| Qgis2MapError::missing("pointsize"))?;
        writeln!(out, "        SIZE {}", size)?;
    }
    writeln!(out, "        OUTLINECOLOR {}", style.outline()?)?;
    writeln!(out, "        COLOR {}", style.fill()?)?;
    writeln!(out, "      END")?;
    Ok(())
}

/// Bitmap label for a class; nothing when the layer has no label field.
fn write_label(out: &mut String, label: Option<&LabelConfig>) -> Result<()> {
    let Some(label) = label else {
        return Ok(());
    };
    writeln!(out, "      LABEL")?;
    writeln!(out, "        TYPE BITMAP")?;
    writeln!(out, "        SIZE MEDIUM")?;
    writeln!(out, "        COLOR 0 0 0")?;
    if let Some(angle) = &label.angle {
        writeln!(out, "        ANGLE {}", angle)?;
    }
    if let Some(buffer) = &label.buffer {
        writeln!(out, "        BUFFER {}", buffer)?;
    }
    writeln!(out, "      END")?;
    Ok(())
}
