mod class;
mod layer;
mod sections;

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::archive::load_project;
use crate::error::Result;
use crate::model::ProjectDocument;
use crate::options::MapOptions;
use crate::symbol::SymbolRegistry;

/// Translates a QGIS project into a MapServer mapfile.
#[derive(Debug, Clone, Default)]
pub struct MapfileWriter {
    options: MapOptions,
}

impl MapfileWriter {
    pub fn new(options: MapOptions) -> Self {
        Self { options }
    }

    /// Renders the complete mapfile.
    ///
    /// Nothing is returned unless every layer translates, so callers never
    /// see a truncated mapfile.
    pub fn render(&self, document: &ProjectDocument) -> Result<String> {
        let extent = document.extent()?;
        let proj4 = document.destination_proj4()?;
        let layers = document.layers()?;

        info!(
            "Rendering mapfile '{}' with {} layers",
            self.options.map_name,
            layers.len()
        );

        let mut out = String::new();
        sections::write_map_section(&mut out, &self.options, document.source(), &extent)?;
        sections::write_projection_section(&mut out, proj4)?;
        sections::write_output_format(&mut out, &self.options)?;
        sections::write_legend_section(&mut out)?;
        sections::write_web_section(&mut out, &self.options)?;

        let mut symbols = SymbolRegistry::new();
        for node in &layers {
            debug!("Writing layer '{}' ({:?})", node.name, node.source);
            layer::write_layer(&mut out, node, &mut symbols)
                .map_err(|e| e.in_layer(&node.name))?;
        }

        debug!("Writing {} symbol definitions", symbols.len());
        sections::write_symbol_section(&mut out, symbols)?;
        out.push_str("END");
        Ok(out)
    }

    /// Renders the mapfile into `sink`. The sink is untouched when
    /// translation fails.
    pub fn write<W: Write>(&self, document: &ProjectDocument, sink: &mut W) -> Result<()> {
        let mapfile = self.render(document)?;
        sink.write_all(mapfile.as_bytes())?;
        sink.flush()?;
        Ok(())
    }

    /// Converts the project at `project` (`.qgs` or `.qgz`) into `map_file`.
    ///
    /// The mapfile is written to a temporary file next to `map_file` and
    /// moved into place once complete, so a failed conversion leaves no
    /// output behind. Returns a status line naming both files.
    pub fn convert(&self, project: &Path, map_file: &Path) -> Result<String> {
        info!("Converting {:?} to {:?}", project, map_file);
        let document = load_project(project)?;
        let mapfile = self.render(&document)?;

        let dir = match map_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(mapfile.as_bytes())?;
        temp.flush()?;
        temp.persist(map_file).map_err(|e| e.error)?;

        Ok(format!(
            "Writing the map file using {} {}",
            project.display(),
            map_file.display()
        ))
    }
}
