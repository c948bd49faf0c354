//! Point symbols referenced by layer styles.
//!
//! Styles refer to symbols by name, and the mapfile needs one `SYMBOL`
//! definition per name. Definitions are collected in a [`SymbolRegistry`]
//! while layers are written and flushed once all layers are done.

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{GeometryKind, SymbolSpec};

/// Symbol used by line and polygon styles, and by rasters.
pub const DEFAULT_SYMBOL: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointSymbol {
    Circle,
    Triangle,
}

impl PointSymbol {
    /// Maps a QGIS point symbol identifier (`hard:circle`, `circle`, ...).
    pub fn from_qgis(identifier: &str) -> Option<Self> {
        let name = identifier.strip_prefix("hard:").unwrap_or(identifier);
        match name {
            "circle" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "CIRCLE",
            Self::Triangle => "TRIANGLE",
        }
    }

    /// The `SYMBOL` block defining this symbol.
    pub fn definition(self) -> &'static str {
        match self {
            Self::Circle => {
                "  # Circle symbol
  SYMBOL
    NAME 'CIRCLE'
    TYPE ellipse
    FILLED true
    POINTS
      1 1
    END
  END
"
            }
            Self::Triangle => {
                "  # Triangle symbol
  SYMBOL
    NAME 'TRIANGLE'
    TYPE vector
    FILLED true
    POINTS
      0 1
      .5 0
      1 1
      0 1
    END
  END
"
            }
        }
    }
}

/// Symbol definitions keyed by name, each stored once.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    symbols: BTreeMap<&'static str, &'static str>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the definition of `symbol` unless it is already known.
    pub fn register(&mut self, symbol: PointSymbol) {
        self.symbols
            .entry(symbol.name())
            .or_insert_with(|| symbol.definition());
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Definitions in name order.
    pub fn definitions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.symbols.values().copied()
    }

    /// Resolves the `SYMBOL` value of a style.
    ///
    /// Point styles get the quoted name of their point symbol, falling back
    /// to the circle for unknown identifiers, and the symbol is registered.
    /// Every other geometry uses [`DEFAULT_SYMBOL`].
    pub fn resolve(&mut self, geometry: Option<GeometryKind>, spec: &SymbolSpec) -> String {
        if geometry != Some(GeometryKind::Point) {
            return DEFAULT_SYMBOL.to_string();
        }
        let symbol = spec
            .point_symbol
            .as_deref()
            .and_then(PointSymbol::from_qgis)
            .unwrap_or_else(|| {
                debug!(
                    "Point symbol {:?} has no mapfile equivalent, using CIRCLE",
                    spec.point_symbol
                );
                PointSymbol::Circle
            });
        self.register(symbol);
        format!("'{}'", symbol.name())
    }
}
