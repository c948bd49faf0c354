use std::fmt;

use tracing::warn;

use crate::error::{Qgis2MapError, Result};
use crate::parser::Element;

/// Renderer descriptors in selection priority order.
const RENDERER_TAGS: [&str; 4] = [
    "singlesymbol",
    "graduatedsymbol",
    "continuoussymbol",
    "uniquevalue",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Reads the `red`, `green` and `blue` attributes of a colour element.
    pub fn from_element(element: &Element) -> Result<Self> {
        let channel = |name: &str| -> Result<u8> {
            let value = element
                .attr(name)
                .ok_or_else(|| Qgis2MapError::missing(format!("{}@{}", element.name, name)))?;
            value
                .trim()
                .parse()
                .map_err(|_| Qgis2MapError::invalid(format!("{}@{}", element.name, name), value))
        };
        Ok(Self {
            red: channel("red")?,
            green: channel("green")?,
            blue: channel("blue")?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.red, self.green, self.blue)
    }
}

/// Point symbol identifier and size of a QGIS `symbol` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSpec {
    pub point_symbol: Option<String>,
    pub size: Option<String>,
}

/// The drawable part of a class: symbol, outline and fill colours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSpec {
    pub symbol: SymbolSpec,
    pub outline: Option<Rgb>,
    pub fill: Option<Rgb>,
}

impl StyleSpec {
    pub fn from_element(symbol: &Element) -> Result<Self> {
        Ok(Self {
            symbol: SymbolSpec {
                point_symbol: symbol.find_text("pointsymbol").map(str::to_string),
                size: symbol.find_text("pointsize").map(str::to_string),
            },
            outline: symbol.find("outlinecolor").map(Rgb::from_element).transpose()?,
            fill: symbol.find("fillcolor").map(Rgb::from_element).transpose()?,
        })
    }

    pub fn outline(&self) -> Result<Rgb> {
        self.outline
            .ok_or_else(|| Qgis2MapError::missing("outlinecolor"))
    }

    pub fn fill(&self) -> Result<Rgb> {
        self.fill.ok_or_else(|| Qgis2MapError::missing("fillcolor"))
    }
}

/// One classification class. Which bounds are required depends on the
/// renderer, so they are checked when the class is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDefinition {
    pub lower: Option<String>,
    pub upper: Option<String>,
    pub label: Option<String>,
    pub style: StyleSpec,
}

impl ClassDefinition {
    pub fn from_element(symbol: &Element) -> Result<Self> {
        Ok(Self {
            lower: symbol.find_text("lowervalue").map(str::to_string),
            upper: symbol.find_text("uppervalue").map(str::to_string),
            label: symbol.find_text("label").map(str::to_string),
            style: StyleSpec::from_element(symbol)?,
        })
    }

    pub fn lower(&self) -> Result<&str> {
        self.lower
            .as_deref()
            .ok_or_else(|| Qgis2MapError::missing("lowervalue"))
    }

    pub fn upper(&self) -> Result<&str> {
        self.upper
            .as_deref()
            .ok_or_else(|| Qgis2MapError::missing("uppervalue"))
    }
}

/// How a layer's features are classified and styled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderer {
    SingleSymbol(StyleSpec),
    Graduated {
        field: String,
        classes: Vec<ClassDefinition>,
    },
    Continuous {
        field: String,
        lowest: ClassDefinition,
        highest: ClassDefinition,
    },
    UniqueValue {
        field: String,
        classes: Vec<ClassDefinition>,
    },
    None,
}

impl Renderer {
    /// Selects the layer's renderer.
    ///
    /// When several renderer descriptors are present the first one in the
    /// order single symbol, graduated, continuous, unique value is used and
    /// the others are ignored.
    pub fn from_layer(layer: &Element) -> Result<Self> {
        let mut present = RENDERER_TAGS
            .iter()
            .filter_map(|tag| layer.find(tag).map(|element| (*tag, element)));

        let Some((tag, descriptor)) = present.next() else {
            return Ok(Renderer::None);
        };
        let ignored: Vec<&str> = present.map(|(tag, _)| tag).collect();
        if !ignored.is_empty() {
            warn!(
                "Layer declares several renderers, using <{}> and ignoring {:?}",
                tag, ignored
            );
        }

        match tag {
            "singlesymbol" => {
                let symbol = descriptor
                    .find("symbol")
                    .ok_or_else(|| Qgis2MapError::missing("singlesymbol/symbol"))?;
                Ok(Renderer::SingleSymbol(StyleSpec::from_element(symbol)?))
            }
            "graduatedsymbol" => Ok(Renderer::Graduated {
                field: classification_field(descriptor, layer)?,
                classes: classes(descriptor)?,
            }),
            "continuoussymbol" => {
                let endpoint = |name: &str| -> Result<ClassDefinition> {
                    let symbol = descriptor
                        .find(name)
                        .and_then(|e| e.find("symbol"))
                        .ok_or_else(|| Qgis2MapError::missing(format!("{}/symbol", name)))?;
                    ClassDefinition::from_element(symbol)
                };
                Ok(Renderer::Continuous {
                    field: classification_field(descriptor, layer)?,
                    lowest: endpoint("lowestsymbol")?,
                    highest: endpoint("highestsymbol")?,
                })
            }
            _ => Ok(Renderer::UniqueValue {
                field: classification_field(descriptor, layer)?,
                classes: classes(descriptor)?,
            }),
        }
    }
}

fn classification_field(descriptor: &Element, layer: &Element) -> Result<String> {
    descriptor
        .find_text("classificationattribute")
        .or_else(|| layer.find_text("classificationattribute"))
        .map(str::to_string)
        .ok_or_else(|| Qgis2MapError::missing("classificationattribute"))
}

fn classes(descriptor: &Element) -> Result<Vec<ClassDefinition>> {
    descriptor
        .children_named("symbol")
        .map(ClassDefinition::from_element)
        .collect()
}
