pub mod archive;
pub mod error;
pub mod model;
pub mod options;
pub mod parser;
pub mod proj4;
pub mod symbol;
pub mod writer;

pub use archive::{load_project, ProjectArchive};
pub use error::{Qgis2MapError, Result};
pub use model::{LayerNode, ProjectDocument};
pub use options::{MapOptions, Units};
pub use writer::MapfileWriter;
