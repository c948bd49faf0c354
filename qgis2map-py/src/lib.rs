use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use qgis2map::model::PostgisConnection;
use qgis2map::{load_project, MapOptions, MapfileWriter, Qgis2MapError, Units};
use std::path::Path;

#[pymodule]
fn qgis2map_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPostgisConnection>()?;
    m.add_function(wrap_pyfunction!(convert_project, m)?)?;
    m.add_function(wrap_pyfunction!(render_mapfile, m)?)?;
    m.add_function(wrap_pyfunction!(format_proj4, m)?)?;
    m.add_function(wrap_pyfunction!(parse_postgis_connection, m)?)?;
    Ok(())
}

#[pyclass(name = "PostgisConnection")]
#[derive(Clone)]
pub struct PyPostgisConnection {
    #[pyo3(get)]
    pub host: String,
    #[pyo3(get)]
    pub dbname: String,
    #[pyo3(get)]
    pub user: String,
    #[pyo3(get)]
    pub password: String,
    #[pyo3(get)]
    pub port: Option<String>,
    #[pyo3(get)]
    pub table: String,
    #[pyo3(get)]
    pub geometry_column: String,
    connection_string: String,
    data_statement: String,
}

impl From<PostgisConnection> for PyPostgisConnection {
    fn from(conn: PostgisConnection) -> Self {
        let connection_string = conn.connection_string();
        let data_statement = conn.data_statement();
        PyPostgisConnection {
            host: conn.host,
            dbname: conn.dbname,
            user: conn.user,
            password: conn.password,
            port: conn.port,
            table: conn.table,
            geometry_column: conn.geometry_column,
            connection_string,
            data_statement,
        }
    }
}

#[pymethods]
impl PyPostgisConnection {
    /// Value of the mapfile `CONNECTION` directive.
    #[getter]
    fn connection_string(&self) -> String {
        self.connection_string.clone()
    }

    /// Value of the mapfile `DATA` directive.
    #[getter]
    fn data_statement(&self) -> String {
        self.data_statement.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "PostgisConnection(host='{}', dbname='{}', table='{}', geometry_column='{}')",
            self.host, self.dbname, self.table, self.geometry_column
        )
    }
}

fn to_py_err(err: Qgis2MapError) -> PyErr {
    match err {
        Qgis2MapError::Io(e) => PyErr::new::<PyIOError, _>(format!("I/O error: {}", e)),
        other => PyErr::new::<PyValueError, _>(format!("Failed to convert project: {}", other)),
    }
}

#[allow(clippy::too_many_arguments)]
fn map_options(
    units: &str,
    image_type: String,
    map_name: Option<String>,
    width: u32,
    height: u32,
    min_scale: Option<String>,
    max_scale: Option<String>,
    template: Option<String>,
    header: Option<String>,
    footer: Option<String>,
) -> PyResult<MapOptions> {
    let units: Units = units.parse().map_err(to_py_err)?;
    let defaults = MapOptions::default();
    Ok(MapOptions {
        map_name: map_name.unwrap_or(defaults.map_name.clone()),
        units,
        image_type,
        width,
        height,
        min_scale,
        max_scale,
        template,
        header,
        footer,
        ..defaults
    })
}

/// Converts a `.qgs`/`.qgz` project into a mapfile and returns the status line.
#[pyfunction]
#[pyo3(signature = (
    project, map_file, units="meters", image_type="png".to_string(), map_name=None,
    width=600, height=600, min_scale=None, max_scale=None, template=None, header=None, footer=None
))]
#[allow(clippy::too_many_arguments)]
pub fn convert_project(
    project: &str,
    map_file: &str,
    units: &str,
    image_type: String,
    map_name: Option<String>,
    width: u32,
    height: u32,
    min_scale: Option<String>,
    max_scale: Option<String>,
    template: Option<String>,
    header: Option<String>,
    footer: Option<String>,
) -> PyResult<String> {
    let options = map_options(
        units, image_type, map_name, width, height, min_scale, max_scale, template, header,
        footer,
    )?;
    MapfileWriter::new(options)
        .convert(Path::new(project), Path::new(map_file))
        .map_err(to_py_err)
}

/// Returns the mapfile text for a project without writing it anywhere.
#[pyfunction]
#[pyo3(signature = (
    project, units="meters", image_type="png".to_string(), map_name=None,
    width=600, height=600, min_scale=None, max_scale=None, template=None, header=None, footer=None
))]
#[allow(clippy::too_many_arguments)]
pub fn render_mapfile(
    project: &str,
    units: &str,
    image_type: String,
    map_name: Option<String>,
    width: u32,
    height: u32,
    min_scale: Option<String>,
    max_scale: Option<String>,
    template: Option<String>,
    header: Option<String>,
    footer: Option<String>,
) -> PyResult<String> {
    let options = map_options(
        units, image_type, map_name, width, height, min_scale, max_scale, template, header,
        footer,
    )?;
    let document = load_project(Path::new(project)).map_err(to_py_err)?;
    MapfileWriter::new(options)
        .render(&document)
        .map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (proj4, indent="  "))]
pub fn format_proj4(proj4: &str, indent: &str) -> String {
    qgis2map::proj4::format_proj4(proj4, indent)
}

#[pyfunction]
pub fn parse_postgis_connection(data_source: &str) -> PyPostgisConnection {
    PostgisConnection::parse(data_source).into()
}
