use anyhow::{Context, Result};
use clap::Parser;
use qgis2map::{MapOptions, MapfileWriter, Units};
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input project (.qgs or .qgz) or a directory of projects
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the generated map files
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Map units (dd, feet, inches, kilometers, meters, miles, nauticalmiles, pixels)
    #[arg(long, default_value = "meters")]
    units: Units,

    /// Image type written to IMAGETYPE
    #[arg(long, default_value = "png")]
    image_type: String,

    /// Map name; defaults to the project file name
    #[arg(long)]
    name: Option<String>,

    /// Map image width in pixels
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Map image height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Minimum scale of the web interface
    #[arg(long)]
    min_scale: Option<String>,

    /// Maximum scale of the web interface
    #[arg(long)]
    max_scale: Option<String>,

    /// Web template file
    #[arg(long)]
    template: Option<String>,

    /// Web header file
    #[arg(long)]
    header: Option<String>,

    /// Web footer file
    #[arg(long)]
    footer: Option<String>,

    /// Online resource URL advertised in the WMS metadata
    #[arg(long)]
    wms_online_resource: Option<String>,

    /// Also write an OUTPUTFORMAT block for the image type
    #[arg(long)]
    output_format_block: bool,
}

impl Args {
    fn map_options(&self, project: &Path) -> MapOptions {
        let defaults = MapOptions::default();
        let map_name = self
            .name
            .clone()
            .or_else(|| {
                project
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or(defaults.map_name.clone());

        MapOptions {
            map_name,
            units: self.units,
            image_type: self.image_type.clone(),
            width: self.width,
            height: self.height,
            min_scale: self.min_scale.clone(),
            max_scale: self.max_scale.clone(),
            template: self.template.clone(),
            header: self.header.clone(),
            footer: self.footer.clone(),
            wms_online_resource: self
                .wms_online_resource
                .clone()
                .unwrap_or(defaults.wms_online_resource.clone()),
            output_format_block: self.output_format_block,
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let start_time = std::time::Instant::now();

    if let Some(threads) = args.threads {
        ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {:?}", args.output))?;

    if args.input.is_file() {
        if !is_project_file(&args.input) {
            error!("Unsupported file type: {:?}", args.input);
            anyhow::bail!("Input file must be .qgs or .qgz");
        }
        let map_file = map_file_for(Path::new(""), &args.input, &args.output)?;
        process_file(&args.input, &map_file, &args)?;
    } else if args.input.is_dir() {
        info!("Processing directory: {:?}", args.input);
        process_directory(&args.input, &args)?;
    } else {
        error!("Invalid input path: {:?}", args.input);
        anyhow::bail!("Input path must be a file or directory");
    }

    info!("Total processing time: {:?}", start_time.elapsed());
    Ok(())
}

fn process_file(path: &Path, map_file: &Path, args: &Args) -> Result<()> {
    if let Some(parent) = map_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = MapfileWriter::new(args.map_options(path));
    let status = writer
        .convert(path, map_file)
        .with_context(|| format!("Failed to convert {:?}", path))?;
    info!("{}", status);
    Ok(())
}

/// Output path of a project: its path relative to `root` under `output`,
/// with the extension replaced by `.map`.
fn map_file_for(root: &Path, path: &Path, output: &Path) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Project file name is not valid UTF-8: {:?}", path))?;
    let relative_dir = path
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .filter(|_| !root.as_os_str().is_empty())
        .unwrap_or(Path::new(""));
    Ok(output.join(relative_dir).join(format!("{}.map", stem)))
}

/// Pairs each project with its map file, failing when two projects would
/// write the same map file.
fn plan_outputs(
    root: &Path,
    projects: Vec<PathBuf>,
    output: &Path,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut plan = Vec::with_capacity(projects.len());
    for project in projects {
        let map_file = map_file_for(root, &project, output)?;
        if let Some(previous) = claimed.insert(map_file.clone(), project.clone()) {
            anyhow::bail!(
                "{} and {} would both be written to {}",
                previous.display(),
                project.display(),
                map_file.display()
            );
        }
        plan.push((project, map_file));
    }
    Ok(plan)
}

fn process_directory(dir: &Path, args: &Args) -> Result<()> {
    use rayon::prelude::*;

    let projects = collect_projects(dir)?;
    info!("Found {} project files", projects.len());
    let plan = plan_outputs(dir, projects, &args.output)?;

    let results: Vec<Result<()>> = plan
        .par_iter()
        .map(|(path, map_file)| process_file(path, map_file, args))
        .collect();

    let errors: Vec<String> = results
        .into_iter()
        .zip(&plan)
        .filter_map(|(result, (path, _))| {
            result.err().map(|e| format!("{}: {:#}", path.display(), e))
        })
        .collect();

    if !errors.is_empty() {
        error!("Failed to convert {} projects:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} projects failed to convert", errors.len());
    }

    Ok(())
}

fn collect_projects(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut projects = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            projects.extend(collect_projects(&path)?);
        } else if is_project_file(&path) {
            projects.push(path);
        }
    }
    projects.sort();
    Ok(projects)
}

fn is_project_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref(),
        Some("qgs") | Some("qgz")
    )
}
