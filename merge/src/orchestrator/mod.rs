//! Runs grouping, index resolution and accumulation over a directory.


use std::fs;
use std::path::{Path, PathBuf};

use common::file_utils::{ensure_parent_dir, files_in_dir};
use imaginarium::Image;
use log::{error, info, warn};

use crate::accumulator::{Accumulator, Value};
use crate::error::{Error, Result};
use crate::grouping::{group_files, FilePattern, IndexedItem};
use crate::range::{ExclusionSet, RangeSpec};
use crate::resolve::{resolve, Resolution};
use crate::template::{OutputTemplate, DEFAULT_AVG, DEFAULT_SUM};

/// Where images come from and go to.
pub trait ImageStore {
    fn load(&mut self, path: &Path) -> imaginarium::Result<Image>;
    fn save(&mut self, path: &Path, image: &Image) -> imaginarium::Result<()>;
}

/// Reads and writes image files through `imaginarium`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStore;

impl ImageStore for FileStore {
    fn load(&mut self, path: &Path) -> imaginarium::Result<Image> {
        Image::read_file(path)
    }

    fn save(&mut self, path: &Path, image: &Image) -> imaginarium::Result<()> {
        image.save_file(path)
    }
}

/// Settings of a directory merge.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub pattern: FilePattern,
    pub dir: PathBuf,
    /// Output names are joined onto this directory; absolute names replace it.
    pub out_dir: PathBuf,
    pub range: RangeSpec,
    pub exclude: ExclusionSet,
    pub avg: Option<OutputTemplate>,
    pub sum: Option<OutputTemplate>,
}

impl MergeConfig {
    /// Merges everything `pattern` matches in the current directory with the default
    /// output names.
    pub fn new(pattern: FilePattern) -> Result<Self> {
        Ok(Self {
            pattern,
            dir: PathBuf::from("."),
            out_dir: PathBuf::from("."),
            range: RangeSpec::full(),
            exclude: ExclusionSet::new(),
            avg: Some(OutputTemplate::parse(DEFAULT_AVG)?),
            sum: Some(OutputTemplate::parse(DEFAULT_SUM)?),
        })
    }
}

/// Settings of a merge over an explicit file list.
#[derive(Debug, Clone, Default)]
pub struct VerbatimConfig {
    pub files: Vec<PathBuf>,
    pub avg: Option<PathBuf>,
    pub sum: Option<PathBuf>,
}

impl VerbatimConfig {
    pub fn validate(&self) -> Result<()> {
        if self.files.len() < 2 {
            return Err(Error::TooFewFiles(self.files.len()));
        }
        if self.avg.is_none() && self.sum.is_none() {
            return Err(Error::NoOutput);
        }
        Ok(())
    }
}

/// What happened to one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupReport {
    pub basename: String,
    pub start: i64,
    pub stop: i64,
    /// Items that were loaded and accumulated, ascending by index.
    pub merged: Vec<IndexedItem>,
    /// Items that could not be loaded.
    pub failed: Vec<IndexedItem>,
    pub missing: Vec<i64>,
    pub count: usize,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub groups: Vec<GroupReport>,
}

impl MergeReport {
    pub fn group(&self, basename: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.basename == basename)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.groups
            .iter()
            .flat_map(|g| g.outputs.iter().map(PathBuf::as_path))
    }
}

/// Merges every group found in `config.dir`.
///
/// All groups are resolved before anything is loaded, so duplicate indices in any
/// group abort the run without writing a file.
pub fn merge<S: ImageStore>(config: &MergeConfig, store: &mut S) -> Result<MergeReport> {
    fs::create_dir_all(&config.out_dir).map_err(|source| Error::CreateDir {
        path: config.out_dir.clone(),
        source,
    })?;

    let files = files_in_dir(&config.dir).map_err(|source| Error::ReadDir {
        path: config.dir.clone(),
        source,
    })?;
    let groups = group_files(&files, &config.pattern);
    if groups.is_empty() {
        warn!(
            "No files matching '{}' in '{}'",
            config.pattern.as_str(),
            config.dir.display()
        );
        return Ok(MergeReport::default());
    }

    let mut resolved = Vec::with_capacity(groups.len());
    for group in groups.into_sorted() {
        info!("Merging files for basename '{}'", group.basename);
        let resolution = resolve(&group.items, &config.range, &config.exclude)?;
        if !resolution.missing.is_empty() {
            warn!(
                "The following indices are missing: {:?}",
                resolution.missing
            );
        }
        if !resolution.duplicates.is_empty() {
            return Err(Error::DuplicateIndices {
                basename: group.basename,
                indices: resolution.duplicates,
            });
        }
        resolved.push((group.basename, resolution));
    }

    let mut report = MergeReport::default();
    for (basename, resolution) in resolved {
        report
            .groups
            .push(merge_group(config, store, basename, resolution)?);
    }

    Ok(report)
}

fn merge_group<S: ImageStore>(
    config: &MergeConfig,
    store: &mut S,
    basename: String,
    resolution: Resolution,
) -> Result<GroupReport> {
    let (start, stop) = (resolution.start(), resolution.stop());
    let loaded = accumulate_items(store, resolution.sliced)?;

    let mut report = GroupReport {
        basename,
        start,
        stop,
        merged: loaded.merged,
        failed: loaded.failed,
        missing: resolution.missing,
        count: loaded.acc.count(),
        outputs: Vec::new(),
    };
    if report.count == 0 {
        warn!("Nothing to merge for basename '{}'", report.basename);
        return Ok(report);
    }

    let outputs = [
        ("average", &config.avg, loaded.acc.average()),
        ("sum", &config.sum, loaded.acc.sum()),
    ];
    for (what, template, value) in outputs {
        let Some(template) = template else {
            continue;
        };
        let path = config
            .out_dir
            .join(template.format(&report.basename, start, stop));
        if save_value(store, what, &path, &value)? {
            report.outputs.push(path);
        }
    }

    Ok(report)
}

/// Merges an explicit list of files, writing to the given paths as they are.
pub fn merge_verbatim<S: ImageStore>(
    config: &VerbatimConfig,
    store: &mut S,
) -> Result<GroupReport> {
    config.validate()?;

    let items: Vec<IndexedItem> = config
        .files
        .iter()
        .enumerate()
        .map(|(i, path)| IndexedItem::new(i as i64, path))
        .collect();
    let loaded = accumulate_items(store, items)?;

    let mut report = GroupReport {
        start: 0,
        stop: config.files.len() as i64,
        merged: loaded.merged,
        failed: loaded.failed,
        count: loaded.acc.count(),
        ..GroupReport::default()
    };
    if report.count == 0 {
        warn!("None of the {} files could be loaded", config.files.len());
        return Ok(report);
    }

    if let Some(path) = &config.avg {
        if save_value(store, "average", path, &loaded.acc.average())? {
            report.outputs.push(path.clone());
        }
    }
    if let Some(path) = &config.sum {
        if save_value(store, "sum", path, &loaded.acc.sum())? {
            report.outputs.push(path.clone());
        }
    }

    Ok(report)
}

struct Loaded {
    acc: Accumulator,
    merged: Vec<IndexedItem>,
    failed: Vec<IndexedItem>,
}

/// Feeds `items` to a fresh accumulator in order. Items that fail to load are logged
/// and set aside.
fn accumulate_items<S: ImageStore>(store: &mut S, items: Vec<IndexedItem>) -> Result<Loaded> {
    let mut loaded = Loaded {
        acc: Accumulator::new(),
        merged: Vec::with_capacity(items.len()),
        failed: Vec::new(),
    };

    for item in items {
        match store.load(&item.path) {
            Ok(image) => {
                loaded.acc.accumulate(&Value::Image(image))?;
                loaded.merged.push(item);
            }
            Err(err) if err.is_io() => {
                error!("Cannot open '{}': {}", item.path.display(), err);
                loaded.failed.push(item);
            }
            Err(err) => {
                error!("Format of '{}' not supported: {}", item.path.display(), err);
                loaded.failed.push(item);
            }
        }
    }

    Ok(loaded)
}

fn save_value<S: ImageStore>(
    store: &mut S,
    what: &str,
    path: &Path,
    value: &Value,
) -> Result<bool> {
    let Some(image) = value.as_image() else {
        warn!("Not saving {} to '{}': no image data", what, path.display());
        return Ok(false);
    };

    ensure_parent_dir(path).map_err(|source| Error::CreateDir {
        path: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        source,
    })?;
    info!("Saving {} to '{}'", what, path.display());
    store.save(path, image).map_err(|source| Error::Save {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(true)
}
