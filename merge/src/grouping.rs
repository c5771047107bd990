//! Partition filenames into per-basename groups of indexed items.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;
use regex::Regex;

use crate::error::{Error, Result};

pub const BASENAME_GROUP: &str = "basename";
pub const INDEX_GROUP: &str = "index";

/// One file of a sequence, identified by its numeric suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedItem {
    pub index: i64,
    pub path: PathBuf,
}

impl IndexedItem {
    pub fn new(index: i64, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }
}

/// Files sharing one basename, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub basename: String,
    pub items: Vec<IndexedItem>,
}

/// Groups keyed by basename, in order of first encounter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Groups {
    groups: Vec<Group>,
    lookup: HashMap<String, usize>,
}

impl Groups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, basename: &str) -> Option<&Group> {
        self.lookup.get(basename).map(|&i| &self.groups[i])
    }

    pub fn basenames(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.basename.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Groups ordered by basename.
    pub fn into_sorted(self) -> Vec<Group> {
        let mut groups = self.groups;
        groups.sort_by(|a, b| a.basename.cmp(&b.basename));
        groups
    }

    fn push(&mut self, basename: &str, item: IndexedItem) {
        let slot = match self.lookup.get(basename) {
            Some(&slot) => slot,
            None => {
                self.groups.push(Group {
                    basename: basename.to_string(),
                    items: Vec::new(),
                });
                self.lookup
                    .insert(basename.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].items.push(item);
    }
}

/// Compiled filename pattern with named groups `basename` and `index`.
///
/// The pattern has to match at the start of the file name; whether it must also
/// reach the end is up to the pattern (the default one ends in `$`).
#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern))?;

        for group in [BASENAME_GROUP, INDEX_GROUP] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(Error::MissingCaptureGroup {
                    pattern: pattern.to_string(),
                    group,
                });
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches the final component of `path`, returning basename and index.
    pub fn parse(&self, path: &Path) -> Option<(String, i64)> {
        let name = path.file_name()?.to_str()?;
        let captures = self.regex.captures(name)?;
        let basename = captures.name(BASENAME_GROUP)?.as_str();
        let index = captures.name(INDEX_GROUP)?.as_str();

        match index.parse::<i64>() {
            Ok(index) => Some((basename.to_string(), index)),
            Err(_) => {
                warn!("Ignoring '{}': index '{}' is not an integer", name, index);
                None
            }
        }
    }
}

/// Groups `files` by basename. Files that do not match are skipped.
pub fn group_files<I, P>(files: I, pattern: &FilePattern) -> Groups
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut groups = Groups::default();
    for file in files {
        let file = file.as_ref();
        if let Some((basename, index)) = pattern.parse(file) {
            groups.push(&basename, IndexedItem::new(index, file));
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = r"(?P<basename>.+)-(?P<index>[0-9]+)\.tif$";

    const FILES: &[&str] = &[
        "a-0.tif", "a-1.tif", "a-3.tif", "b-1.tif", "b-2.tif", "c_0.tif", "d-1.log",
    ];

    fn pairs(group: &Group) -> Vec<(i64, &str)> {
        group
            .items
            .iter()
            .map(|item| (item.index, item.path.to_str().unwrap()))
            .collect()
    }

    #[test]
    fn test_group_files() {
        let pattern = FilePattern::new(DEFAULT).unwrap();
        let grouped = group_files(FILES, &pattern);

        assert_eq!(grouped.len(), 2);
        assert_eq!(
            pairs(grouped.get("a").unwrap()),
            vec![(0, "a-0.tif"), (1, "a-1.tif"), (3, "a-3.tif")]
        );
        assert_eq!(
            pairs(grouped.get("b").unwrap()),
            vec![(1, "b-1.tif"), (2, "b-2.tif")]
        );
        assert!(grouped.get("c").is_none());
    }

    #[test]
    fn test_first_encounter_order() {
        let pattern = FilePattern::new(DEFAULT).unwrap();
        let names = ["e", "b", "d", "a", "c"];
        let files: Vec<String> = names.iter().map(|n| format!("{}-0.tif", n)).collect();

        let grouped = group_files(&files, &pattern);
        assert_eq!(grouped.basenames().collect::<Vec<_>>(), names);

        let sorted: Vec<_> = grouped
            .into_sorted()
            .into_iter()
            .map(|g| g.basename)
            .collect();
        assert_eq!(sorted, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_discovery_order_within_group() {
        let pattern = FilePattern::new(DEFAULT).unwrap();
        let grouped = group_files(["a-3.tif", "a-00.tif", "a-1.tif", "a-0.tif"], &pattern);
        assert_eq!(
            pairs(grouped.get("a").unwrap()),
            vec![(3, "a-3.tif"), (0, "a-00.tif"), (1, "a-1.tif"), (0, "a-0.tif")]
        );
    }

    #[test]
    fn test_trailing_suffix_does_not_match() {
        let pattern = FilePattern::new(DEFAULT).unwrap();
        let grouped = group_files(["a-0.tif.metadata", "a-0.tif"], &pattern);
        assert_eq!(pairs(grouped.get("a").unwrap()), vec![(0, "a-0.tif")]);
    }

    #[test]
    fn test_match_is_anchored_at_start() {
        let pattern = FilePattern::new(r"(?P<basename>a)-(?P<index>[0-9]+)\.tif$").unwrap();
        let grouped = group_files(["xa-0.tif", "a-1.tif"], &pattern);
        assert_eq!(pairs(grouped.get("a").unwrap()), vec![(1, "a-1.tif")]);
    }

    #[test]
    fn test_only_file_name_is_matched() {
        let pattern = FilePattern::new(DEFAULT).unwrap();
        let grouped = group_files(["/data/run-7/b-2.tif"], &pattern);
        let group = grouped.get("b").unwrap();
        assert_eq!(group.items[0].index, 2);
        assert_eq!(group.items[0].path, PathBuf::from("/data/run-7/b-2.tif"));
    }

    #[test]
    fn test_missing_named_group_is_rejected() {
        let result = FilePattern::new(r"(?P<basename>.+)-([0-9]+)\.tif$");
        assert!(matches!(
            result,
            Err(Error::MissingCaptureGroup { group: "index", .. })
        ));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(matches!(FilePattern::new("(?P<basename>"), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_non_numeric_index_is_skipped() {
        let pattern = FilePattern::new(r"(?P<basename>[a-z]+)_(?P<index>\w+)\.tif$").unwrap();
        let grouped = group_files(["a_x.tif", "a_7.tif"], &pattern);
        assert_eq!(pairs(grouped.get("a").unwrap()), vec![(7, "a_7.tif")]);
    }
}
