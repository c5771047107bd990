//! Selects the items of one group for merging and classifies the indices.

use log::{info, warn};

use crate::error::{Error, Result};
use crate::grouping::IndexedItem;
use crate::range::{ExclusionSet, IndexRange, RangeSpec};

/// Outcome of resolving a group against a range and an exclusion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Items to merge, ascending by index, one per index.
    pub sliced: Vec<IndexedItem>,
    /// Indices inside the range, not excluded and without a file.
    pub missing: Vec<i64>,
    /// Indices held by more than one file, whatever the range.
    pub duplicates: Vec<i64>,
    /// Effective index sequence after clamping.
    pub range: IndexRange,
    /// Explicitly requested start when it lay before the first available index.
    pub clamped_from: Option<i64>,
}

impl Resolution {
    fn empty() -> Self {
        Self {
            sliced: Vec::new(),
            missing: Vec::new(),
            duplicates: Vec::new(),
            range: IndexRange::empty(),
            clamped_from: None,
        }
    }

    /// First index considered, used for `{start}` in output names.
    pub fn start(&self) -> i64 {
        self.range.start
    }

    /// One past the last index considered, used for `{stop}` in output names.
    pub fn stop(&self) -> i64 {
        self.range.last().map_or(self.range.start, |last| last + 1)
    }
}

/// Resolves `range` against the available indices `first..=last`.
///
/// The start is raised to `first`; when an explicitly requested start was lower it is
/// returned alongside the range.
pub fn effective_range(
    first: i64,
    last: i64,
    range: &RangeSpec,
) -> Result<(IndexRange, Option<i64>)> {
    let len = last.checked_add(1).ok_or(Error::IndexOverflow(last))?;
    let mut indices = range.indices(len)?;
    let mut clamped_from = None;
    if indices.start < first {
        if range.start.is_some() {
            clamped_from = Some(indices.start);
        }
        indices.start = first;
    }
    Ok((indices, clamped_from))
}

/// Selects the items of one group.
///
/// Items are sorted by index (stable, so the first file found wins among duplicates)
/// and the range is walked in ascending order. Excluded indices count neither as
/// merged nor as missing.
pub fn resolve(
    items: &[IndexedItem],
    range: &RangeSpec,
    exclude: &ExclusionSet,
) -> Result<Resolution> {
    let mut items: Vec<&IndexedItem> = items.iter().collect();
    items.sort_by_key(|item| item.index);

    let (Some(first), Some(last)) = (items.first(), items.last()) else {
        // still validate the step for an empty group
        range.step()?;
        return Ok(Resolution::empty());
    };
    let (first, last) = (first.index, last.index);

    let (indices, clamped_from) = effective_range(first, last, range)?;
    if let Some(requested) = clamped_from {
        if let Some(skipped) = (requested..first).find(|&i| !exclude.contains(i)) {
            warn!(
                "Starting at index {} although index {} was requested",
                first, skipped
            );
        }
    }
    info!("Starting at index {}", indices.start);
    info!("Last index is {}", last);

    let mut sliced = Vec::new();
    let mut missing = Vec::new();
    let mut pos = 0;
    for i in indices.iter() {
        while pos < items.len() && items[pos].index < i {
            pos += 1;
        }
        let found = pos < items.len() && items[pos].index == i;

        if exclude.contains(i) {
            continue;
        }
        if found {
            sliced.push(items[pos].clone());
        } else {
            missing.push(i);
        }
    }

    let duplicates = items
        .windows(2)
        .filter(|pair| pair[0].index == pair[1].index)
        .map(|pair| pair[0].index)
        .fold(Vec::new(), |mut acc, index| {
            if acc.last() != Some(&index) {
                acc.push(index);
            }
            acc
        });

    Ok(Resolution {
        sliced,
        missing,
        duplicates,
        range: indices,
        clamped_from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::{group_files, FilePattern};

    const FILES: &[&str] = &[
        "a-0.tif", "a-1.tif", "a-3.tif", "b-1.tif", "b-2.tif", "c_0.tif", "d-1.log",
    ];

    fn items_of(files: &[&str], basename: &str) -> Vec<IndexedItem> {
        let pattern = FilePattern::new(r"(?P<basename>.+)-(?P<index>[0-9]+)\.tif$").unwrap();
        group_files(files, &pattern)
            .get(basename)
            .unwrap()
            .items
            .clone()
    }

    fn pairs(items: &[IndexedItem]) -> Vec<(i64, &str)> {
        items
            .iter()
            .map(|item| (item.index, item.path.to_str().unwrap()))
            .collect()
    }

    fn slice(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> RangeSpec {
        RangeSpec::new(start, stop, step)
    }

    #[test]
    fn test_effective_range() {
        let cases = [
            (1, 9, (3, 7)),
            (4, 9, (4, 7)),
            (1, 5, (3, 6)),
            (4, 5, (4, 6)),
        ];
        for (first, last, expected) in cases {
            let (r, _) = effective_range(first, last, &slice(Some(3), Some(7), None)).unwrap();
            assert_eq!((r.start, r.stop), expected);
            assert_eq!(r.step, 1);
        }
    }

    #[test]
    fn test_effective_range_negative_step() {
        assert!(effective_range(1, 4, &slice(Some(3), Some(1), Some(-1))).is_err());
    }

    #[test]
    fn test_missing() {
        let items = items_of(FILES, "a");
        let r = resolve(&items, &RangeSpec::full(), &ExclusionSet::new()).unwrap();
        assert_eq!(
            pairs(&r.sliced),
            vec![(0, "a-0.tif"), (1, "a-1.tif"), (3, "a-3.tif")]
        );
        assert_eq!(r.missing, vec![2]);
        assert!(r.duplicates.is_empty());
        assert_eq!((r.start(), r.stop()), (0, 4));
    }

    #[test]
    fn test_duplicates() {
        let mut files = FILES.to_vec();
        files.insert(0, "a-00.tif");
        files.push("a-01.tif");
        files.push("a-001.tif");

        let items = items_of(&files, "a");
        let r = resolve(&items, &RangeSpec::full(), &ExclusionSet::new()).unwrap();
        assert_eq!(
            pairs(&r.sliced),
            vec![(0, "a-00.tif"), (1, "a-1.tif"), (3, "a-3.tif")]
        );
        assert_eq!(r.missing, vec![2]);
        assert_eq!(r.duplicates, vec![0, 1]);
    }

    #[test]
    fn test_duplicates_outside_range_are_reported() {
        let items = vec![
            IndexedItem::new(0, "a-0.tif"),
            IndexedItem::new(0, "a-00.tif"),
            IndexedItem::new(5, "a-5.tif"),
        ];
        let exclude: ExclusionSet = [0].into_iter().collect();
        let r = resolve(&items, &slice(Some(4), None, None), &exclude).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(5, "a-5.tif")]);
        assert_eq!(r.duplicates, vec![0]);
    }

    #[test]
    fn test_slice() {
        let items = items_of(FILES, "a");
        let r = resolve(&items, &slice(Some(1), Some(2), None), &ExclusionSet::new()).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(1, "a-1.tif")]);
        assert!(r.missing.is_empty());
        assert!(r.duplicates.is_empty());
        assert_eq!((r.start(), r.stop()), (1, 2));
    }

    #[test]
    fn test_missing_front() {
        let items = items_of(FILES, "b");
        let r = resolve(&items, &RangeSpec::full(), &ExclusionSet::new()).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(1, "b-1.tif"), (2, "b-2.tif")]);
        assert!(r.missing.is_empty());
        assert!(r.duplicates.is_empty());
        assert_eq!(r.clamped_from, None);
        assert_eq!((r.start(), r.stop()), (1, 3));
    }

    #[test]
    fn test_step() {
        let items = items_of(FILES, "a");
        let r = resolve(&items, &slice(Some(1), None, Some(2)), &ExclusionSet::new()).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(1, "a-1.tif"), (3, "a-3.tif")]);
        assert!(r.missing.is_empty());
        assert_eq!((r.start(), r.stop()), (1, 4));
    }

    #[test]
    fn test_exclude() {
        let items = items_of(FILES, "a");
        let exclude = ExclusionSet::parse("2").unwrap();
        let r = resolve(&items, &slice(Some(1), Some(3), None), &exclude).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(1, "a-1.tif")]);
        assert!(r.missing.is_empty());
        assert!(r.duplicates.is_empty());
        // the excluded index is still considered for the output name
        assert_eq!((r.start(), r.stop()), (1, 3));
    }

    #[test]
    fn test_exclude_present_index() {
        let items = items_of(FILES, "a");
        let exclude = ExclusionSet::parse("0,3").unwrap();
        let r = resolve(&items, &RangeSpec::full(), &exclude).unwrap();
        assert_eq!(pairs(&r.sliced), vec![(1, "a-1.tif")]);
        assert_eq!(r.missing, vec![2]);
    }

    #[test]
    fn test_requested_start_before_first_is_clamped() {
        let items = items_of(FILES, "b");
        let r = resolve(&items, &slice(Some(0), Some(2), None), &ExclusionSet::new()).unwrap();
        assert_eq!(r.clamped_from, Some(0));
        assert_eq!(pairs(&r.sliced), vec![(1, "b-1.tif")]);
        assert!(r.missing.is_empty());
    }

    #[test]
    fn test_range_beyond_last_is_empty() {
        let items = items_of(FILES, "a");
        let r = resolve(&items, &slice(Some(10), None, None), &ExclusionSet::new()).unwrap();
        assert!(r.sliced.is_empty());
        assert!(r.missing.is_empty());
        assert_eq!(r.start(), r.stop());
    }

    #[test]
    fn test_negative_step_is_an_error() {
        let items = items_of(FILES, "a");
        assert!(resolve(&items, &slice(None, None, Some(-1)), &ExclusionSet::new()).is_err());
        assert!(resolve(&[], &slice(None, None, Some(0)), &ExclusionSet::new()).is_err());
    }

    #[test]
    fn test_index_at_i64_max_is_an_error() {
        let items = vec![IndexedItem::new(i64::MAX, "a-9223372036854775807.tif")];
        let err = resolve(&items, &RangeSpec::full(), &ExclusionSet::new()).unwrap_err();
        assert!(matches!(err, Error::IndexOverflow(i64::MAX)));
        assert!(!err.is_configuration());

        let items = vec![IndexedItem::new(i64::MAX - 1, "a-9223372036854775806.tif")];
        let r = resolve(&items, &RangeSpec::full(), &ExclusionSet::new()).unwrap();
        assert_eq!(r.sliced.len(), 1);
        assert_eq!((r.start(), r.stop()), (i64::MAX - 1, i64::MAX));
    }

    #[test]
    fn test_empty_items() {
        let r = resolve(&[], &RangeSpec::full(), &ExclusionSet::new()).unwrap();
        assert!(r.sliced.is_empty());
        assert!(r.range.is_empty());
    }
}
