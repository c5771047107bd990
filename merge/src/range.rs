//! Slice notation and exclusion lists for index selection.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Requested `start:stop:step` selection, `stop` excluded.
///
/// Bounds follow Python slice semantics: missing bounds select from the beginning or
/// to the end, negative bounds count from the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl RangeSpec {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Everything, `:`.
    pub fn full() -> Self {
        Self::default()
    }

    /// Parses `start:stop:step`; every part is optional, `step` must be positive.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(Error::InvalidSlice(text.to_string()));
        }

        let bound = |part: &str| -> Result<Option<i64>> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse()
                .map(Some)
                .map_err(|_| Error::InvalidSlice(text.to_string()))
        };

        let spec = Self {
            start: bound(parts[0])?,
            stop: bound(parts[1])?,
            step: match parts.get(2) {
                Some(step) => bound(step)?,
                None => None,
            },
        };
        spec.step()?;

        Ok(spec)
    }

    /// Turns an inclusive `stop` into the exclusive one used everywhere else.
    pub fn with_inclusive_stop(self) -> Self {
        Self {
            stop: self.stop.map(|stop| stop.saturating_add(1)),
            ..self
        }
    }

    /// The step, defaulting to 1. Zero and negative steps are rejected.
    pub fn step(&self) -> Result<i64> {
        match self.step {
            None => Ok(1),
            Some(step) if step > 0 => Ok(step),
            Some(step) => Err(Error::NonPositiveStep(step)),
        }
    }

    /// Resolves the bounds against `len` like Python's `slice.indices`.
    pub fn indices(&self, len: i64) -> Result<IndexRange> {
        let step = self.step()?;
        let clamp = |bound: i64| {
            if bound < 0 {
                bound.saturating_add(len).max(0)
            } else {
                bound.min(len)
            }
        };

        Ok(IndexRange {
            start: self.start.map_or(0, clamp),
            stop: self.stop.map_or(len, clamp),
            step,
        })
    }
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |bound: Option<i64>| bound.map(|b| b.to_string()).unwrap_or_default();
        write!(f, "{}:{}", show(self.start), show(self.stop))?;
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// Concrete ascending index sequence `start, start + step, ...` below `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl IndexRange {
    pub fn empty() -> Self {
        Self {
            start: 0,
            stop: 0,
            step: 1,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let (stop, step) = (self.stop, self.step.max(1));
        std::iter::successors(Some(self.start), move |&i| i.checked_add(step))
            .take_while(move |&i| i < stop)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    pub fn last(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        let step = self.step.max(1);
        Some(self.start + (self.stop - 1 - self.start) / step * step)
    }
}

/// Indices skipped regardless of presence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(BTreeSet<i64>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list such as `2,5,7`. An empty string excludes nothing.
    pub fn parse(text: &str) -> Result<Self> {
        text.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| Error::InvalidExclude(part.to_string()))
            })
            .collect()
    }

    pub fn contains(&self, index: i64) -> bool {
        self.0.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for ExclusionSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slice() {
        let cases = [
            (":", RangeSpec::new(None, None, None)),
            ("5:", RangeSpec::new(Some(5), None, None)),
            (":5", RangeSpec::new(None, Some(5), None)),
            ("3:5", RangeSpec::new(Some(3), Some(5), None)),
            ("::2", RangeSpec::new(None, None, Some(2))),
            (":5:", RangeSpec::new(None, Some(5), None)),
            ("5::", RangeSpec::new(Some(5), None, None)),
            ("1:3:5", RangeSpec::new(Some(1), Some(3), Some(5))),
            ("-3:", RangeSpec::new(Some(-3), None, None)),
        ];
        for (text, expected) in cases {
            assert_eq!(RangeSpec::parse(text).unwrap(), expected, "{}", text);
        }
    }

    #[test]
    fn test_parse_slice_rejects_garbage() {
        for text in ["", "5", "1:2:3:4", "a:", ":b", "1:2:x"] {
            assert!(
                matches!(RangeSpec::parse(text), Err(Error::InvalidSlice(_))),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_non_positive_step_is_rejected() {
        assert!(matches!(
            RangeSpec::parse("3:1:-1"),
            Err(Error::NonPositiveStep(-1))
        ));
        assert!(matches!(
            RangeSpec::parse("::0"),
            Err(Error::NonPositiveStep(0))
        ));
        assert!(RangeSpec::new(None, None, Some(-2)).indices(10).is_err());
    }

    #[test]
    fn test_indices_like_python() {
        let r = RangeSpec::full().indices(4).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let r = RangeSpec::new(None, Some(10), None).indices(4).unwrap();
        assert_eq!((r.start, r.stop), (0, 4));

        let r = RangeSpec::new(Some(-2), None, None).indices(4).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![2, 3]);

        let r = RangeSpec::new(Some(-10), Some(-1), None).indices(4).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 1, 2]);

        let r = RangeSpec::new(Some(7), None, None).indices(4).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn test_index_range_last() {
        let r = IndexRange {
            start: 1,
            stop: 4,
            step: 2,
        };
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(r.last(), Some(3));

        let r = IndexRange {
            start: 0,
            stop: 4,
            step: 3,
        };
        assert_eq!(r.last(), Some(3));
        assert_eq!(IndexRange::empty().last(), None);
    }

    #[test]
    fn test_inclusive_stop() {
        let spec = RangeSpec::parse("1:3").unwrap().with_inclusive_stop();
        assert_eq!(spec, RangeSpec::new(Some(1), Some(4), None));
        assert_eq!(RangeSpec::full().with_inclusive_stop(), RangeSpec::full());

        let spec = RangeSpec::new(None, Some(i64::MAX), None).with_inclusive_stop();
        assert_eq!(spec.stop, Some(i64::MAX));
    }

    #[test]
    fn test_iter_stops_at_i64_max() {
        let r = IndexRange {
            start: i64::MAX - 5,
            stop: i64::MAX,
            step: 4,
        };
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![i64::MAX - 5, i64::MAX - 1]);
        assert_eq!(r.last(), Some(i64::MAX - 1));

        let r = RangeSpec::new(Some(-3), None, None).indices(i64::MAX).unwrap();
        assert_eq!(r.iter().count(), 3);
    }

    #[test]
    fn test_display_round_trips_text() {
        assert_eq!(RangeSpec::parse(":").unwrap().to_string(), ":");
        assert_eq!(RangeSpec::parse("1:9:2").unwrap().to_string(), "1:9:2");
    }

    #[test]
    fn test_parse_exclude() {
        assert!(ExclusionSet::parse("").unwrap().is_empty());
        let set = ExclusionSet::parse("5, 2,7").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![2, 5, 7]);
        assert!(set.contains(2));
        assert!(!set.contains(3));
        assert!(matches!(
            ExclusionSet::parse("1,x"),
            Err(Error::InvalidExclude(_))
        ));
    }
}
