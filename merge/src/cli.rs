//! Command line arguments and their conversion into a validated job.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use common::log_setup::LogConfig;
use log::debug;

use crate::error::Result;
use crate::grouping::FilePattern;
use crate::orchestrator::{MergeConfig, VerbatimConfig};
use crate::pattern::{build_pattern, DEFAULT_EXT, DEFAULT_PATTERN, DEFAULT_SEP};
use crate::range::{ExclusionSet, RangeSpec};
use crate::template::{OutputTemplate, DEFAULT_AVG, DEFAULT_SUM};

/// Calculate reduced statistics over multiple images.
///
/// Files named like `<basename><sep><index>.<ext>` are grouped by basename and every
/// group is reduced to an average and a sum image.
#[derive(Debug, Parser)]
#[command(name = "merge", version, about)]
pub struct Args {
    /// Basename part of filenames to merge
    #[arg(value_name = "BASENAME")]
    pub basenames: Vec<String>,

    /// Same as basename=".*" without escaping
    #[arg(long)]
    pub all: bool,

    /// Separator between basename and index
    #[arg(long, default_value = DEFAULT_SEP, allow_hyphen_values = true)]
    pub sep: String,

    /// Filename extension
    #[arg(long, default_value = DEFAULT_EXT)]
    pub ext: String,

    /// Full filename regex with named groups "basename" and "index"
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Indices to merge as "start:stop:step", "stop" is not included
    #[arg(long, default_value = ":", allow_hyphen_values = true)]
    pub slice: String,

    /// Include "stop" of --slice
    #[arg(long)]
    pub inclusive_stop: bool,

    /// Comma-separated list of indices to exclude
    #[arg(long, short = 'e', default_value = "")]
    pub exclude: String,

    /// Root directory for data to load
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: PathBuf,

    /// Directory the output filenames are relative to
    #[arg(long, short = 'o', default_value = ".")]
    pub out_dir: PathBuf,

    /// Filename for saving the average [default: "{basename}_avg_{start}_{stop}.tif"]
    #[arg(long)]
    pub avg: Option<String>,

    /// Filename for saving the sum [default: "{basename}_sum_{start}_{stop}.tif"]
    #[arg(long)]
    pub sum: Option<String>,

    /// Do not save the average
    #[arg(long, conflicts_with = "avg")]
    pub no_avg: bool,

    /// Do not save the sum
    #[arg(long, conflicts_with = "sum")]
    pub no_sum: bool,

    /// Reduce verbosity (can be given multiple times)
    #[arg(long, short = 'q', action = ArgAction::Count)]
    pub quiet: u8,

    /// Write logs to a file with the given name
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Merge exactly these files; --avg and --sum are used as given
    #[arg(
        long,
        value_name = "FILE",
        num_args = 1..,
        conflicts_with_all = ["basenames", "all"]
    )]
    pub verbatim: Vec<PathBuf>,
}

/// A validated unit of work.
#[derive(Debug, Clone)]
pub enum Job {
    Groups(MergeConfig),
    Verbatim(VerbatimConfig),
}

impl Args {
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            console_level: LogConfig::level_for_quiet(self.quiet),
            file: self.log.clone(),
        }
    }

    /// Validates everything that can be checked without touching files.
    pub fn into_job(self) -> Result<Job> {
        if !self.verbatim.is_empty() {
            let config = VerbatimConfig {
                files: self.verbatim,
                avg: self.avg.map(PathBuf::from),
                sum: self.sum.map(PathBuf::from),
            };
            config.validate()?;
            return Ok(Job::Verbatim(config));
        }

        let pattern = build_pattern(
            &self.pattern,
            &self.basenames,
            self.all,
            &self.sep,
            &self.ext,
        )?;
        debug!("Using pattern '{}'", pattern);

        let mut range = RangeSpec::parse(&self.slice)?;
        if self.inclusive_stop {
            range = range.with_inclusive_stop();
        }

        Ok(Job::Groups(MergeConfig {
            pattern: FilePattern::new(&pattern)?,
            dir: self.dir,
            out_dir: self.out_dir,
            range,
            exclude: ExclusionSet::parse(&self.exclude)?,
            avg: output_template(self.no_avg, self.avg, DEFAULT_AVG)?,
            sum: output_template(self.no_sum, self.sum, DEFAULT_SUM)?,
        }))
    }
}

fn output_template(
    disabled: bool,
    given: Option<String>,
    default: &str,
) -> Result<Option<OutputTemplate>> {
    if disabled {
        return Ok(None);
    }
    let text = given.as_deref().unwrap_or(default);
    OutputTemplate::parse(text).map(Some)
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::*;
    use crate::error::Error;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("merge").chain(argv.iter().copied())).unwrap()
    }

    fn groups(argv: &[&str]) -> MergeConfig {
        match args(argv).into_job().unwrap() {
            Job::Groups(config) => config,
            job => panic!("unexpected job {:?}", job),
        }
    }

    #[test]
    fn test_defaults() {
        let config = groups(&["foo"]);
        assert_eq!(
            config.pattern.as_str(),
            r"(?P<basename>foo)-(?P<index>[0-9]+)\.tif$"
        );
        assert_eq!(config.dir, PathBuf::from("."));
        assert_eq!(config.out_dir, PathBuf::from("."));
        assert_eq!(config.range, RangeSpec::full());
        assert!(config.exclude.is_empty());
        assert_eq!(config.avg.unwrap().as_str(), DEFAULT_AVG);
        assert_eq!(config.sum.unwrap().as_str(), DEFAULT_SUM);
    }

    #[test]
    fn test_escape_and_join_basenames() {
        let config = groups(&["foo(bar)", "baz"]);
        assert_eq!(
            config.pattern.as_str(),
            r"(?P<basename>foo\(bar\)|baz)-(?P<index>[0-9]+)\.tif$"
        );
    }

    #[test]
    fn test_sep_ext_all() {
        let config = groups(&["--all", "--sep", "_", "--ext", "cbf"]);
        assert_eq!(
            config.pattern.as_str(),
            r"(?P<basename>.*)_(?P<index>[0-9]+)\.cbf$"
        );
    }

    #[test]
    fn test_slice_exclude_and_dirs() {
        let config = groups(&[
            "a", "--slice", "-3:", "-e", "4,6", "-d", "/data", "-o", "/out",
        ]);
        assert_eq!(config.range, RangeSpec::new(Some(-3), None, None));
        assert_eq!(config.exclude.iter().collect::<Vec<_>>(), vec![4, 6]);
        assert_eq!(config.dir, PathBuf::from("/data"));
        assert_eq!(config.out_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_inclusive_stop() {
        let config = groups(&["a", "--slice", "1:3", "--inclusive-stop"]);
        assert_eq!(config.range, RangeSpec::new(Some(1), Some(4), None));
    }

    #[test]
    fn test_output_switches() {
        let config = groups(&["a", "--no-avg", "--sum", "{basename}.tif"]);
        assert!(config.avg.is_none());
        assert_eq!(config.sum.unwrap().format("a", 0, 1), "a.tif");

        assert!(Args::try_parse_from(["merge", "a", "--no-avg", "--avg", "x.tif"]).is_err());
    }

    #[test]
    fn test_configuration_errors() {
        let cases: &[&[&str]] = &[
            &[],
            &["a", "--slice", "5"],
            &["a", "--slice", "::-1"],
            &["a", "-e", "1,x"],
            &["a", "--pattern", r"(?P<basename>{basename})\.tif$"],
            &["a", "--avg", "{name}.tif"],
        ];
        for argv in cases {
            let err = args(argv).into_job().unwrap_err();
            assert!(err.is_configuration(), "{:?}: {}", argv, err);
        }
        assert!(matches!(args(&[]).into_job(), Err(Error::NoBasename)));
    }

    #[test]
    fn test_verbatim() {
        let job = args(&["--verbatim", "x.tif", "y.tif", "--avg", "out/avg.tif"])
            .into_job()
            .unwrap();
        let Job::Verbatim(config) = job else {
            panic!("expected a verbatim job");
        };
        assert_eq!(
            config.files,
            vec![PathBuf::from("x.tif"), PathBuf::from("y.tif")]
        );
        assert_eq!(config.avg, Some(PathBuf::from("out/avg.tif")));
        assert_eq!(config.sum, None);

        let err = args(&["--verbatim", "x.tif", "y.tif"]).into_job().unwrap_err();
        assert!(matches!(err, Error::NoOutput));
        let err = args(&["--verbatim", "x.tif", "--sum", "s.tif"])
            .into_job()
            .unwrap_err();
        assert!(matches!(err, Error::TooFewFiles(1)));
    }

    #[test]
    fn test_verbatim_conflicts_with_basenames() {
        assert!(Args::try_parse_from(["merge", "--all", "--verbatim", "x.tif", "y.tif"]).is_err());
    }

    #[test]
    fn test_log_config() {
        let a = args(&["a"]);
        assert_eq!(a.log_config(), LogConfig::default());

        let a = args(&["a", "-qq", "--log", "merge.log"]);
        let config = a.log_config();
        assert_eq!(config.console_level, LevelFilter::Error);
        assert_eq!(config.file, Some(PathBuf::from("merge.log")));

        assert_eq!(args(&["a", "-q"]).log_config().console_level, LevelFilter::Warn);
    }
}
