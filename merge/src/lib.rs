pub mod accumulator;
pub mod cli;
pub mod error;
pub mod grouping;
pub mod orchestrator;
pub mod pattern;
pub mod range;
pub mod resolve;
pub mod template;

pub use accumulator::{Accumulator, Precision, Value};
pub use error::{Error, Result};
pub use grouping::{group_files, FilePattern, Group, Groups, IndexedItem};
pub use orchestrator::{
    merge, merge_verbatim, FileStore, GroupReport, ImageStore, MergeConfig, MergeReport,
    VerbatimConfig,
};
pub use range::{ExclusionSet, IndexRange, RangeSpec};
pub use resolve::{resolve, Resolution};
pub use template::OutputTemplate;
