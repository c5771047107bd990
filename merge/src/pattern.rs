//! Builds the filename regex from basenames, separator and extension.

use log::warn;
use regex::escape;

use crate::error::{Error, Result};

pub const DEFAULT_PATTERN: &str = r"(?P<basename>{basename}){sep}(?P<index>[0-9]+)\.{ext}$";
pub const DEFAULT_SEP: &str = "-";
pub const DEFAULT_EXT: &str = "tif";

/// Basename alternative used by `--all`.
const ANY_BASENAME: &str = ".*";

/// Substitutes `{basename}`, `{sep}` and `{ext}` into `template`.
///
/// Basenames are regex-escaped and joined into one alternation; with `all` they are
/// replaced by `.*`. Separator and extension are inserted as given. Other braces in
/// the template are left alone so regex repetitions like `{3}` keep working.
pub fn build_pattern(
    template: &str,
    basenames: &[String],
    all: bool,
    sep: &str,
    ext: &str,
) -> Result<String> {
    let basename = if all {
        if !basenames.is_empty() {
            warn!("Ignoring positional arguments because --all is given");
        }
        ANY_BASENAME.to_string()
    } else {
        if basenames.is_empty() {
            return Err(Error::NoBasename);
        }
        basenames
            .iter()
            .map(|b| escape(b))
            .collect::<Vec<_>>()
            .join("|")
    };

    Ok(template
        .replace("{basename}", &basename)
        .replace("{sep}", sep)
        .replace("{ext}", ext))
}
