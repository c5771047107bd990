//! Output filename templates with `{basename}`, `{start}` and `{stop}` placeholders.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_AVG: &str = "{basename}_avg_{start}_{stop}.tif";
pub const DEFAULT_SUM: &str = "{basename}_sum_{start}_{stop}.tif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Basename,
    Start,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        field: Field,
        width: usize,
        zero_pad: bool,
    },
}

/// A parsed filename template.
///
/// `{{` and `}}` produce literal braces. `{start}` and `{stop}` accept a width such as
/// `{start:04}` or `{start:4d}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl OutputTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::Template {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}'")),
                '{' => {
                    let mut placeholder = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => placeholder.push(c),
                            None => return Err(invalid("unclosed '{'")),
                        }
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&placeholder).map_err(|reason| invalid(&reason))?);
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Template text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the template contains any placeholder.
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| matches!(segment, Segment::Field { .. }))
    }

    pub fn format(&self, basename: &str, start: i64, stop: i64) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    field: Field::Basename,
                    ..
                } => out.push_str(basename),
                Segment::Field {
                    field,
                    width,
                    zero_pad,
                } => {
                    let value = if *field == Field::Start { start } else { stop };
                    if *zero_pad {
                        out.push_str(&format!("{:0width$}", value, width = *width));
                    } else {
                        out.push_str(&format!("{:width$}", value, width = *width));
                    }
                }
            }
        }
        out
    }
}

fn parse_field(placeholder: &str) -> std::result::Result<Segment, String> {
    let (name, spec) = match placeholder.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (placeholder, None),
    };

    let field = match name {
        "basename" => Field::Basename,
        "start" => Field::Start,
        "stop" => Field::Stop,
        other => return Err(format!("unknown placeholder '{{{}}}'", other)),
    };

    let Some(spec) = spec else {
        return Ok(Segment::Field {
            field,
            width: 0,
            zero_pad: false,
        });
    };

    if field == Field::Basename {
        return Err("'{basename}' takes no format spec".to_string());
    }

    let digits = spec.strip_suffix('d').unwrap_or(spec);
    let width = if digits.is_empty() {
        0
    } else {
        digits
            .parse::<usize>()
            .map_err(|_| format!("invalid format spec '{}'", spec))?
    };

    Ok(Segment::Field {
        field,
        width,
        zero_pad: digits.starts_with('0'),
    })
}

impl FromStr for OutputTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
