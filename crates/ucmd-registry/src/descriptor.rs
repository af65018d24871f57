//! Parser for the text a device sends in answer to a discovery request.
//!
//! One command per line, `name(types|names)`:
//! - `name`: one or more word characters
//! - `types`: zero or more type codes, one per argument, no separator
//! - `|names`: optional comma-separated argument names, one per type
//!
//! The pattern may appear anywhere in a line. Lines without it (blank lines,
//! boot banners, debug prints) are skipped.

use std::fmt;
use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::trace;

static ADVERTISEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)(\w+)\((\w*)\|?((?:\w,?)*)\)").expect("advertisement pattern is valid")
});

/// One command as advertised by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub name: String,
    /// Type codes in argument order, e.g. `"hhf"`.
    pub type_codes: String,
    /// Argument names, when the device sent any.
    pub arg_names: Option<Vec<String>>,
}

impl fmt::Display for Advertisement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.name, self.type_codes)?;
        if let Some(names) = &self.arg_names {
            write!(f, "|{}", names.join(","))?;
        }
        f.write_str(")")
    }
}

/// Parse a single descriptor line.
pub fn parse_line(line: &[u8]) -> Option<Advertisement> {
    let captures = ADVERTISEMENT.captures(line)?;
    let group = |i: usize| {
        captures
            .get(i)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .unwrap_or_default()
    };

    let names: Vec<String> = group(3)
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    Some(Advertisement {
        name: group(1),
        type_codes: group(2),
        arg_names: (!names.is_empty()).then_some(names),
    })
}

/// Parse every advertisement in a descriptor, in order.
pub fn parse_descriptor(descriptor: &[u8]) -> Vec<Advertisement> {
    descriptor
        .split(|byte| *byte == b'\n')
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() && !line.is_empty() {
                trace!(line = %String::from_utf8_lossy(line), "skipping descriptor line");
            }
            parsed
        })
        .collect()
}
