//! Dotted-numeric tool versions.
//!
//! External toolchains report versions in banners like `FLIRT version 6.0`
//! or `5.0.11`. We only need the numeric components, compared
//! component-wise so that `5.0.11` sorts above `5.0.9`.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)+)").expect("valid version regex"));

/// A parsed dotted-numeric version such as `5.0.11`
#[derive(Debug, Clone)]
pub struct ToolVersion {
    components: Vec<u32>,
    raw: String,
}

impl ToolVersion {
    /// Extract the first dotted-numeric token from `text`
    pub fn parse(text: &str) -> Option<Self> {
        let captures = VERSION_TOKEN.captures(text)?;
        let raw = captures[1].to_string();
        let components = raw
            .split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<u32>>>()?;
        Some(Self { components, raw })
    }

    /// Parse a version from probe output, looking at the first line only.
    ///
    /// Version banners frequently carry build metadata on later lines, and
    /// that metadata tends to contain unrelated numbers.
    pub fn from_probe_output(output: &str) -> Option<Self> {
        output.lines().next().and_then(Self::parse)
    }

    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for ToolVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Missing trailing components count as zero: 5.0 == 5.0.0
        let len = self.components.len().max(other.components.len());
        for index in 0..len {
            let left = self.components.get(index).copied().unwrap_or(0);
            let right = other.components.get(index).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ToolVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ToolVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ToolVersion {}
