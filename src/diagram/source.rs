//! Front-ends that turn source text into a [`Specification`].

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::diagram::sections::SectionSource;
use crate::diagram::types::Specification;
use crate::error::Error;

static NODE_ID_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*ID\s*:\s*N\d+\s*$").expect("valid id pattern"));

/// Anything that can read a specification from text.
pub trait SpecSource {
    fn read(&self, text: &str) -> Result<Specification, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredFormat {
    Yaml,
    Json,
}

/// YAML or JSON documents deserialized straight into the data model.
#[derive(Debug, Clone, Copy)]
pub struct StructuredSource {
    pub format: StructuredFormat,
}

impl StructuredSource {
    pub fn yaml() -> Self {
        Self {
            format: StructuredFormat::Yaml,
        }
    }

    pub fn json() -> Self {
        Self {
            format: StructuredFormat::Json,
        }
    }
}

impl SpecSource for StructuredSource {
    fn read(&self, text: &str) -> Result<Specification, Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptySource);
        }
        let spec = match self.format {
            StructuredFormat::Yaml => serde_yaml::from_str(text)?,
            StructuredFormat::Json => serde_json::from_str(text)?,
        };
        Ok(spec)
    }
}

/// Every supported input syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Yaml,
    Json,
    Sections,
}

impl InputFormat {
    /// Guesses from a file extension. `.txt` and `.md` hold tagged sections.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(InputFormat::Yaml),
            "json" => Some(InputFormat::Json),
            "txt" | "md" => Some(InputFormat::Sections),
            _ => None,
        }
    }

    /// Guesses from content: a leading `{` means JSON, `ID: N<k>` lines mean
    /// tagged sections, anything else is read as YAML.
    pub fn sniff(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            InputFormat::Json
        } else if NODE_ID_LINE.is_match(text) {
            InputFormat::Sections
        } else {
            InputFormat::Yaml
        }
    }

    pub fn source(self) -> Box<dyn SpecSource> {
        match self {
            InputFormat::Yaml => Box::new(StructuredSource::yaml()),
            InputFormat::Json => Box::new(StructuredSource::json()),
            InputFormat::Sections => Box::new(SectionSource),
        }
    }
}
