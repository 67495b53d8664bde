//! Error types for diagram compilation.
//!
//! Every variant is fatal: when one is returned no document is produced.
//! Unresolved references and complexity findings are not errors and never
//! appear here.

use std::io;

use thiserror::Error;

use crate::math::LabelError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("specification source must be non-empty text")]
    EmptySource,

    #[error("specification must contain at least one node")]
    NoNodes,

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("missing section C (nodes)")]
    MissingNodeSection,

    #[error("no nodes parsed from section C")]
    NoParsedNodes,

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid label {label:?}: {source}")]
    Label {
        label: String,
        #[source]
        source: LabelError,
    },

    #[error("unknown built-in theme '{name}'; available: {available}")]
    UnknownTheme { name: String, available: String },

    #[error("invalid theme: {0}")]
    InvalidTheme(String),

    #[error("invalid TOML theme: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn label(label: &str, source: LabelError) -> Self {
        Self::Label {
            label: label.to_string(),
            source,
        }
    }
}
