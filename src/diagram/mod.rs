mod audit;
mod classify;
mod document;
mod layout;
mod sections;
mod source;
mod style;
mod types;

pub use audit::{Finding, Level, audit};
pub use classify::{Category, SizePreset, classify, node_size};
pub use document::{Cell, Document, build};
pub use layout::{Bucket, Layout, Rect, layout, snap_to_grid};
pub use sections::SectionSource;
pub use source::{InputFormat, SpecSource, StructuredFormat, StructuredSource};
pub use style::{connector_style, module_style, node_style};
pub use types::{Edge, LayoutKind, Meta, Module, Node, Specification, StyleOverrides};
