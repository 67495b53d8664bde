//! Compile graph specifications into laid-out, themed draw.io diagrams.
//!
//! ```no_run
//! use drawspec::{InputFormat, compile_str};
//!
//! let yaml = "nodes:\n  - id: api\n    label: API Gateway\n";
//! let xml = compile_str(yaml, InputFormat::Yaml, None)?;
//! assert!(xml.contains("mxGraphModel"));
//! # Ok::<(), drawspec::Error>(())
//! ```

pub mod diagram;
mod error;
pub mod math;
pub mod theme;
pub mod xml;

use log::{debug, info, warn};

pub use diagram::{
    Document, Finding, InputFormat, Level, SpecSource, Specification, audit,
};
pub use error::Error;
pub use theme::Theme;

/// Picks the theme for a specification: an explicit theme wins, then the
/// built-in named by `meta.theme`, then the default.
pub fn resolve_theme<'a>(spec: &Specification, theme: Option<&'a Theme>) -> &'a Theme {
    if let Some(theme) = theme {
        return theme;
    }
    match spec.meta.theme.as_deref() {
        None => Theme::default_theme(),
        Some(name) => Theme::builtin(name).unwrap_or_else(|| {
            warn!(theme = name; "Unknown theme, using default");
            Theme::default_theme()
        }),
    }
}

/// Validates, lays out and builds the document for a specification.
pub fn compile_document(spec: &Specification, theme: Option<&Theme>) -> Result<Document, Error> {
    spec.validate()?;
    let theme = resolve_theme(spec, theme);

    info!(
        theme = theme.name.as_str(),
        nodes = spec.nodes.len(),
        edges = spec.edges.len(),
        modules = spec.modules.len();
        "Laying out diagram"
    );
    let layout = diagram::layout(spec, theme);
    debug!(
        positioned = layout.nodes.len(),
        containers = layout.modules.len();
        "Layout calculated"
    );

    let document = diagram::build(spec, theme, &layout)?;
    debug!(cells = document.cells.len(); "Document built");
    Ok(document)
}

/// Compiles a specification into draw.io XML.
pub fn compile(spec: &Specification, theme: Option<&Theme>) -> Result<String, Error> {
    compile_document(spec, theme).map(|doc| doc.to_xml())
}

/// Reads `text` in the given format and compiles it.
pub fn compile_str(text: &str, format: InputFormat, theme: Option<&Theme>) -> Result<String, Error> {
    let spec = format.source().read(text)?;
    compile(&spec, theme)
}
