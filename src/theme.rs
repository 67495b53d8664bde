use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Error;

const DEFAULT_THEME: &str = "tech-blue";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("tech-blue", include_str!("../themes/tech-blue.toml")),
    ("ieee", include_str!("../themes/ieee.toml")),
    ("midnight", include_str!("../themes/midnight.toml")),
];

const GRID_SIZE: f64 = 8.0;
const CONTAINER_PADDING: f64 = 24.0;
const BACKGROUND: &str = "#FFFFFF";
const TEXT_MUTED: &str = "#64748B";
const LABEL_FONT_SIZE: f64 = 11.0;

/// Parsed once; every caller shares the same values.
static BUILTINS: LazyLock<Vec<Theme>> = LazyLock::new(|| {
    BUILTIN_THEMES
        .iter()
        .map(|(name, content)| {
            Theme::from_toml(content)
                .unwrap_or_else(|err| panic!("built-in theme '{name}' must parse: {err}"))
        })
        .collect()
});

/// Colors, typography and per-category style defaults for a diagram.
///
/// Every entry is optional; the style generators fall back to literal defaults
/// for anything a theme leaves out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub colors: IndexMap<String, String>,
    #[serde(default)]
    pub typography: Typography,
    /// Keyed by category name plus a `default` entry.
    #[serde(default)]
    pub node: IndexMap<String, NodeStyle>,
    /// Keyed by connector type. `primary` is the fallback entry.
    #[serde(default)]
    pub connector: IndexMap<String, ConnectorStyle>,
    #[serde(default)]
    pub module: ModuleStyle,
    #[serde(default)]
    pub canvas: Canvas,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    #[serde(default)]
    pub font_family: FontFamilies,
    #[serde(default)]
    pub font_size: FontSizes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontFamilies {
    pub primary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontSizes {
    /// Used for edge labels.
    pub sm: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub font_color: Option<String>,
    pub font_size: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorStyle {
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub dashed: Option<bool>,
    pub dash_pattern: Option<String>,
    pub end_arrow: Option<String>,
    pub end_fill: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStyle {
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub rounded: Option<f64>,
    pub padding: Option<f64>,
    pub label_font_size: Option<f64>,
    pub label_font_weight: Option<u32>,
    pub label_font_color: Option<String>,
    pub dashed: Option<bool>,
    pub dash_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub background: Option<String>,
    pub grid_size: Option<f64>,
}

impl Theme {
    /// The theme used when a specification names none.
    pub fn default_theme() -> &'static Theme {
        Self::builtin(DEFAULT_THEME).expect("default theme is bundled")
    }

    /// Looks up a bundled theme. Names are case-insensitive and `_` matches `-`.
    pub fn builtin(name: &str) -> Option<&'static Theme> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        BUILTINS.iter().find(|theme| theme.name == normalized)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    /// Resolves a bundled theme by name, reporting the available names on failure.
    pub fn from_builtin(name: &str) -> Result<&'static Theme, Error> {
        Self::builtin(name).ok_or_else(|| Error::UnknownTheme {
            name: name.to_string(),
            available: Self::list_builtins().join(", "),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let theme: Theme = toml::from_str(content)?;
        theme.validate()
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        let theme: Theme = serde_yaml::from_str(content)?;
        theme.validate()
    }

    /// Reads a theme file. `.toml` and `.yaml`/`.yml` pick their parser; any
    /// other file is tried as TOML, then YAML.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        Self::from_content(&content, extension.as_deref())
    }

    fn from_content(content: &str, extension: Option<&str>) -> Result<Self, Error> {
        match extension {
            Some("toml") => Self::from_toml(content),
            Some("yaml" | "yml") => Self::from_yaml(content),
            _ => Self::from_toml(content).or_else(|toml_err| {
                Self::from_yaml(content).map_err(|yaml_err| {
                    Error::InvalidTheme(format!(
                        "neither TOML ({toml_err}) nor YAML ({yaml_err})"
                    ))
                })
            }),
        }
    }

    fn validate(self) -> Result<Self, Error> {
        if let Some(grid) = self.canvas.grid_size
            && !(grid.is_finite() && grid > 0.0)
        {
            return Err(Error::InvalidTheme(format!(
                "canvas.gridSize must be a positive number, got {grid}"
            )));
        }
        if let Some(padding) = self.module.padding
            && !(padding.is_finite() && padding >= 0.0)
        {
            return Err(Error::InvalidTheme(format!(
                "module.padding must not be negative, got {padding}"
            )));
        }
        Ok(self)
    }

    pub fn grid_size(&self) -> f64 {
        self.canvas.grid_size.unwrap_or(GRID_SIZE)
    }

    pub fn container_padding(&self) -> f64 {
        self.module.padding.unwrap_or(CONTAINER_PADDING)
    }

    pub fn background(&self) -> &str {
        self.canvas.background.as_deref().unwrap_or(BACKGROUND)
    }

    pub fn text_muted(&self) -> &str {
        self.colors
            .get("textMuted")
            .map(String::as_str)
            .unwrap_or(TEXT_MUTED)
    }

    pub fn label_font_size(&self) -> f64 {
        self.typography.font_size.sm.unwrap_or(LABEL_FONT_SIZE)
    }

    pub fn font_family(&self) -> Option<&str> {
        self.typography.font_family.primary.as_deref()
    }

    pub fn node_entry(&self, category: &str) -> Option<&NodeStyle> {
        self.node.get(category)
    }

    pub fn node_default(&self) -> Option<&NodeStyle> {
        self.node.get("default")
    }

    pub fn connector_entry(&self, kind: &str) -> Option<&ConnectorStyle> {
        self.connector.get(kind)
    }
}
