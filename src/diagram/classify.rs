//! Label → shape category mapping and node sizing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Fixed shape/style categories a node can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Service,
    Process,
    Database,
    Decision,
    Terminal,
    Queue,
    User,
    Document,
    Formula,
    Cloud,
    Input,
    Output,
    Loss,
    Feature,
    Conv,
    Pool,
    Embed,
    Temporal,
    Attention,
    Gate,
    Norm,
    Graph,
    Matrix,
    Operator,
    Tensor3d,
}

/// Scanned top to bottom; the first category with a matching keyword wins.
/// Several keywords overlap ("input gate" vs "input_", "graph conv" vs "conv2d"),
/// so the order here decides the result.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Database,
        &["database", "db", "sql", "storage", "redis", "mongo", "postgresql", "mysql", "cache"],
    ),
    (
        Category::Decision,
        &["decision", "condition", "branch", "switch", "route"],
    ),
    (
        Category::Terminal,
        &["start", "begin", "end", "finish", "stop", "terminate"],
    ),
    (
        Category::Queue,
        &["queue", "buffer", "kafka", "rabbitmq", "stream", "sqs", "message"],
    ),
    (
        Category::User,
        &["user", "user icon", "client", "person", "customer", "human"],
    ),
    (
        Category::Document,
        &["document", "doc", "file", "report", "log"],
    ),
    (Category::Formula, &["formula", "equation", "math", "$$"]),
    (Category::Cloud, &["cloud", "internet", "external", "web"]),
    (
        Category::Input,
        &[
            "input_", "input layer", "inputdata", "x_train", "x_test", "sample batch",
            "input data", "input signal",
        ],
    ),
    (
        Category::Output,
        &[
            "output_", "output layer", "prediction", "y_hat", "logits", "probs",
            "output data", "reconstructed",
        ],
    ),
    (
        Category::Loss,
        &[
            "loss", "criterion", "objective", "mse loss", "cross_entropy", "bceloss",
            "loss function", "error",
        ],
    ),
    (
        Category::Feature,
        &["feature extractor", "backbone", "encoder block", "feature extraction"],
    ),
    (
        Category::Conv,
        &[
            "conv1d", "conv2d", "conv3d", "convolution", "convolutional", "tcn", "1d conv",
            "2d conv", "3d conv",
        ],
    ),
    (
        Category::Pool,
        &[
            "pooling", "maxpool", "avgpool", "adaptive pool", "max pooling", "avg pooling",
            "global pool",
        ],
    ),
    (
        Category::Embed,
        &["embedding", "embeddings", "lookup", "token embed", "word embed", "positional"],
    ),
    (
        Category::Temporal,
        &[
            "lstm", "rnn", "gru", "temporal", "recurrent", "sequence", "seq2seq", "bilstm",
            "bigru", "hidden state",
        ],
    ),
    (
        Category::Attention,
        &[
            "attention", "attn", "softmax", "transformer", "self-attention", "multi-head",
            "mha", "cross-attention", "qkv",
        ],
    ),
    (
        Category::Norm,
        &[
            "batchnorm", "layernorm", "groupnorm", "instancenorm", "normalization",
            "batch norm", "layer norm", "dropout",
        ],
    ),
    (
        Category::Gate,
        &[
            "gating", "gate mechanism", "multiply gate", "sigmoid gate", "tanh gate",
            "forget gate", "input gate", "output gate",
        ],
    ),
    (
        Category::Graph,
        &[
            "graph conv", "gcn", "gnn", "graph attention", "adjacency", "node feature",
            "edge feature", "message passing", "aggregation",
        ],
    ),
    (
        Category::Matrix,
        &[
            "matmul", "linear layer", "fc layer", "dense layer", "mlp", "weight matrix",
            "fully connected", "projection",
        ],
    ),
    (
        Category::Operator,
        &["⊕", "⊗", "⊙", "concat", "element-wise", "hadamard", "residual add", "skip add", "⊞"],
    ),
    (
        Category::Tensor3d,
        &[
            "tensor", "feature map", "3d feature", "activation map", "channel", "h×w×c", "hwc",
            "chw", "nchw", "nhwc", "cube", "3d block", "volume",
        ],
    ),
];

static DECISION_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:check|if|valid)\b").expect("valid decision pattern"));

impl Category {
    pub const ALL: [Category; 25] = [
        Category::Service,
        Category::Process,
        Category::Database,
        Category::Decision,
        Category::Terminal,
        Category::Queue,
        Category::User,
        Category::Document,
        Category::Formula,
        Category::Cloud,
        Category::Input,
        Category::Output,
        Category::Loss,
        Category::Feature,
        Category::Conv,
        Category::Pool,
        Category::Embed,
        Category::Temporal,
        Category::Attention,
        Category::Gate,
        Category::Norm,
        Category::Graph,
        Category::Matrix,
        Category::Operator,
        Category::Tensor3d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Service => "service",
            Category::Process => "process",
            Category::Database => "database",
            Category::Decision => "decision",
            Category::Terminal => "terminal",
            Category::Queue => "queue",
            Category::User => "user",
            Category::Document => "document",
            Category::Formula => "formula",
            Category::Cloud => "cloud",
            Category::Input => "input",
            Category::Output => "output",
            Category::Loss => "loss",
            Category::Feature => "feature",
            Category::Conv => "conv",
            Category::Pool => "pool",
            Category::Embed => "embed",
            Category::Temporal => "temporal",
            Category::Attention => "attention",
            Category::Gate => "gate",
            Category::Norm => "norm",
            Category::Graph => "graph",
            Category::Matrix => "matrix",
            Category::Operator => "operator",
            Category::Tensor3d => "tensor3d",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// draw.io shape fragment placed at the front of the node style.
    pub fn shape_style(self) -> &'static str {
        match self {
            Category::Service | Category::Process => "rounded=1;arcSize=20",
            Category::Database => "shape=cylinder3;boundedLbl=1;backgroundOutline=1;size=15",
            Category::Decision => "rhombus",
            Category::Terminal => "rounded=1;arcSize=50",
            Category::Queue => "shape=parallelogram;perimeter=parallelogramPerimeter;fixedSize=1",
            Category::User | Category::Operator => "ellipse",
            Category::Document => "shape=document;boundedLbl=1",
            Category::Formula => "rounded=1",
            Category::Cloud => "ellipse;shape=cloud",
            Category::Input
            | Category::Output
            | Category::Loss
            | Category::Feature
            | Category::Embed
            | Category::Temporal
            | Category::Attention
            | Category::Graph => "rounded=1;arcSize=15",
            Category::Conv | Category::Pool | Category::Gate | Category::Norm => {
                "rounded=1;arcSize=10"
            }
            Category::Matrix => "rounded=1;arcSize=5",
            Category::Tensor3d => "shape=cube;size=10;direction=south",
        }
    }

    fn default_size(self) -> Option<SizePreset> {
        match self {
            Category::Operator => Some(SizePreset::Tiny),
            Category::Decision => Some(SizePreset::Medium),
            Category::Terminal | Category::User => Some(SizePreset::Small),
            Category::Tensor3d => Some(SizePreset::TensorMd),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Picks the category for a node label.
///
/// An explicit type naming a known category always wins. Otherwise math
/// delimiters mark a formula, a question or check/if/valid marks a decision,
/// then the keyword table is consulted. Anything else is a service.
pub fn classify(label: &str, explicit_type: Option<&str>) -> Category {
    if let Some(category) = explicit_type.and_then(Category::from_name) {
        return category;
    }

    if label.contains("$$") || label.contains("\\(") || label.contains("\\[") {
        return Category::Formula;
    }

    if label.contains('?') || DECISION_WORD.is_match(label) {
        return Category::Decision;
    }

    let lower = label.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Service)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Tiny,
    Small,
    Medium,
    Large,
    Xl,
    TensorSm,
    TensorMd,
    TensorLg,
    TensorXl,
}

impl SizePreset {
    pub fn from_name(name: &str) -> Option<Self> {
        let preset = match name {
            "tiny" => SizePreset::Tiny,
            "small" => SizePreset::Small,
            "medium" => SizePreset::Medium,
            "large" => SizePreset::Large,
            "xl" => SizePreset::Xl,
            "tensor_sm" => SizePreset::TensorSm,
            "tensor_md" => SizePreset::TensorMd,
            "tensor_lg" => SizePreset::TensorLg,
            "tensor_xl" => SizePreset::TensorXl,
            _ => return None,
        };
        Some(preset)
    }

    /// `(width, height)` in diagram units.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            SizePreset::Tiny => (32.0, 32.0),
            SizePreset::Small => (80.0, 40.0),
            SizePreset::Medium => (120.0, 60.0),
            SizePreset::Large => (160.0, 80.0),
            SizePreset::Xl => (200.0, 100.0),
            SizePreset::TensorSm => (40.0, 48.0),
            SizePreset::TensorMd => (60.0, 72.0),
            SizePreset::TensorLg => (80.0, 96.0),
            SizePreset::TensorXl => (100.0, 120.0),
        }
    }
}

/// Explicit preset, then the category's default, then medium. Unknown preset
/// names are ignored.
pub fn node_size(size: Option<&str>, category: Category) -> (f64, f64) {
    size.and_then(SizePreset::from_name)
        .or_else(|| category.default_size())
        .unwrap_or(SizePreset::Medium)
        .dimensions()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_type_wins() {
        assert_eq!(classify("API Gateway", Some("service")), Category::Service);
        assert_eq!(classify("Users", Some("database")), Category::Database);
        assert_eq!(classify("Start", Some("process")), Category::Process);
    }

    #[test]
    fn unknown_explicit_type_falls_through() {
        assert_eq!(classify("User Database", Some("widget")), Category::Database);
    }

    #[test]
    fn database_keywords() {
        assert_eq!(classify("User Database", None), Category::Database);
        assert_eq!(classify("PostgreSQL", None), Category::Database);
        assert_eq!(classify("Redis Cache", None), Category::Database);
        assert_eq!(classify("Data Storage", None), Category::Database);
    }

    #[test]
    fn decision_patterns() {
        assert_eq!(classify("Is it valid?", None), Category::Decision);
        assert_eq!(classify("Check Condition", None), Category::Decision);
        assert_eq!(classify("Decision Point", None), Category::Decision);
        assert_eq!(classify("Retry if needed", None), Category::Decision);
        // Whole words only.
        assert_eq!(classify("Validator", None), Category::Service);
    }

    #[test]
    fn formula_delimiters_beat_everything_but_explicit_type() {
        assert_eq!(classify("$$E = mc^2$$", None), Category::Formula);
        assert_eq!(classify("Linear: \\(y = mx + b\\)", None), Category::Formula);
        assert_eq!(classify("Is \\(x > 0\\)?", None), Category::Formula);
    }

    #[test]
    fn terminal_and_queue_keywords() {
        assert_eq!(classify("Start", None), Category::Terminal);
        assert_eq!(classify("End Process", None), Category::Terminal);
        assert_eq!(classify("Message Queue", None), Category::Queue);
        assert_eq!(classify("Kafka Topic", None), Category::Queue);
    }

    #[test]
    fn deep_learning_keywords() {
        assert_eq!(classify("BiLSTM", None), Category::Temporal);
        assert_eq!(classify("Multi-Head Attention", None), Category::Attention);
        assert_eq!(classify("Encoder Block", None), Category::Feature);
        assert_eq!(classify("Conv2D Layer", None), Category::Conv);
        assert_eq!(classify("LayerNorm", None), Category::Norm);
        assert_eq!(classify("MatMul", None), Category::Matrix);
        assert_eq!(classify("⊕", None), Category::Operator);
    }

    #[test]
    fn declaration_order_resolves_overlaps() {
        assert_eq!(classify("Graph Conv", None), Category::Graph);
        assert_eq!(classify("Feature Map", None), Category::Tensor3d);
        assert_eq!(classify("NCHW", None), Category::Tensor3d);
        assert_eq!(classify("Forget Gate", None), Category::Gate);
        assert_eq!(classify("Dropout", None), Category::Norm);
        // "backend" contains "end", so terminal wins over the default.
        assert_eq!(classify("Backend", None), Category::Terminal);
    }

    #[test]
    fn defaults_to_service() {
        assert_eq!(classify("API Gateway", None), Category::Service);
        assert_eq!(classify("Unknown Component", None), Category::Service);
    }

    #[test]
    fn preset_sizes() {
        assert_eq!(node_size(Some("tiny"), Category::Service), (32.0, 32.0));
        assert_eq!(node_size(Some("xl"), Category::Service), (200.0, 100.0));
        assert_eq!(node_size(Some("tensor_lg"), Category::Service), (80.0, 96.0));
    }

    #[test]
    fn category_default_sizes() {
        assert_eq!(node_size(None, Category::Operator), (32.0, 32.0));
        assert_eq!(node_size(None, Category::Decision), (120.0, 60.0));
        assert_eq!(node_size(None, Category::Tensor3d), (60.0, 72.0));
        assert_eq!(node_size(Some("large"), Category::Operator), (160.0, 80.0));
        assert_eq!(node_size(Some("unknown"), Category::Terminal), (80.0, 40.0));
        assert_eq!(node_size(None, Category::Service), (120.0, 60.0));
    }

    #[test]
    fn names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
    }
}
