use indexmap::IndexMap;

use crate::diagram::classify::{classify, node_size};
use crate::diagram::types::{LayoutKind, Node, Specification};
use crate::theme::Theme;

const ORIGIN: f64 = 40.0;
const NODE_GAP: f64 = 32.0;
const HEADER: f64 = 40.0;
const CANVAS_MARGIN: f64 = 80.0;
const GRID_COLUMNS: usize = 4;

/// Absolute placement on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Grouping key for module layout. Nodes without a module share the
/// `Unassigned` bucket, which always comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Bucket {
    Unassigned,
    Module(String),
}

impl Bucket {
    pub fn module_id(&self) -> Option<&str> {
        match self {
            Bucket::Unassigned => None,
            Bucket::Module(id) => Some(id),
        }
    }
}

/// Positions for every node plus the bounding rectangle of every non-empty
/// bucket. Grid layouts carry no bucket rectangles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub nodes: IndexMap<String, Rect>,
    pub modules: IndexMap<Bucket, Rect>,
}

impl Layout {
    /// Canvas extent covering every placed element plus a margin.
    pub fn canvas_size(&self, grid: f64) -> (f64, f64) {
        let rects = self.nodes.values().chain(self.modules.values());
        let (right, bottom) = rects.fold((0.0_f64, 0.0_f64), |(r, b), rect| {
            (r.max(rect.right()), b.max(rect.bottom()))
        });
        (
            snap_to_grid(right + CANVAS_MARGIN, grid),
            snap_to_grid(bottom + CANVAS_MARGIN, grid),
        )
    }
}

pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid).round() * grid
}

/// Smallest grid multiple not below `value`.
fn ceil_to_grid(value: f64, grid: f64) -> f64 {
    (value / grid).ceil() * grid
}

/// Running right and bottom edge of a bucket's placed members.
struct Extent {
    right: f64,
    bottom: f64,
}

impl Extent {
    fn new(x: f64, y: f64) -> Self {
        Self {
            right: x,
            bottom: y,
        }
    }

    fn cover(&mut self, rect: &Rect) {
        self.right = self.right.max(rect.right());
        self.bottom = self.bottom.max(rect.bottom());
    }

    /// Container at `(x, y)` reaching past the members by `padding`, rounded
    /// up so it never ends inside them.
    fn container(&self, x: f64, y: f64, padding: f64, grid: f64) -> Rect {
        Rect::new(
            x,
            y,
            ceil_to_grid(self.right + padding - x, grid),
            ceil_to_grid(self.bottom + padding - y, grid),
        )
    }
}

fn dimensions(node: &Node) -> (f64, f64) {
    let category = classify(&node.label, node.kind.as_deref());
    node_size(node.size.as_deref(), category)
}

/// Groups nodes by module, keeping declaration order and dropping empty groups.
fn buckets(spec: &Specification) -> IndexMap<Bucket, Vec<&Node>> {
    let mut buckets: IndexMap<Bucket, Vec<&Node>> = IndexMap::new();
    buckets.insert(Bucket::Unassigned, Vec::new());
    for module in &spec.modules {
        buckets.insert(Bucket::Module(module.id.clone()), Vec::new());
    }
    for node in &spec.nodes {
        let key = match &node.module {
            Some(id) => Bucket::Module(id.clone()),
            None => Bucket::Unassigned,
        };
        buckets.entry(key).or_default().push(node);
    }
    buckets.retain(|_, members| !members.is_empty());
    buckets
}

/// Places every node of the specification on the theme's grid.
pub fn layout(spec: &Specification, theme: &Theme) -> Layout {
    let grid = theme.grid_size();
    let padding = theme.container_padding();

    match spec.meta.layout_kind() {
        LayoutKind::Horizontal => layout_horizontal(spec, grid, padding),
        LayoutKind::Vertical => layout_vertical(spec, grid, padding),
        LayoutKind::Grid => layout_grid(spec, grid),
    }
}

fn layout_horizontal(spec: &Specification, grid: f64, padding: f64) -> Layout {
    let mut result = Layout::default();
    let mut current_x = ORIGIN;

    for (bucket, members) in buckets(spec) {
        let module_x = ceil_to_grid(current_x, grid);
        let module_y = ceil_to_grid(ORIGIN, grid);
        let node_x = ceil_to_grid(module_x + padding, grid);
        let mut node_y = module_y + padding + HEADER;
        let mut extent = Extent::new(module_x, module_y);

        for node in members {
            let (w, h) = dimensions(node);
            let rect = Rect::new(node_x, ceil_to_grid(node_y, grid), w, h);
            result.nodes.insert(node.id.clone(), rect);
            extent.cover(&rect);
            node_y = rect.bottom() + NODE_GAP;
        }

        let container = extent.container(module_x, module_y, padding, grid);
        result.modules.insert(bucket, container);
        current_x = container.right() + NODE_GAP;
    }

    result
}

fn layout_vertical(spec: &Specification, grid: f64, padding: f64) -> Layout {
    let mut result = Layout::default();
    let mut current_y = ORIGIN;

    for (bucket, members) in buckets(spec) {
        let module_x = ceil_to_grid(ORIGIN, grid);
        let module_y = ceil_to_grid(current_y, grid);
        let node_y = ceil_to_grid(module_y + padding + HEADER, grid);
        let mut node_x = module_x + padding;
        let mut extent = Extent::new(module_x, module_y);

        for node in members {
            let (w, h) = dimensions(node);
            let rect = Rect::new(ceil_to_grid(node_x, grid), node_y, w, h);
            result.nodes.insert(node.id.clone(), rect);
            extent.cover(&rect);
            node_x = rect.right() + NODE_GAP;
        }

        let container = extent.container(module_x, module_y, padding, grid);
        result.modules.insert(bucket, container);
        current_y = container.bottom() + NODE_GAP;
    }

    result
}

fn layout_grid(spec: &Specification, grid: f64) -> Layout {
    let mut result = Layout::default();

    for (idx, node) in spec.nodes.iter().enumerate() {
        let (w, h) = dimensions(node);
        let col = (idx % GRID_COLUMNS) as f64;
        let row = (idx / GRID_COLUMNS) as f64;
        let rect = Rect::new(
            snap_to_grid(ORIGIN + col * (w + NODE_GAP), grid),
            snap_to_grid(ORIGIN + row * (h + NODE_GAP), grid),
            w,
            h,
        );
        result.nodes.insert(node.id.clone(), rect);
    }

    result
}
