mod common;

use std::collections::HashSet;

use drawspec::diagram::{Bucket, Edge, Meta, Module, Node, layout};
use drawspec::{Specification, Theme, compile};
use proptest::prelude::*;

use common::parse;

const LABELS: &[&str] = &[
    "API Gateway",
    "User Database",
    "Is it valid?",
    "Message Queue",
    "Start",
    "⊕",
    "Feature Map",
    "Conv2D Layer",
    "$$E = mc^2$$",
    "LayerNorm",
    "Loss",
    "Graph Conv",
];

const SIZES: &[&str] = &["tiny", "small", "large", "xl", "tensor_sm", "tensor_xl"];

// ===================
// Strategies
// ===================

fn node_strategy() -> impl Strategy<Value = (usize, Option<usize>, Option<usize>)> {
    (
        0..LABELS.len(),
        proptest::option::of(0usize..4),
        proptest::option::of(0..SIZES.len()),
    )
}

fn spec_strategy() -> impl Strategy<Value = Specification> {
    (
        prop::collection::vec(node_strategy(), 1..24),
        prop::collection::vec((0usize..28, 0usize..28, any::<bool>()), 0..30),
        prop_oneof![Just(None), Just(Some("vertical")), Just(Some("grid"))],
        0usize..4,
    )
        .prop_map(|(nodes, edges, layout, declared)| {
            let nodes = nodes
                .into_iter()
                .enumerate()
                .map(|(i, (label, module, size))| {
                    let mut node = Node::new(format!("n{i}"), LABELS[label]);
                    node.module = module.map(|m| format!("m{m}"));
                    node.size = size.map(|s| SIZES[s].to_string());
                    node
                })
                .collect();
            let edges = edges
                .into_iter()
                .map(|(from, to, labelled)| {
                    let edge = Edge::new(format!("n{from}"), format!("n{to}"));
                    if labelled { edge.with_label("flow") } else { edge }
                })
                .collect();
            Specification {
                meta: Meta {
                    layout: layout.map(str::to_string),
                    ..Meta::default()
                },
                nodes,
                edges,
                // Only some referenced modules are declared.
                modules: (0..declared)
                    .map(|m| Module::new(format!("m{m}"), format!("Stage {m}")))
                    .collect(),
            }
        })
}

/// Bundled-theme defaults with a generated grid unit and container padding.
fn theme_strategy() -> impl Strategy<Value = Theme> {
    (prop::sample::select(vec![4u32, 5, 8, 10, 12, 16, 20]), 0u32..=32).prop_map(
        |(grid, padding)| {
            Theme::from_toml(&format!(
                "name = \"generated\"\n[canvas]\ngridSize = {grid}\n[module]\npadding = {padding}\n"
            ))
            .expect("generated theme is valid")
        },
    )
}

// ===================
// Property Test Functions
// ===================

/// Cell ids are numeric, unique and strictly increasing from 2.
fn check_ids_strictly_increase(spec: Specification) -> Result<(), TestCaseError> {
    let xml = compile(&spec, None).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let model = parse(&xml);
    let ids: Vec<u32> = model
        .content()
        .map(|c| c.get("id").unwrap_or("").parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    prop_assert!(!ids.is_empty());
    prop_assert_eq!(ids[0], 2);
    prop_assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    Ok(())
}

/// Every node and container origin sits on the grid.
fn check_positions_are_grid_aligned(
    spec: Specification,
    theme: Theme,
) -> Result<(), TestCaseError> {
    let grid = theme.grid_size();
    let layout = layout(&spec, &theme);

    prop_assert_eq!(layout.nodes.len(), spec.nodes.len());
    for rect in layout.nodes.values().chain(layout.modules.values()) {
        prop_assert_eq!(rect.x % grid, 0.0);
        prop_assert_eq!(rect.y % grid, 0.0);
    }
    Ok(())
}

/// Containers enclose the members placed inside them plus padding, and their
/// extent stays on the grid.
fn check_containers_enclose_members(
    spec: Specification,
    theme: Theme,
) -> Result<(), TestCaseError> {
    let grid = theme.grid_size();
    let padding = theme.container_padding();
    let layout = layout(&spec, &theme);
    for node in &spec.nodes {
        let key = match node.module.as_deref() {
            Some(module) => Bucket::Module(module.to_string()),
            None => Bucket::Unassigned,
        };
        let Some(container) = layout.modules.get(&key) else {
            continue;
        };
        let rect = &layout.nodes[&node.id];
        prop_assert!(
            container.contains(rect),
            "{} at {:?} escapes {:?}",
            node.id,
            rect,
            container
        );
        prop_assert!(container.right() - rect.right() >= padding);
        prop_assert!(container.bottom() - rect.bottom() >= padding);
    }
    for container in layout.modules.values() {
        prop_assert_eq!(container.width % grid, 0.0);
        prop_assert_eq!(container.height % grid, 0.0);
    }
    Ok(())
}

/// Edge cells appear exactly for edges whose endpoints both exist.
fn check_edge_count_matches_resolved(spec: Specification) -> Result<(), TestCaseError> {
    let ids: HashSet<&str> = spec.nodes.iter().map(|n| n.id.as_str()).collect();
    let resolved = spec
        .edges
        .iter()
        .filter(|e| ids.contains(e.from.as_str()) && ids.contains(e.to.as_str()))
        .count();

    let xml = compile(&spec, None).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let model = parse(&xml);
    prop_assert_eq!(model.content().filter(|c| c.is_edge()).count(), resolved);
    Ok(())
}

/// Compiling the same input twice gives byte-identical output.
fn check_output_is_deterministic(spec: Specification) -> Result<(), TestCaseError> {
    let first = compile(&spec, None).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let second = compile(&spec.clone(), None).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(first, second);
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn ids_strictly_increase(spec in spec_strategy()) {
        check_ids_strictly_increase(spec)?;
    }

    #[test]
    fn positions_are_grid_aligned(spec in spec_strategy(), theme in theme_strategy()) {
        check_positions_are_grid_aligned(spec, theme)?;
    }

    #[test]
    fn containers_enclose_members(spec in spec_strategy(), theme in theme_strategy()) {
        check_containers_enclose_members(spec, theme)?;
    }

    #[test]
    fn edge_count_matches_resolved(spec in spec_strategy()) {
        check_edge_count_matches_resolved(spec)?;
    }

    #[test]
    fn output_is_deterministic(spec in spec_strategy()) {
        check_output_is_deterministic(spec)?;
    }
}
