//! Inspection commands (dimensions, combinations, graph)

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::domain::Dimension;
use crate::source::loader::load_dimension_source;
use crate::source::DimensionSource;
use crate::space::{VariationGraph, Zookeeper};

/// List dimensions by priority
pub fn dimensions(output: &Output, config: &Path) -> Result<()> {
    let source = load_dimension_source(config)?;
    let dimensions = source.dimensions_by_priority();
    output.verbose_ctx("dimensions", &format!("Parsed {} dimensions", dimensions.len()));

    if output.is_json() {
        let items: Vec<_> = dimensions
            .iter()
            .map(|d| {
                let values: Vec<_> = d
                    .values()
                    .map(|v| {
                        serde_json::json!({
                            "value": v.value(),
                            "depth": v.specialization_depth(),
                            "generalization": d.generalization(v.value()).map(|g| g.value()),
                            "configuration": v.configuration(),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "id": d.id(),
                    "default": d.default_value().map(|v| v.value()),
                    "maximum_depth": d.maximum_depth(),
                    "values": values,
                    "configuration": d.configuration(),
                })
            })
            .collect();
        output.data(&items);
    } else if dimensions.is_empty() {
        println!("No dimensions configured.");
    } else {
        println!("Dimensions ({}):", dimensions.len());
        for dimension in dimensions {
            match dimension.default_value() {
                Some(default) => println!("{} (default: {})", dimension.id(), default.value()),
                None => println!("{} (no values)", dimension.id()),
            }
            for root in dimension.root_values() {
                print_tree(dimension, root.value(), 1);
            }
        }
    }

    Ok(())
}

fn print_tree(dimension: &Dimension, value: &str, indent: usize) {
    println!("{}{}", "  ".repeat(indent), value);
    for specialization in dimension.specializations(value) {
        print_tree(dimension, specialization.value(), indent + 1);
    }
}

/// List allowed combinations
pub fn combinations(output: &Output, config: &Path) -> Result<()> {
    let source = load_dimension_source(config)?;
    let zookeeper = Zookeeper::new(&source);
    let graph = VariationGraph::new(&zookeeper);
    output.verbose_ctx(
        "combinations",
        &format!("Found {} allowed combinations", graph.len()),
    );

    if output.is_json() {
        let items: Vec<_> = graph
            .all_points()
            .map(|p| {
                serde_json::json!({
                    "point": p.point(),
                    "weight": p.weight().total(),
                })
            })
            .collect();
        output.data(&items);
    } else if graph.is_empty() {
        println!("No allowed combinations.");
    } else {
        println!("Allowed combinations ({}):", graph.len());
        println!("{:<8} POINT", "WEIGHT");
        println!("{}", "-".repeat(60));
        for point in graph.all_points() {
            println!("{:<8} {}", point.weight().total(), point.point());
        }
    }

    Ok(())
}

/// Summarize the variation graph or print it as dot
pub fn graph(output: &Output, config: &Path, dot: bool) -> Result<()> {
    let source = load_dimension_source(config)?;
    let zookeeper = Zookeeper::new(&source);
    let graph = VariationGraph::new(&zookeeper);

    if dot {
        print!("{}", graph.to_dot());
        return Ok(());
    }

    let roots = graph.root_generalizations();
    if output.is_json() {
        let roots: Vec<_> = roots.iter().map(|p| p.point()).collect();
        output.data(&serde_json::json!({
            "points": graph.len(),
            "variations": graph.variation_count(),
            "weight_normalization_base": graph.weight_normalization_base(),
            "roots": roots,
        }));
    } else {
        println!("Points:      {}", graph.len());
        println!("Variations:  {}", graph.variation_count());
        println!("Roots ({}):", roots.len());
        for root in roots {
            println!("  {}", root.point());
        }
    }

    Ok(())
}
