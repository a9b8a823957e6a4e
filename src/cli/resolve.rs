//! Fallback resolution commands (fallback, specializations, check)

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::DimensionSpacePoint;
use crate::source::loader::load_dimension_source;
use crate::space::{VariationGraph, Zookeeper};

fn parse_point(raw: &str) -> Result<DimensionSpacePoint> {
    raw.parse()
        .with_context(|| format!("Invalid dimension space point: '{}'", raw))
}

/// Show the ordered fallback chain of a point
pub fn fallback(output: &Output, config: &Path, raw_point: &str) -> Result<()> {
    let point = parse_point(raw_point)?;
    let source = load_dimension_source(config)?;
    let zookeeper = Zookeeper::new(&source);
    zookeeper.validate_point(&point)?;
    let graph = VariationGraph::new(&zookeeper);

    let generalizations = graph.generalizations_with_distance(&point);
    output.verbose_ctx(
        "fallback",
        &format!("Found {} generalizations of {}", generalizations.len(), point),
    );

    if output.is_json() {
        let items: Vec<_> = generalizations
            .iter()
            .map(|(distance, p)| {
                serde_json::json!({
                    "point": p.point(),
                    "distance": distance.total(),
                    "weight": p.weight().total(),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "point": point,
            "primary": graph.primary_generalization_of(&point).map(|p| p.point()),
            "fallbacks": items,
        }));
    } else if generalizations.is_empty() {
        println!("{} is maximally general; no fallback.", point);
    } else {
        println!("Fallback chain for {}:", point);
        for (position, (distance, p)) in generalizations.iter().enumerate() {
            let marker = if position == 0 { " [primary]" } else { "" };
            println!(
                "  {}. {} (distance {}){}",
                position + 1,
                p.point(),
                distance.total(),
                marker
            );
        }
    }

    Ok(())
}

/// Show the specializations of a point grouped by distance
pub fn specializations(output: &Output, config: &Path, raw_point: &str) -> Result<()> {
    let point = parse_point(raw_point)?;
    let source = load_dimension_source(config)?;
    let zookeeper = Zookeeper::new(&source);
    zookeeper.validate_point(&point)?;
    let graph = VariationGraph::new(&zookeeper);

    let grouped = graph.specializations_of(&point);

    if output.is_json() {
        let groups: Vec<_> = grouped
            .iter()
            .map(|(distance, points)| {
                let points: Vec<_> = points.iter().map(|p| p.point()).collect();
                serde_json::json!({ "distance": distance, "points": points })
            })
            .collect();
        output.data(&serde_json::json!({
            "point": point,
            "specializations": groups,
        }));
    } else if grouped.is_empty() {
        println!("{} has no specializations.", point);
    } else {
        println!("Specializations of {}:", point);
        for (distance, points) in &grouped {
            println!("  distance {}:", distance);
            for p in points {
                println!("    {}", p.point());
            }
        }
    }

    Ok(())
}

/// Validate a point against the allowed subspace
pub fn check(output: &Output, config: &Path, raw_point: &str) -> Result<()> {
    let point = parse_point(raw_point)?;
    let source = load_dimension_source(config)?;
    let zookeeper = Zookeeper::new(&source);

    zookeeper.validate_point(&point)?;
    output.success(&format!("{} is within the allowed dimension subspace", point));
    Ok(())
}
