//! WASM bindings for the canvas reflow core.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! They take and return JSON strings; failures are logged to the browser
//! console and reported in the returned payload instead of thrown.

use std::collections::HashSet;

use serde_json::to_string;
use wasm_bindgen::prelude::*;

use crate::bounds::{resolve_snapshot, SizeProvider};
use crate::drag::{resolve_drop, DragDrop};
use crate::error::Result;
use crate::geometry::{detect_collisions, NodeId, Size};
use crate::grid::snap_position;
use crate::output::{parse_ids, parse_positions, parse_snapshot, DropOutput, ReflowOutput};
use crate::reflow::{reflow_with_config, residual_overlaps, validate_snapshot, ReflowConfig};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Sizes read from the rendered canvas.
///
/// Nodes are looked up by element id; an element with an empty bounding
/// rect is treated as not rendered.
pub struct DomSizeProvider {
    document: web_sys::Document,
}

impl DomSizeProvider {
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }
}

impl SizeProvider for DomSizeProvider {
    fn size_of(&self, id: &NodeId) -> Option<Size> {
        let element = self.document.get_element_by_id(id.as_str())?;
        let rect = element.get_bounding_client_rect();
        if rect.width() == 0.0 && rect.height() == 0.0 {
            return None;
        }
        Some(Size::new(rect.width(), rect.height()))
    }
}

fn parse_config(json: &str) -> Result<ReflowConfig> {
    if json.trim().is_empty() {
        return Ok(ReflowConfig::default());
    }
    Ok(serde_json::from_str(json)?)
}

fn run_reflow(snapshot: &str, sacred: &str, config: &str) -> Result<ReflowOutput> {
    let all = parse_snapshot(snapshot)?;
    let sacred: HashSet<NodeId> = parse_ids(sacred)?.into_iter().collect();
    let cfg = parse_config(config)?;
    validate_snapshot(&all)?;

    let outcome = reflow_with_config(&sacred, &all, &cfg);
    let residual = residual_overlaps(&all, &outcome.positions);
    Ok(ReflowOutput::from_outcome(&outcome, residual))
}

fn run_drop(drag: &str, pinned: &str, snapshot: &str, config: &str) -> Result<DropOutput> {
    let drag: DragDrop = serde_json::from_str(drag)?;
    let pinned: HashSet<NodeId> = parse_ids(pinned)?.into_iter().collect();
    let all = parse_snapshot(snapshot)?;
    let cfg = parse_config(config)?;
    validate_snapshot(&all)?;

    let resolution = resolve_drop(&drag, &pinned, &all, &cfg);

    let mut applied: Vec<_> = all.into_iter().filter(|b| b.id != drag.id).collect();
    applied.push(drag.dropped_bounds().moved_to(resolution.dragged.left, resolution.dragged.top));
    let residual = residual_overlaps(&applied, &resolution.outcome.positions);

    Ok(DropOutput {
        policy: resolution.policy,
        dragged: resolution.dragged,
        reflow: ReflowOutput::from_outcome(&resolution.outcome, residual),
    })
}

fn run_collisions(target_id: &str, snapshot: &str) -> Result<Vec<NodeId>> {
    let all = parse_snapshot(snapshot)?;
    let target_id = NodeId::from(target_id);
    let Some(target) = all.iter().find(|b| b.id == target_id) else {
        return Ok(Vec::new());
    };
    Ok(detect_collisions(target, &all).into_iter().map(|b| b.id).collect())
}

/// Console message for a reflow that left work undone.
fn reflow_warning(output: &ReflowOutput) -> Option<String> {
    if output.converged && output.residual.is_empty() {
        return None;
    }
    Some(format!(
        "Reflow stopped after {} passes, {} overlaps remain, {} nodes unresolved",
        output.passes,
        output.residual.len(),
        output.unresolved.len()
    ))
}

/// Reflow the canvas after a drop. `sacred` is a JSON array of node ids
/// that must not move; `config` may be empty for defaults.
#[wasm_bindgen]
pub fn reflow_layout(snapshot: &str, sacred: &str, config: &str) -> String {
    let output = match run_reflow(snapshot, sacred, config) {
        Ok(output) => {
            if let Some(msg) = reflow_warning(&output) {
                console_log(&msg);
            }
            output
        }
        Err(e) => {
            console_error(&format!("Error running reflow: {}", e));
            ReflowOutput::from_error(&e)
        }
    };
    to_string(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Resolve a finished drag: picks the drop policy, then reflows.
#[wasm_bindgen]
pub fn resolve_drop_json(drag: &str, pinned: &str, snapshot: &str, config: &str) -> String {
    match run_drop(drag, pinned, snapshot, config) {
        Ok(output) => {
            if let Some(msg) = reflow_warning(&output.reflow) {
                console_log(&msg);
            }
            to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
        Err(e) => {
            console_error(&format!("Error resolving drop: {}", e));
            to_string(&ReflowOutput::from_error(&e)).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Ids of the nodes overlapping `target_id`, as a JSON array.
#[wasm_bindgen]
pub fn detect_collisions_json(target_id: &str, snapshot: &str) -> String {
    match run_collisions(target_id, snapshot) {
        Ok(ids) => to_string(&ids).unwrap_or_else(|_| "[]".to_string()),
        Err(e) => {
            console_error(&format!("Error detecting collisions: {}", e));
            "[]".to_string()
        }
    }
}

/// Snap one coordinate to the canvas grid (never negative).
#[wasm_bindgen]
pub fn snap_to_grid(value: f64) -> f64 {
    snap_position(value, 0.0).left
}

/// Build a snapshot from persisted positions, measuring the rendered nodes.
/// Nodes that are not rendered are left out.
#[wasm_bindgen]
pub fn measure_snapshot(positions: &str) -> String {
    let positions = match parse_positions(positions) {
        Ok(p) => p,
        Err(e) => {
            console_error(&format!("Error reading positions: {}", e));
            return "[]".to_string();
        }
    };
    let Some(provider) = DomSizeProvider::new() else {
        console_error("No document available to measure nodes");
        return "[]".to_string();
    };
    let snapshot = resolve_snapshot(&positions, &provider);
    to_string(&snapshot).unwrap_or_else(|_| "[]".to_string())
}
