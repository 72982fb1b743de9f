//! Aggregate board statistics.

use serde::Serialize;

use super::model::Board;

/// Summary figures for a parsed board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardStats {
    /// Width and height of the boundary bounding box, mm.
    #[serde(rename = "board_dimensions_mm")]
    pub dimensions: [f64; 2],
    /// Bounding box area, mm².
    #[serde(rename = "board_area_mm2")]
    pub area: f64,
    /// Number of components.
    pub num_components: usize,
    /// Number of traces.
    pub num_traces: usize,
    /// Number of vias.
    pub num_vias: usize,
    /// Number of nets.
    pub num_nets: usize,
    /// Number of stackup layers.
    pub layer_count: usize,
    /// Components per mm², 0 for a board without area.
    pub component_density: f64,
    /// Sum of all trace centre-line lengths, mm.
    #[serde(rename = "trace_length_total_mm")]
    pub trace_length_total: f64,
    /// Stackup thickness exactly as the document gives it.
    #[serde(rename = "total_thickness_um")]
    pub total_thickness: Option<f64>,
    /// Thickness over the smallest drill.
    pub via_aspect_ratio: Option<f64>,
}

/// Computes [`BoardStats`] for `board`.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)] // zero thickness or hole means unknown
pub fn compute_stats(board: &Board) -> BoardStats {
    let (min_x, min_y, max_x, max_y) = board
        .boundary
        .as_ref()
        .map_or((0.0, 0.0, 0.0, 0.0), |b| b.bbox());
    let width = max_x - min_x;
    let height = max_y - min_y;
    let area = (width * height).max(0.0);

    let num_components = board.components.len();
    let component_density = if area > 0.0 {
        num_components as f64 / area
    } else {
        0.0
    };

    let trace_length_total = board.traces.values().map(|t| t.path.length()).sum();

    let total_thickness = board.stackup.total_thickness;
    let smallest_hole = board
        .vias
        .values()
        .map(|v| v.hole_size)
        .reduce(f64::min);
    let via_aspect_ratio = match (total_thickness, smallest_hole) {
        (Some(thickness), Some(hole)) if thickness != 0.0 && hole != 0.0 => Some(thickness / hole),
        _ => None,
    };

    BoardStats {
        dimensions: [width, height],
        area,
        num_components,
        num_traces: board.traces.len(),
        num_vias: board.vias.len(),
        num_nets: board.nets.len(),
        layer_count: board.stackup.layers.len(),
        component_density,
        trace_length_total,
        total_thickness,
        via_aspect_ratio,
    }
}
