//! Selection of grid nodes supported by the control points

use quasigeoid_core::maybe_rayon::*;
use quasigeoid_core::{Geodetic, Grid, PrognosisNode};
use tracing::debug;

/// Grid nodes inside the index window spanned by the bounding box of
/// `points`, each carrying the grid's current value as its model value.
///
/// The window is `[minI, maxI) × [minJ, maxJ)` with
/// ```text
/// minI = ⌊(minLat − latMin) / dLat⌋     maxI = rows − ⌊(latMax − maxLat) / dLat⌋
/// ```
/// and likewise for columns, clamped to the grid. A bounding box entirely
/// outside the grid selects nothing.
pub fn prognosis_nodes<G: Geodetic>(points: &[G], grid: &Grid) -> Vec<PrognosisNode> {
    if points.is_empty() {
        return Vec::new();
    }

    let (min_lat, max_lat, min_lon, max_lon) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(a, b, c, d), p| {
            (
                a.min(p.lat_deg()),
                b.max(p.lat_deg()),
                c.min(p.lon_deg()),
                d.max(p.lon_deg()),
            )
        },
    );

    let spec = grid.spec();
    if max_lat < spec.lat_min
        || min_lat > spec.lat_max
        || max_lon < spec.lon_min
        || min_lon > spec.lon_max
    {
        debug!("control points lie outside the grid");
        return Vec::new();
    }

    let rows = grid.rows() as i64;
    let cols = grid.cols() as i64;

    let min_i = ((min_lat - spec.lat_min) / spec.d_lat).floor() as i64;
    let max_i = rows - ((spec.lat_max - max_lat) / spec.d_lat).floor() as i64;
    let min_j = ((min_lon - spec.lon_min) / spec.d_lon).floor() as i64;
    let max_j = cols - ((spec.lon_max - max_lon) / spec.d_lon).floor() as i64;

    let (min_i, max_i) = (min_i.clamp(0, rows) as usize, max_i.clamp(0, rows) as usize);
    let (min_j, max_j) = (min_j.clamp(0, cols) as usize, max_j.clamp(0, cols) as usize);

    let data = grid.data();
    let nodes: Vec<PrognosisNode> = (min_i..max_i)
        .into_par_iter()
        .flat_map(|i| {
            (min_j..max_j)
                .map(|j| {
                    let (lat, lon) = spec.node_to_geo(i, j);
                    PrognosisNode::new(lat, lon, i, j, data[[i, j]])
                })
                .collect::<Vec<_>>()
        })
        .collect();

    debug!(
        rows = max_i.saturating_sub(min_i),
        cols = max_j.saturating_sub(min_j),
        "selected prognosis nodes"
    );
    nodes
}
