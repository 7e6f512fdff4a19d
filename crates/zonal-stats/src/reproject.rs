//! Geographic to equal-area reprojection of polygons.
//!
//! Straight edges in lon/lat become curves under a conic projection, so
//! every edge is first split where it crosses the lines of a fixed
//! `step`-degree lattice and only the vertices are projected. Two edges
//! lying on the same lon/lat line therefore share their inserted
//! vertices, whichever endpoints they have.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use projection::AlbersEqualArea;

/// Insert a vertex wherever an edge crosses a multiple of `step` degrees
/// in longitude or latitude.
pub fn densify_ring(ring: &LineString<f64>, step: f64) -> Vec<Coord<f64>> {
    let coords = &ring.0;
    let mut out = Vec::with_capacity(coords.len());
    for pair in coords.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        out.push(a);

        let mut inserted: Vec<(f64, Coord<f64>)> = lattice_crossings(a.x, b.x, step)
            .map(|(t, x)| (t, Coord { x, y: a.y + (b.y - a.y) * t }))
            .chain(
                lattice_crossings(a.y, b.y, step)
                    .map(|(t, y)| (t, Coord { x: a.x + (b.x - a.x) * t, y })),
            )
            .collect();
        inserted.sort_by(|p, q| p.0.total_cmp(&q.0));
        inserted.dedup_by(|p, q| (p.0 - q.0).abs() < 1e-12);
        out.extend(inserted.into_iter().map(|(_, c)| c));
    }
    if let Some(last) = coords.last() {
        out.push(*last);
    }
    out
}

/// Lattice values strictly between `from` and `to`, with their position
/// along the segment.
fn lattice_crossings(from: f64, to: f64, step: f64) -> impl Iterator<Item = (f64, f64)> {
    let (lo, hi) = (from.min(to), from.max(to));
    let first = (lo / step).floor() as i64 + 1;
    let last = (hi / step).ceil() as i64 - 1;
    (first..=last).filter_map(move |k| {
        let value = k as f64 * step;
        let t = (value - from) / (to - from);
        (t > 1e-12 && t < 1.0 - 1e-12).then_some((t, value))
    })
}

fn project_ring(ring: &LineString<f64>, proj: &AlbersEqualArea, step: f64) -> LineString<f64> {
    densify_ring(ring, step)
        .into_iter()
        .map(|c| {
            let (x, y) = proj.forward(c.x, c.y);
            Coord { x, y }
        })
        .collect()
}

/// Project a lon/lat polygon into the equal-area plane.
pub fn project_polygon(polygon: &Polygon<f64>, proj: &AlbersEqualArea, step: f64) -> Polygon<f64> {
    Polygon::new(
        project_ring(polygon.exterior(), proj, step),
        polygon
            .interiors()
            .iter()
            .map(|ring| project_ring(ring, proj, step))
            .collect(),
    )
}

/// Project a lon/lat multipolygon into the equal-area plane.
pub fn project_multi_polygon(
    geometry: &MultiPolygon<f64>,
    proj: &AlbersEqualArea,
    step: f64,
) -> MultiPolygon<f64> {
    geometry
        .iter()
        .map(|polygon| project_polygon(polygon, proj, step))
        .collect()
}
