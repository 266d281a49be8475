//! Planar polygon areas. Coordinates are projected with a sinusoidal approximation,
//! which is accurate enough to tell sheds from houses but is not geodesic.

use std::collections::HashMap;
use std::f64::consts::PI;

use crate::data::building::{ObjectRef, SelectedWays};
use crate::data::osm::Coordinate;
use crate::errors::Result;
use crate::passes::resolve_nodes::NodeLocations;

pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// Arc length of one degree along a meridian.
pub const DEGREE_LENGTH_M: f64 = PI * EARTH_RADIUS_M / 180.0;

/// Areas in square metres, one per selected building.
pub type WayAreas = HashMap<ObjectRef, f64>;

pub fn project(coordinate: Coordinate) -> (f64, f64) {
    let y = coordinate.lat * DEGREE_LENGTH_M;
    let x = coordinate.lon * DEGREE_LENGTH_M * (coordinate.lat * PI / 180.0).cos();
    (x, y)
}

/// Shoelace area of the ring through `points`. The ring is closed implicitly, so an
/// open way is measured as if its last node connected back to its first.
pub fn ring_area(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    let twice_signed: f64 = (0..n)
        .map(|i| {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum();
    twice_signed.abs() / 2.0
}

pub fn polygon_area(coordinates: &[Coordinate]) -> f64 {
    let points: Vec<(f64, f64)> = coordinates.iter().map(|c| project(*c)).collect();
    ring_area(&points)
}

/// Area of every selected building. Every node of a selected building must have been
/// resolved; a missing one is an error.
pub fn compute_areas(selected: &SelectedWays, locations: &NodeLocations) -> Result<WayAreas> {
    let mut areas = WayAreas::with_capacity(selected.len());
    let mut coordinates: Vec<Coordinate> = Vec::new();

    for building in selected.iter() {
        coordinates.clear();
        for node_id in &building.nodes {
            let location = locations.get(node_id).ok_or_else(|| {
                format!(
                    "node {} of {} {} has no resolved location",
                    node_id,
                    building.kind.as_str(),
                    building.id
                )
            })?;
            coordinates.push(*location);
        }
        areas.insert(building.object_ref(), polygon_area(&coordinates));
    }
    Ok(areas)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::building::{BuildingWay, ObjectKind};

    /// Corners of a square with the given side in metres, south-west corner first.
    fn square(lon: f64, lat: f64, side_m: f64) -> Vec<Coordinate> {
        let d_lat = side_m / DEGREE_LENGTH_M;
        let d_lon = side_m / (DEGREE_LENGTH_M * lat.to_radians().cos());
        vec![
            Coordinate { lon, lat },
            Coordinate { lon: lon + d_lon, lat },
            Coordinate { lon: lon + d_lon, lat: lat + d_lat },
            Coordinate { lon, lat: lat + d_lat },
        ]
    }

    #[test]
    fn hundred_metre_square() {
        for lat in [0.0, 45.0, 60.0, -33.9] {
            let area = polygon_area(&square(10.0, lat, 100.0));
            assert_relative_eq!(area, 10_000.0, max_relative = 0.01);
        }
    }

    #[test]
    fn orientation_and_closing_node_do_not_matter() {
        let mut ring = square(2.35, 48.85, 20.0);
        let open = polygon_area(&ring);
        ring.push(ring[0]);
        let closed = polygon_area(&ring);
        ring.reverse();
        let reversed = polygon_area(&ring);

        assert_relative_eq!(open, closed, max_relative = 1e-9);
        assert_relative_eq!(open, reversed, max_relative = 1e-9);
    }

    #[test]
    fn degenerate_rings_have_no_area() {
        assert_eq!(ring_area(&[]), 0.0);
        assert_eq!(ring_area(&[(1.0, 1.0)]), 0.0);
        assert_eq!(ring_area(&[(0.0, 0.0), (5.0, 5.0)]), 0.0);
    }

    #[test]
    fn missing_location_is_an_error() {
        let mut selected = SelectedWays::default();
        selected.insert(BuildingWay {
            kind: ObjectKind::Relation,
            id: 5,
            version: 1,
            first_node_id: 1,
            nodes: vec![1, 2, 3],
        });
        let mut locations = NodeLocations::new();
        locations.insert(1, Coordinate { lon: 0.0, lat: 0.0 });
        locations.insert(2, Coordinate { lon: 0.001, lat: 0.0 });

        let err = compute_areas(&selected, &locations).unwrap_err();
        assert_eq!(err.message, "node 3 of relation 5 has no resolved location");

        locations.insert(3, Coordinate { lon: 0.0, lat: 0.001 });
        let areas = compute_areas(&selected, &locations).unwrap();
        let triangle = areas[&ObjectRef { kind: ObjectKind::Relation, id: 5 }];
        assert_relative_eq!(triangle, 0.5 * (0.001 * DEGREE_LENGTH_M).powi(2), max_relative = 1e-6);
    }
}
