use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{arc_length, contour_area};
use imageproc::point::Point;

use crate::geometry::{approximate_polygon, compress_chain};
use crate::preprocess::EdgeMap;

/// A closed boundary traced in an edge map, stored with only its
/// direction-change vertices.
#[derive(Debug, Clone)]
pub struct Contour {
    points: Vec<Point<i32>>,
    area: f64,
    perimeter: f64,
    is_hole: bool,
}

impl Contour {
    /// Build a contour from a traced pixel chain.
    ///
    /// Returns `None` when fewer than three vertices survive compression
    /// (isolated pixels and straight strokes).
    pub fn from_chain(chain: &[Point<i32>], is_hole: bool) -> Option<Self> {
        let points = compress_chain(chain);
        if points.len() < 3 {
            return None;
        }
        Some(Self {
            area: contour_area(&points),
            perimeter: arc_length(&points, true),
            points,
            is_hole,
        })
    }

    /// Vertices in tracing order.
    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// Enclosed area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Closed perimeter.
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    /// Whether the tracer reported this border as the inside of a hole.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Simplify with a tolerance of `epsilon_ratio` times the perimeter.
    pub fn approximate(&self, epsilon_ratio: f64) -> Polygon {
        let epsilon = epsilon_ratio * self.perimeter;
        Polygon {
            vertices: approximate_polygon(&self.points, epsilon),
        }
    }
}

/// Simplified outline derived from a single [`Contour`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<Point<i32>>,
}

impl Polygon {
    pub fn vertices(&self) -> &[Point<i32>] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The four vertices when the polygon is a quadrilateral.
    pub fn as_quad(&self) -> Option<[Point<i32>; 4]> {
        <[Point<i32>; 4]>::try_from(self.vertices.as_slice()).ok()
    }
}

/// Contours kept from an edge map, plus how many borders were traced.
#[derive(Debug, Clone, Default)]
pub struct TracedContours {
    /// Contours with at least three vertices after chain compression.
    pub contours: Vec<Contour>,
    /// Number of raw borders the tracer reported, including degenerate ones.
    pub traced: usize,
}

/// Trace every border in the edge map, outer borders and holes alike,
/// ignoring nesting.
pub fn extract_contours(edges: &EdgeMap) -> TracedContours {
    let raw = find_contours::<i32>(edges.image());
    let traced = raw.len();
    let contours = raw
        .iter()
        .filter_map(|c| Contour::from_chain(&c.points, c.border_type == BorderType::Hole))
        .collect();
    TracedContours { contours, traced }
}
