use imageproc::point::Point;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

use crate::contour::{TracedContours, extract_contours};
use crate::preprocess::EdgeMap;
use crate::{DetectionError, DetectionResult};

/// Four vertices accepted as the ticket boundary, in contour tracing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrilateral {
    vertices: [Point<i32>; 4],
}

impl Quadrilateral {
    pub fn new(vertices: [Point<i32>; 4]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point<i32>; 4] {
        &self.vertices
    }

    /// Vertices as plain `(x, y)` pairs.
    pub fn corners(&self) -> [(i32, i32); 4] {
        self.vertices.map(|p| (p.x, p.y))
    }
}

impl Serialize for Quadrilateral {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.corners().serialize(serializer)
    }
}

/// Outcome of a successful boundary search.
#[derive(Debug, Clone, Serialize)]
pub struct BoundaryMatch {
    /// The accepted quadrilateral.
    pub quad: Quadrilateral,
    /// Enclosed area of the contour the quadrilateral was approximated from.
    pub contour_area: f64,
    /// Number of borders traced in the edge map, open strokes included.
    pub contours_found: usize,
    /// Number of contours approximated before the match, including the match.
    pub contours_examined: usize,
}

/// Find the ticket boundary in an edge map.
///
/// Contours are ranked by enclosed area, largest first, and the first one
/// whose approximation (tolerance `epsilon_ratio` times its perimeter) has
/// exactly four vertices wins. Nothing else is checked: the match may be
/// concave, tiny, or oddly proportioned.
#[instrument(skip(edges), fields(dimensions = ?edges.dimensions()))]
pub fn find_boundary(edges: EdgeMap, epsilon_ratio: f64) -> DetectionResult<BoundaryMatch> {
    let TracedContours {
        mut contours,
        traced: contours_found,
    } = extract_contours(&edges);
    drop(edges);

    debug!(contours_found, kept = contours.len(), "Contours traced");
    if contours.is_empty() {
        warn!(contours_found, "Edge map has no closed contours");
        return Err(DetectionError::DocumentNotDetected {
            contours: contours_found,
        });
    }

    contours.sort_by(|a, b| b.area().total_cmp(&a.area()));

    for (idx, contour) in contours.iter().enumerate() {
        let polygon = contour.approximate(epsilon_ratio);
        if let Some(vertices) = polygon.as_quad() {
            debug!(
                rank = idx,
                area = contour.area(),
                perimeter = contour.perimeter(),
                hole = contour.is_hole(),
                "Quadrilateral accepted"
            );
            return Ok(BoundaryMatch {
                quad: Quadrilateral::new(vertices),
                contour_area: contour.area(),
                contours_found,
                contours_examined: idx + 1,
            });
        }
        trace!(rank = idx, area = contour.area(), vertices = polygon.len(), "Candidate rejected");
    }

    warn!(contours_found, "No contour approximates to four vertices");
    Err(DetectionError::DocumentNotDetected {
        contours: contours_found,
    })
}
