use imageproc::point::Point;

/// Keep only the points of a closed pixel chain where the step direction changes.
///
/// Repeated points and a trailing copy of the first point are dropped first.
/// The enclosed area is unchanged because every removed point is collinear
/// with its neighbours.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut ring = points.to_vec();
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    let n = ring.len();
    if n < 3 {
        return ring;
    }

    (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            step_direction(prev, cur) != step_direction(cur, next)
        })
        .map(|i| ring[i])
        .collect()
}

/// Simplify a closed polygon so that no dropped point lies farther than
/// `epsilon` from the result.
///
/// The ring is opened at its extreme point and at the point farthest from
/// it, both halves are simplified with Douglas-Peucker, and vertices that
/// still sit within `epsilon / sqrt(2)` of the chord joining their
/// neighbours are pruned. The output is a subset of the input in the same cyclic order.
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }

    let start = farthest_from(points, points[0]);
    let ring: Vec<Point<i32>> = points[start..]
        .iter()
        .chain(&points[..start])
        .copied()
        .collect();
    let split = farthest_from(&ring, ring[0]);
    if split == 0 {
        return vec![ring[0]];
    }

    // Index `n` wraps around to ring[0].
    let at = |i: usize| ring[i % n];
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[split] = true;

    let mut stack = vec![(split, n), (0, split)];
    while let Some((first, last)) = stack.pop() {
        if last - first < 2 {
            continue;
        }
        let (a, b) = (at(first), at(last));
        let (mut max_dist, mut max_idx) = (0.0, first);
        for i in first + 1..last {
            let d = distance_to_line(at(i), a, b);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }
        if max_dist > epsilon {
            keep[max_idx] = true;
            stack.push((max_idx, last));
            stack.push((first, max_idx));
        }
    }

    let mut polygon: Vec<Point<i32>> = (0..n).filter(|&i| keep[i]).map(|i| ring[i]).collect();
    prune_within_tolerance(&mut polygon, epsilon);
    polygon
}

/// Axis-aligned extent of a point set, in unclipped image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Extent {
    /// Smallest extent containing every point, or `None` for an empty set.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let seed = Extent {
            min_x: i64::from(first.x),
            min_y: i64::from(first.y),
            max_x: i64::from(first.x),
            max_y: i64::from(first.y),
        };
        Some(points.iter().fold(seed, |acc, p| Extent {
            min_x: acc.min_x.min(i64::from(p.x)),
            min_y: acc.min_y.min(i64::from(p.y)),
            max_x: acc.max_x.max(i64::from(p.x)),
            max_y: acc.max_y.max(i64::from(p.y)),
        }))
    }
}

fn step_direction(a: Point<i32>, b: Point<i32>) -> (i32, i32) {
    ((b.x - a.x).signum(), (b.y - a.y).signum())
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    f64::from(b.x - a.x).hypot(f64::from(b.y - a.y))
}

/// Index of the first point with the largest distance from `origin`.
fn farthest_from(points: &[Point<i32>], origin: Point<i32>) -> usize {
    let mut best = (0i64, 0usize);
    for (i, p) in points.iter().enumerate() {
        let dx = i64::from(p.x - origin.x);
        let dy = i64::from(p.y - origin.y);
        let d2 = dx * dx + dy * dy;
        if d2 > best.0 {
            best = (d2, i);
        }
    }
    best.1
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let len = dx.hypot(dy);
    if len == 0.0 {
        return distance(p, a);
    }
    (f64::from(p.x - a.x) * dy - f64::from(p.y - a.y) * dx).abs() / len
}

/// Whether `p` lies on the chord from `a` to `b` within the squared tolerance
/// `threshold`, projecting between its ends.
fn lies_on_chord(p: Point<i32>, a: Point<i32>, b: Point<i32>, threshold: f64) -> bool {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let px = f64::from(p.x - a.x);
    let py = f64::from(p.y - a.y);
    let cross = px * dy - py * dx;
    let inner = px * f64::from(b.x - p.x) + py * f64::from(b.y - p.y);
    inner >= 0.0 && cross * cross <= threshold * (dx * dx + dy * dy)
}

/// Drop vertices closer than `epsilon / sqrt(2)` to the chord joining their
/// neighbours until a full pass removes nothing. Never goes below 3 vertices.
fn prune_within_tolerance(polygon: &mut Vec<Point<i32>>, epsilon: f64) {
    let threshold = 0.5 * epsilon * epsilon;
    let mut idx = 0;
    let mut unchanged = 0;
    while polygon.len() > 3 && unchanged < polygon.len() {
        let n = polygon.len();
        idx %= n;
        let prev = polygon[(idx + n - 1) % n];
        let next = polygon[(idx + 1) % n];
        if lies_on_chord(polygon[idx], prev, next, threshold) {
            polygon.remove(idx);
            unchanged = 0;
        } else {
            idx += 1;
            unchanged += 1;
        }
    }
}
