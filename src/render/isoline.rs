use std::collections::{HashMap, VecDeque};

use super::contour::Grid;

// ---------------------------------------------------------------------------
// Marching squares
// ---------------------------------------------------------------------------

/// Grid edge a contour can cross. `H(i, j)` joins node `(i, j)` to
/// `(i + 1, j)`, `V(i, j)` joins `(i, j)` to `(i, j + 1)`; `i` indexes time,
/// `j` altitude. Neighbouring cells name a shared edge identically, which is
/// what stitching relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    H(usize, usize),
    V(usize, usize),
}

/// Trace the `level` iso-line through `grid` as polylines of `[x, y]` points.
/// Closed rings repeat their first point at the end.
pub fn trace(grid: &Grid, level: f64) -> Vec<Vec<[f64; 2]>> {
    let segments = cell_segments(grid, level);
    stitch(&segments)
        .into_iter()
        .map(|edges| edges.into_iter().map(|e| crossing(grid, e, level)).collect())
        .collect()
}

fn cell_segments(grid: &Grid, level: f64) -> Vec<(Edge, Edge)> {
    let (nx, ny) = (grid.x.len(), grid.y.len());
    let mut segments = Vec::new();
    if nx < 2 || ny < 2 {
        return segments;
    }

    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            // a ─ bottom-left, b ─ bottom-right, c ─ top-right, d ─ top-left
            let za = grid.z[j][i];
            let zb = grid.z[j][i + 1];
            let zc = grid.z[j + 1][i + 1];
            let zd = grid.z[j + 1][i];
            if [za, zb, zc, zd].iter().any(|v| v.is_nan()) {
                continue;
            }

            let above = |v: f64| v >= level;
            let bottom = Edge::H(i, j);
            let right = Edge::V(i + 1, j);
            let top = Edge::H(i, j + 1);
            let left = Edge::V(i, j);

            let mut crossed = Vec::with_capacity(4);
            if above(za) != above(zb) {
                crossed.push(bottom);
            }
            if above(zb) != above(zc) {
                crossed.push(right);
            }
            if above(zd) != above(zc) {
                crossed.push(top);
            }
            if above(za) != above(zd) {
                crossed.push(left);
            }

            match crossed.len() {
                2 => segments.push((crossed[0], crossed[1])),
                4 => {
                    // Saddle: the cell centre decides which corners connect.
                    let centre = (za + zb + zc + zd) / 4.0;
                    if above(centre) == above(za) {
                        segments.push((bottom, right));
                        segments.push((top, left));
                    } else {
                        segments.push((left, bottom));
                        segments.push((right, top));
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// Where `level` crosses `edge`, by linear interpolation between its nodes.
fn crossing(grid: &Grid, edge: Edge, level: f64) -> [f64; 2] {
    let lerp = |a: f64, b: f64, za: f64, zb: f64| {
        let dz = zb - za;
        let t = if dz == 0.0 { 0.5 } else { (level - za) / dz };
        a + t.clamp(0.0, 1.0) * (b - a)
    };
    match edge {
        Edge::H(i, j) => [
            lerp(grid.x[i], grid.x[i + 1], grid.z[j][i], grid.z[j][i + 1]),
            grid.y[j],
        ],
        Edge::V(i, j) => [
            grid.x[i],
            lerp(grid.y[j], grid.y[j + 1], grid.z[j][i], grid.z[j + 1][i]),
        ],
    }
}

// ---------------------------------------------------------------------------
// Stitching
// ---------------------------------------------------------------------------

fn stitch(segments: &[(Edge, Edge)]) -> Vec<Vec<Edge>> {
    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (k, (a, b)) in segments.iter().enumerate() {
        by_edge.entry(*a).or_default().push(k);
        by_edge.entry(*b).or_default().push(k);
    }

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (head, tail) = segments[start];
        let mut path = VecDeque::from([head, tail]);

        let mut cursor = tail;
        while let Some((k, next)) = next_unused(segments, &by_edge, &used, cursor) {
            used[k] = true;
            path.push_back(next);
            cursor = next;
        }
        let mut cursor = head;
        while let Some((k, next)) = next_unused(segments, &by_edge, &used, cursor) {
            used[k] = true;
            path.push_front(next);
            cursor = next;
        }

        paths.push(path.into_iter().collect());
    }
    paths
}

fn next_unused(
    segments: &[(Edge, Edge)],
    by_edge: &HashMap<Edge, Vec<usize>>,
    used: &[bool],
    at: Edge,
) -> Option<(usize, Edge)> {
    by_edge.get(&at)?.iter().find(|&&k| !used[k]).map(|&k| {
        let (a, b) = segments[k];
        (k, if a == at { b } else { a })
    })
}
