use crate::core::{bounds::Bounds, geo::Point};

/// Index of the candidate closest to `query`, if it lies within `delta`.
///
/// Ties keep the earliest candidate. The threshold is inclusive.
pub fn nearest_within<I>(query: Point, candidates: I, delta: f64) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Point)>,
{
    let mut best: Option<(usize, f64)> = None;
    for (index, position) in candidates {
        let d2 = query.distance_squared(&position);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((index, d2)),
        }
    }

    best.filter(|(_, d2)| *d2 <= delta * delta)
        .map(|(index, _)| index)
}

/// Indices of every candidate inside `bounds`, edges included, in input order
pub fn within_bounds<I>(bounds: &Bounds, candidates: I) -> Vec<usize>
where
    I: IntoIterator<Item = (usize, Point)>,
{
    candidates
        .into_iter()
        .filter(|(_, position)| bounds.contains(position))
        .map(|(index, _)| index)
        .collect()
}
