//! DBSCAN-equivalent labelling from an OPTICS ordering.

use crate::{Labels, NOISE};

/// Walk the ordering and open a new cluster at every point that is not
/// reachable within `eps` but is itself a core point at `eps`. Points that
/// are neither reachable nor core are noise.
pub(super) fn extract(ordering: &[usize], reachability: &[f64], core_distances: &[f64], eps: f64) -> Labels {
    let mut labels = vec![NOISE; ordering.len()];
    let mut current: i64 = -1;

    for &point in ordering {
        let far = reachability[point] > eps;
        let near_core = core_distances[point] <= eps;
        if far && near_core {
            current += 1;
        }
        labels[point] = if far && !near_core { NOISE } else { current };
    }

    labels
}
