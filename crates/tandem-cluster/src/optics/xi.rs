//! Xi steep-area cluster extraction.
//!
//! A steep downward point drops the reachability by at least a factor
//! `1 - xi` to its successor; a steep upward point rises by the same factor.
//! Clusters start in a steep down area and end in a steep up area. The
//! reachability plot is padded with a trailing `inf` so the last valley
//! always closes.

use crate::{Labels, NOISE};

pub(super) struct XiParams {
    pub(super) xi: f64,
    pub(super) min_samples: usize,
    pub(super) min_cluster_size: usize,
    pub(super) predecessor_correction: bool,
}

#[derive(Debug, Clone, Copy)]
struct SteepDownArea {
    start: usize,
    end: usize,
    /// Largest reachability seen between this area and the current position
    mib: f64,
}

struct Plot<'a> {
    reachability: Vec<f64>,
    predecessor: Vec<Option<usize>>,
    ordering: &'a [usize],
}

pub(super) fn extract(
    ordering: &[usize],
    reachability: &[f64],
    predecessor: &[Option<usize>],
    params: &XiParams,
) -> Labels {
    let mut padded: Vec<f64> = ordering.iter().map(|&p| reachability[p]).collect();
    padded.push(f64::INFINITY);
    let plot = Plot {
        reachability: padded,
        predecessor: ordering.iter().map(|&p| predecessor[p]).collect(),
        ordering,
    };

    let clusters = find_clusters(&plot, params);
    labels_from_clusters(ordering, &clusters)
}

fn find_clusters(plot: &Plot<'_>, params: &XiParams) -> Vec<(usize, usize)> {
    let rp = &plot.reachability;
    let complement = 1.0 - params.xi;

    // NaN ratios (inf / inf) compare false everywhere.
    let ratio: Vec<f64> = rp.windows(2).map(|w| w[0] / w[1]).collect();
    let steep_up: Vec<bool> = ratio.iter().map(|&r| r <= complement).collect();
    let steep_down: Vec<bool> = ratio.iter().map(|&r| r >= 1.0 / complement).collect();
    let downward: Vec<bool> = ratio.iter().map(|&r| r > 1.0).collect();
    let upward: Vec<bool> = ratio.iter().map(|&r| r < 1.0).collect();

    let mut sdas: Vec<SteepDownArea> = Vec::new();
    let mut clusters = Vec::new();
    let mut index = 0;
    let mut mib = 0.0_f64;

    for steep_index in (0..ratio.len()).filter(|&i| steep_up[i] || steep_down[i]) {
        if steep_index < index {
            continue;
        }
        mib = rp[index..=steep_index].iter().copied().fold(mib, f64::max);

        if steep_down[steep_index] {
            update_filter_sdas(&mut sdas, mib, complement, rp);
            let end = extend_region(&steep_down, &upward, steep_index, params.min_samples);
            sdas.push(SteepDownArea {
                start: steep_index,
                end,
                mib: 0.0,
            });
            index = end + 1;
            mib = rp[index];
        } else {
            update_filter_sdas(&mut sdas, mib, complement, rp);
            let up_start = steep_index;
            let up_end = extend_region(&steep_up, &downward, up_start, params.min_samples);
            index = up_end + 1;
            mib = rp[index];

            let mut found = Vec::new();
            for sda in &sdas {
                let mut c_start = sda.start;
                let mut c_end = up_end;

                if rp[c_end + 1] * complement < sda.mib {
                    continue;
                }

                let d_max = rp[sda.start];
                if d_max * complement >= rp[c_end + 1] {
                    while rp[c_start + 1] > rp[c_end + 1] && c_start < sda.end {
                        c_start += 1;
                    }
                } else if rp[c_end + 1] * complement >= d_max {
                    while c_end > up_start && rp[c_end - 1] > d_max {
                        c_end -= 1;
                    }
                }

                if params.predecessor_correction {
                    match correct_predecessor(plot, c_start, c_end) {
                        Some((s, e)) => {
                            c_start = s;
                            c_end = e;
                        }
                        None => continue,
                    }
                }

                if c_end + 1 - c_start < params.min_cluster_size {
                    continue;
                }
                if c_start > sda.end || c_end < up_start {
                    continue;
                }
                found.push((c_start, c_end));
            }

            // Smaller (inner) clusters first.
            found.reverse();
            clusters.extend(found);
        }
    }

    clusters
}

fn update_filter_sdas(sdas: &mut Vec<SteepDownArea>, mib: f64, complement: f64, rp: &[f64]) {
    if mib.is_infinite() {
        sdas.clear();
        return;
    }
    sdas.retain(|sda| mib <= rp[sda.start] * complement);
    for sda in sdas.iter_mut() {
        sda.mib = sda.mib.max(mib);
    }
}

/// Extend a steep area from `start` while points stay steep, tolerating up
/// to `min_samples` consecutive non-steep points that do not reverse
/// direction.
fn extend_region(steep: &[bool], reverse: &[bool], start: usize, min_samples: usize) -> usize {
    let mut non_steep = 0;
    let mut end = start;
    for index in start..steep.len() {
        if steep[index] {
            non_steep = 0;
            end = index;
        } else if !reverse[index] {
            non_steep += 1;
            if non_steep > min_samples {
                break;
            }
        } else {
            return end;
        }
    }
    end
}

/// Shrink `[start, end]` from the right until its last point was reached
/// from inside the interval or the start sits above the end.
fn correct_predecessor(plot: &Plot<'_>, start: usize, mut end: usize) -> Option<(usize, usize)> {
    let rp = &plot.reachability;
    while start < end {
        if rp[start] > rp[end] {
            return Some((start, end));
        }
        if let Some(pred) = plot.predecessor[end] {
            if plot.ordering[start..end].contains(&pred) {
                return Some((start, end));
            }
        }
        end -= 1;
    }
    None
}

/// Label ordering positions cluster by cluster, skipping clusters that
/// overlap an already labelled one, then map positions back to points.
fn labels_from_clusters(ordering: &[usize], clusters: &[(usize, usize)]) -> Labels {
    let mut by_position = vec![NOISE; ordering.len()];
    let mut next = 0;
    for &(start, end) in clusters {
        if by_position[start..=end].iter().all(|&l| l == NOISE) {
            by_position[start..=end].fill(next);
            next += 1;
        }
    }

    let mut labels = vec![NOISE; ordering.len()];
    for (position, &point) in ordering.iter().enumerate() {
        labels[point] = by_position[position];
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> XiParams {
        XiParams {
            xi: 0.05,
            min_samples: 2,
            min_cluster_size: 2,
            predecessor_correction: true,
        }
    }

    #[test]
    fn test_extend_region() {
        let steep = [true, true, false, false, true, false];
        let reverse = [false, false, false, false, false, true];
        assert_eq!(extend_region(&steep, &reverse, 0, 2), 4);
        assert_eq!(extend_region(&steep, &reverse, 0, 1), 1);
    }

    #[test]
    fn test_valley_in_plot() {
        let ordering = [0, 1, 2, 3, 4];
        let reachability = [f64::INFINITY, 0.10, 0.12, 0.97, 0.95];
        let predecessor = [None, Some(0), Some(1), Some(1), Some(3)];
        let labels = extract(&ordering, &reachability, &predecessor, &params());
        assert_eq!(labels, vec![0, 0, 0, NOISE, NOISE]);
    }

    #[test]
    fn test_labels_follow_ordering() {
        // Same plot visited through a permuted ordering
        let ordering = [3, 0, 4, 1, 2];
        let mut reachability = [0.0; 5];
        let plot = [f64::INFINITY, 0.10, 0.12, 0.97, 0.95];
        for (position, &point) in ordering.iter().enumerate() {
            reachability[point] = plot[position];
        }
        let predecessor = [Some(3), Some(0), Some(1), None, Some(0)];
        let labels = extract(&ordering, &reachability, &predecessor, &params());
        assert_eq!(labels, vec![0, NOISE, NOISE, 0, 0]);
    }

    #[test]
    fn test_overlapping_clusters_keep_first() {
        let labels = labels_from_clusters(&[0, 1, 2, 3], &[(0, 1), (2, 3), (0, 3)]);
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_flat_plot_is_one_cluster() {
        let ordering = [0, 1, 2, 3];
        let reachability = [f64::INFINITY, 0.5, 0.5, 0.5];
        let predecessor = [None, Some(0), Some(0), Some(0)];
        let labels = extract(&ordering, &reachability, &predecessor, &params());
        // The padded inf closes a single valley spanning every point.
        assert_eq!(labels, vec![0, 0, 0, 0]);
    }
}
