use std::collections::BTreeSet;

use foundation::{GeoPoint, Id, ProjectedPoint, to_geo};
use serde::Serialize;

use crate::marker::ProjectedMarker;

/// A group of markers drawn as one glyph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub representative_position: GeoPoint,
    pub representative_projected: ProjectedPoint,
    pub member_ids: BTreeSet<Id>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.member_ids.is_empty()
    }

    /// Single-member clusters render as a plain marker.
    pub fn is_single(&self) -> bool {
        self.member_ids.len() == 1
    }
}

/// Greedy, order-stable clustering by pixel distance.
///
/// Markers are visited in input order. Each unclustered marker seeds a new
/// cluster, which then absorbs every later unclustered marker within
/// `distance_px` of the cluster's running centroid. The centroid moves after
/// each absorption, so results depend on input order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpatialClusterer {
    distance_px: f64,
}

impl SpatialClusterer {
    /// Negative or non-finite thresholds disable merging.
    pub fn new(distance_px: f64) -> Self {
        let distance_px = if distance_px.is_finite() {
            distance_px.max(0.0)
        } else {
            0.0
        };
        Self { distance_px }
    }

    pub fn distance_px(&self) -> f64 {
        self.distance_px
    }

    /// Partitions `markers` into clusters at the given meters-per-pixel resolution.
    pub fn cluster(&self, markers: &[ProjectedMarker], resolution: f64) -> Vec<Cluster> {
        let threshold_m = if resolution.is_finite() && resolution > 0.0 {
            self.distance_px * resolution
        } else {
            0.0
        };

        let mut taken = vec![false; markers.len()];
        let mut out = Vec::new();

        for seed in 0..markers.len() {
            if taken[seed] {
                continue;
            }
            taken[seed] = true;

            let mut sum = markers[seed].projected;
            let mut count = 1usize;
            let mut centroid = sum;
            let mut member_ids = BTreeSet::new();
            member_ids.insert(markers[seed].marker.id.clone());

            for (j, candidate) in markers.iter().enumerate().skip(seed + 1) {
                if taken[j] || centroid.distance(candidate.projected) > threshold_m {
                    continue;
                }
                taken[j] = true;
                member_ids.insert(candidate.marker.id.clone());
                sum = sum + candidate.projected;
                count += 1;
                centroid = sum.scale(1.0 / count as f64);
            }

            let representative_position = if count == 1 {
                markers[seed].marker.position
            } else {
                to_geo(centroid).unwrap_or(markers[seed].marker.position)
            };

            out.push(Cluster {
                representative_position,
                representative_projected: centroid,
                member_ids,
            });
        }

        out
    }
}

impl Default for SpatialClusterer {
    fn default() -> Self {
        Self::new(40.0)
    }
}
