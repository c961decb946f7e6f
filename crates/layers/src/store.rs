use std::collections::BTreeSet;

use foundation::{GeoError, GeoPoint, Id};
use tracing::{debug, warn};

use crate::cluster::{Cluster, SpatialClusterer};
use crate::layer::{Layer, LayerSlot, RenderFeature, RenderLayer};
use crate::marker::{Marker, ProjectedMarker, SelectionMarker};
use crate::symbology::{ClusterStyle, marker_style, selection_style};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkerError {
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    #[error("duplicate marker id {0}")]
    DuplicateId(Id),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedMarker {
    pub id: Id,
    pub error: MarkerError,
}

/// Outcome of one [`MarkerLayerStore::replace_markers`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedMarker>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Owns the data, cluster and selection layers.
///
/// Every mutation is a full synchronous replace of the affected layer(s):
/// - `replace_markers` rebuilds data + clusters,
/// - `set_resolution` / `set_cluster_distance` rebuild clusters,
/// - `set_selection` rebuilds the selection layer and nothing else.
#[derive(Debug, Clone)]
pub struct MarkerLayerStore {
    clusterer: SpatialClusterer,
    resolution: f64,
    data: Vec<ProjectedMarker>,
    clusters: Vec<Cluster>,
    selection: Option<SelectionMarker>,
}

impl MarkerLayerStore {
    pub fn new(clusterer: SpatialClusterer, resolution: f64) -> Self {
        Self {
            clusterer,
            resolution,
            data: Vec::new(),
            clusters: Vec::new(),
            selection: None,
        }
    }

    /// Clears and repopulates the data layer, then re-clusters.
    ///
    /// Markers with out-of-range coordinates or an already-seen id are
    /// rejected one by one; the rest are kept in input order.
    pub fn replace_markers(&mut self, markers: Vec<Marker>) -> RebuildReport {
        let mut report = RebuildReport::default();
        let mut seen: BTreeSet<Id> = BTreeSet::new();
        let mut data = Vec::with_capacity(markers.len());

        for marker in markers {
            if seen.contains(&marker.id) {
                warn!(id = %marker.id, "rejecting marker: duplicate id");
                report.rejected.push(RejectedMarker {
                    id: marker.id.clone(),
                    error: MarkerError::DuplicateId(marker.id),
                });
                continue;
            }
            let id = marker.id.clone();
            match ProjectedMarker::project(marker) {
                Ok(m) => {
                    seen.insert(id);
                    data.push(m);
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "rejecting marker");
                    report.rejected.push(RejectedMarker {
                        id,
                        error: e.into(),
                    });
                }
            }
        }

        report.accepted = data.len();
        self.data = data;
        self.recluster();
        report
    }

    /// Replaces the selection layer with zero or one marker.
    ///
    /// An invalid point is rejected and leaves the selection layer empty.
    pub fn set_selection(&mut self, point: Option<GeoPoint>) -> Result<(), GeoError> {
        self.selection = None;
        if let Some(p) = point {
            self.selection = Some(SelectionMarker::at(p)?);
        }
        Ok(())
    }

    /// Updates the meters-per-pixel resolution; returns `true` when clusters were rebuilt.
    pub fn set_resolution(&mut self, resolution: f64) -> bool {
        if !(resolution.is_finite() && resolution > 0.0) || resolution == self.resolution {
            return false;
        }
        self.resolution = resolution;
        self.recluster();
        true
    }

    pub fn set_cluster_distance(&mut self, distance_px: f64) {
        self.clusterer = SpatialClusterer::new(distance_px);
        self.recluster();
    }

    fn recluster(&mut self) {
        self.clusters = self.clusterer.cluster(&self.data, self.resolution);
        debug!(
            markers = self.data.len(),
            clusters = self.clusters.len(),
            resolution = self.resolution,
            "reclustered"
        );
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.data.iter().map(|m| &m.marker)
    }

    pub fn positions(&self) -> Vec<GeoPoint> {
        self.data.iter().map(|m| m.marker.position).collect()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn selection(&self) -> Option<&SelectionMarker> {
        self.selection.as_ref()
    }

    pub fn cluster_layer(&self) -> ClusterLayer<'_> {
        ClusterLayer {
            clusters: &self.clusters,
            data: &self.data,
        }
    }

    pub fn selection_layer(&self) -> SelectionLayer<'_> {
        SelectionLayer {
            selection: self.selection.as_ref(),
        }
    }

    /// All layers in draw order: clusters first, selection on top.
    pub fn render_layers(&self) -> Vec<RenderLayer> {
        vec![self.cluster_layer().render(), self.selection_layer().render()]
    }
}

pub struct ClusterLayer<'a> {
    clusters: &'a [Cluster],
    data: &'a [ProjectedMarker],
}

impl Layer for ClusterLayer<'_> {
    fn slot(&self) -> LayerSlot {
        LayerSlot::Clusters
    }

    fn features(&self) -> Vec<RenderFeature> {
        self.clusters
            .iter()
            .map(|cluster| {
                let single = cluster
                    .member_ids
                    .first()
                    .filter(|_| cluster.is_single())
                    .and_then(|id| self.data.iter().find(|m| &m.marker.id == id));
                match single {
                    Some(m) => RenderFeature::Marker {
                        id: m.marker.id.clone(),
                        position: m.projected,
                        label: m.marker.label.clone(),
                        style: marker_style(),
                    },
                    None => RenderFeature::Cluster {
                        position: cluster.representative_projected,
                        member_count: cluster.len(),
                        style: ClusterStyle::for_size(cluster.len()),
                    },
                }
            })
            .collect()
    }
}

pub struct SelectionLayer<'a> {
    selection: Option<&'a SelectionMarker>,
}

impl Layer for SelectionLayer<'_> {
    fn slot(&self) -> LayerSlot {
        LayerSlot::Selection
    }

    fn features(&self) -> Vec<RenderFeature> {
        self.selection
            .map(|s| RenderFeature::Selection {
                position: s.projected,
                style: selection_style(),
            })
            .into_iter()
            .collect()
    }
}
