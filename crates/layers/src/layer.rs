use foundation::{Id, ProjectedPoint};
use serde::Serialize;

use crate::symbology::{ClusterStyle, MarkerStyle};

/// Viewport-owned render slots, in draw order. The engine's base tiles sit below z=1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LayerSlot {
    Clusters,
    Selection,
}

impl LayerSlot {
    pub const ALL: [LayerSlot; 2] = [LayerSlot::Clusters, LayerSlot::Selection];

    pub fn z_index(self) -> u32 {
        match self {
            LayerSlot::Clusters => 1,
            LayerSlot::Selection => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderFeature {
    Marker {
        id: Id,
        position: ProjectedPoint,
        label: String,
        style: MarkerStyle,
    },
    Cluster {
        position: ProjectedPoint,
        member_count: usize,
        style: ClusterStyle,
    },
    Selection {
        position: ProjectedPoint,
        style: MarkerStyle,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderLayer {
    pub slot: LayerSlot,
    pub features: Vec<RenderFeature>,
}

/// A rebuildable feature collection that renders into one slot.
pub trait Layer {
    fn slot(&self) -> LayerSlot;
    fn features(&self) -> Vec<RenderFeature>;

    fn render(&self) -> RenderLayer {
        RenderLayer {
            slot: self.slot(),
            features: self.features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LayerSlot;

    #[test]
    fn selection_draws_above_clusters() {
        assert!(LayerSlot::Selection.z_index() > LayerSlot::Clusters.z_index());
        let mut sorted = LayerSlot::ALL;
        sorted.sort_by_key(|s| s.z_index());
        assert_eq!(sorted, LayerSlot::ALL);
    }
}
