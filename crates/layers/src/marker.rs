use foundation::{GeoError, GeoPoint, Id, ProjectedPoint, to_projected};
use serde::Serialize;

/// One project drawn on the map. Replaced wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: Id,
    pub position: GeoPoint,
    pub label: String,
}

impl Marker {
    pub fn new(id: impl Into<Id>, position: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
        }
    }
}

/// A validated marker together with its projected-plane position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedMarker {
    pub marker: Marker,
    pub projected: ProjectedPoint,
}

impl ProjectedMarker {
    pub fn project(marker: Marker) -> Result<Self, GeoError> {
        let projected = to_projected(marker.position)?;
        Ok(Self { marker, projected })
    }
}

/// The pending "new project" location.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct SelectionMarker {
    pub position: GeoPoint,
    pub projected: ProjectedPoint,
}

impl SelectionMarker {
    pub fn at(position: GeoPoint) -> Result<Self, GeoError> {
        Ok(Self {
            position,
            projected: to_projected(position)?,
        })
    }
}
