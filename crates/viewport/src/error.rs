use foundation::GeoError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineInitError {
    #[error("no render target supplied")]
    MissingTarget,
    #[error("invalid render target: {0}")]
    InvalidTarget(String),
    #[error("engine rejected listener registration: {0}")]
    Listener(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewportError {
    #[error(transparent)]
    EngineInit(#[from] EngineInitError),
    #[error(transparent)]
    InvalidCoordinate(#[from] GeoError),
    #[error("invalid zoom level {0}")]
    InvalidZoom(f64),
}
