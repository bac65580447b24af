//! Host-independent pieces of the choropleth refresh pipeline.
//!
//! The browser crate plugs a real rendering engine and network transport into
//! the traits defined here; tests plug in fakes.

pub mod app;
pub mod config;
pub mod fetch;
pub mod models;
pub mod surface;

pub use app::ChoroplethApp;
pub use config::AppConfig;
pub use fetch::{DatasetFetcher, FetchError, RefreshError, RefreshOutcome, Transport, request_url};
pub use models::{
    CategoryIdentifier, ChoroplethTrace, Dataset, GeoScope, GeoSettings, LocationMode, Projection,
    ProjectionKind, TraceKind, VisualizationConfig,
};
pub use surface::{MapSurface, RenderEngine};
