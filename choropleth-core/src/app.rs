use std::cell::{Ref, RefCell};
use std::fmt;

use crate::config::AppConfig;
use crate::fetch::{DatasetFetcher, RefreshError, RefreshOutcome, Transport};
use crate::models::{CategoryIdentifier, Dataset, VisualizationConfig};
use crate::surface::{MapSurface, RenderEngine};

/// One map on one page: the bound surface, its fixed layout and the fetcher
/// feeding it.
pub struct ChoroplethApp<E: RenderEngine, T> {
    config: AppConfig,
    layout: VisualizationConfig,
    surface: RefCell<MapSurface<E>>,
    fetcher: DatasetFetcher<T>,
}

impl<E, T> ChoroplethApp<E, T>
where
    E: RenderEngine,
    E::Error: fmt::Display,
    T: Transport,
{
    /// Bind the surface with the placeholder dataset. Nothing is fetched yet;
    /// follow up with [`ChoroplethApp::load_default`].
    pub fn start(
        engine: E,
        target: E::Target,
        transport: T,
        config: AppConfig,
    ) -> Result<Self, E::Error> {
        let layout = VisualizationConfig::uk_constituencies();
        let surface = MapSurface::initialize(engine, target, &layout, Dataset::placeholder())?;
        let fetcher = DatasetFetcher::new(transport, config.data_url.clone());
        log::info!(
            "choropleth bound to #{}, data from {}",
            config.element_id,
            config.data_url
        );
        Ok(ChoroplethApp {
            config,
            layout,
            surface: RefCell::new(surface),
            fetcher,
        })
    }

    pub async fn refresh(
        &self,
        category: &CategoryIdentifier,
    ) -> Result<RefreshOutcome, RefreshError<E::Error>> {
        self.fetcher
            .refresh(category, &self.surface, &self.layout)
            .await
    }

    /// Refresh with the startup category.
    pub async fn load_default(&self) -> Result<RefreshOutcome, RefreshError<E::Error>> {
        let category = self.config.default_category.clone();
        self.refresh(&category).await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layout(&self) -> &VisualizationConfig {
        &self.layout
    }

    pub fn fetcher(&self) -> &DatasetFetcher<T> {
        &self.fetcher
    }

    /// Panics if called while a redraw is in progress, e.g. from an engine
    /// callback; use [`ChoroplethApp::try_surface`] there.
    pub fn surface(&self) -> Ref<'_, MapSurface<E>> {
        self.surface.borrow()
    }

    /// The surface, or `None` while the engine is redrawing it.
    pub fn try_surface(&self) -> Option<Ref<'_, MapSurface<E>>> {
        self.surface.try_borrow().ok()
    }

    /// Copy of the dataset on the map, or `None` mid-redraw.
    pub fn displayed_dataset(&self) -> Option<Dataset> {
        self.try_surface().map(|s| s.displayed().clone())
    }
}
