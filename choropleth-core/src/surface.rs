use crate::models::{Dataset, VisualizationConfig};

/// The two drawing capabilities the pipeline needs from a charting library.
pub trait RenderEngine {
    /// Handle of the page element a surface is bound to.
    type Target;
    type Error;

    /// Create a new bound surface on `target`.
    fn create(
        &mut self,
        target: &Self::Target,
        data: &Dataset,
        layout: &VisualizationConfig,
    ) -> Result<(), Self::Error>;

    /// Swap data and layout of the surface already bound to `target`,
    /// keeping the drawing surface (and its view state) alive.
    fn replace(
        &mut self,
        target: &Self::Target,
        data: &Dataset,
        layout: &VisualizationConfig,
    ) -> Result<(), Self::Error>;
}

/// A live map bound to one page element.
///
/// A value of this type only exists once the engine accepted the first draw,
/// so an update can never reach an unbound element.
pub struct MapSurface<E: RenderEngine> {
    engine: E,
    target: E::Target,
    displayed: Dataset,
    redraws: u64,
}

impl<E: RenderEngine> MapSurface<E> {
    /// Bind `target` and draw `initial` with `config` as layout.
    pub fn initialize(
        mut engine: E,
        target: E::Target,
        config: &VisualizationConfig,
        initial: Dataset,
    ) -> Result<Self, E::Error> {
        engine.create(&target, &initial, config)?;
        log::debug!("map surface bound ({} trace(s))", initial.traces().len());
        Ok(MapSurface {
            engine,
            target,
            displayed: initial,
            redraws: 0,
        })
    }

    /// Redraw with `dataset`. Engine errors come back untouched and the
    /// previously displayed dataset stays current.
    pub fn update(
        &mut self,
        dataset: Dataset,
        config: &VisualizationConfig,
    ) -> Result<(), E::Error> {
        self.engine.replace(&self.target, &dataset, config)?;
        self.displayed = dataset;
        self.redraws += 1;
        Ok(())
    }

    pub fn displayed(&self) -> &Dataset {
        &self.displayed
    }

    pub fn target(&self) -> &E::Target {
        &self.target
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Number of successful redraws since binding.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}
