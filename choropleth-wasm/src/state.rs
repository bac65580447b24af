use std::cell::RefCell;
use std::rc::Rc;

use choropleth_core::ChoroplethApp;

use crate::net::BrowserTransport;
use crate::plotly::PlotlyEngine;

pub type App = ChoroplethApp<PlotlyEngine, BrowserTransport>;

thread_local! {
    /// The page's single map, set once by `start`.
    pub static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

/// Handle to the running map, if `start` has completed.
pub fn current() -> Option<Rc<App>> {
    APP.with(|app| app.borrow().clone())
}

/// Store the map. Returns false if one was already stored.
pub fn install(app: Rc<App>) -> bool {
    APP.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(app);
        true
    })
}
