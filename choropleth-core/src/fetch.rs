use std::cell::{Cell, RefCell};
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

use crate::config::CATEGORY_PARAM;
use crate::models::{CategoryIdentifier, Dataset, VisualizationConfig};
use crate::surface::{MapSurface, RenderEngine};

/// Same set `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed dataset from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RefreshError<E> {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("rendering engine rejected the dataset: {0}")]
    Render(E),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The dataset is now on the map.
    Applied,
    /// A newer refresh was issued while this one was in flight; its response
    /// was dropped.
    Superseded,
}

/// GET-only network access. Implementations turn transport failures and
/// non-success statuses into `FetchError`; the body is returned verbatim.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Backend URL for `category`: `<endpoint>?type=<category>`, percent-encoded.
pub fn request_url(endpoint: &str, category: &CategoryIdentifier) -> String {
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        endpoint,
        sep,
        CATEGORY_PARAM,
        utf8_percent_encode(category.as_str(), COMPONENT)
    )
}

/// Turns categories into datasets and pushes them onto a surface.
pub struct DatasetFetcher<T> {
    transport: T,
    endpoint: String,
    // token of the most recently issued refresh
    latest: Cell<u64>,
}

impl<T: Transport> DatasetFetcher<T> {
    pub fn new(transport: T, endpoint: impl Into<String>) -> Self {
        DatasetFetcher {
            transport,
            endpoint: endpoint.into(),
            latest: Cell::new(0),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Retrieve and parse the dataset for `category`.
    pub async fn fetch(&self, category: &CategoryIdentifier) -> Result<Dataset, FetchError> {
        let url = request_url(&self.endpoint, category);
        log::debug!("fetching {}", url);
        let body = self.transport.get(&url).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Payload { url, source })
    }

    /// Fetch `category` and redraw `surface` with it.
    ///
    /// The surface is only borrowed once the response is in, so a failed
    /// fetch leaves it exactly as it was. Failures are also logged here.
    pub async fn refresh<E>(
        &self,
        category: &CategoryIdentifier,
        surface: &RefCell<MapSurface<E>>,
        config: &VisualizationConfig,
    ) -> Result<RefreshOutcome, RefreshError<E::Error>>
    where
        E: RenderEngine,
        E::Error: fmt::Display,
    {
        let token = self.latest.get() + 1;
        self.latest.set(token);

        let dataset = match self.fetch(category).await {
            Ok(d) => d,
            Err(e) => {
                log::error!("could not load category '{}': {}", category, e);
                return Err(e.into());
            }
        };
        if self.latest.get() != token {
            log::debug!("dropping stale response for category '{}'", category);
            return Ok(RefreshOutcome::Superseded);
        }
        if let Err(e) = surface.borrow_mut().update(dataset, config) {
            log::error!("map rejected category '{}': {}", category, e);
            return Err(RefreshError::Render(e));
        }
        Ok(RefreshOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::{Pin, pin};
    use std::rc::Rc;
    use std::task::{Context, Poll, Waker};

    use super::*;
    use crate::surface::testing::{FakeEngine, Rejected};

    enum Reply {
        Body(&'static str),
        Status(u16),
        Unreachable,
    }

    #[derive(Default)]
    struct FakeTransport {
        replies: HashMap<String, Reply>,
        gates: HashMap<String, Rc<Cell<bool>>>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeTransport {
        fn reply(mut self, url: &str, r: Reply) -> Self {
            self.replies.insert(url.to_string(), r);
            self
        }

        fn gated(mut self, url: &str, open: Rc<Cell<bool>>) -> Self {
            self.gates.insert(url.to_string(), open);
            self
        }
    }

    struct Gate(Rc<Cell<bool>>);

    impl Future for Gate {
        type Output = ();

        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
            if self.0.get() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.seen.borrow_mut().push(url.to_string());
            if let Some(g) = self.gates.get(url) {
                Gate(g.clone()).await;
            }
            match self.replies.get(url) {
                Some(Reply::Body(b)) => Ok(b.to_string()),
                Some(Reply::Status(status)) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                Some(Reply::Unreachable) | None => Err(FetchError::Network {
                    url: url.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    const VOTE: &str = r#"[{"type":"choropleth","locationmode":"country names",
        "locations":["England","Scotland","Wales"],"z":[5,10,15],
        "text":["England","Scotland","Wales"],"autocolorscale":true}]"#;

    fn surface() -> RefCell<MapSurface<FakeEngine>> {
        RefCell::new(
            MapSurface::initialize(
                FakeEngine::default(),
                "choropleth-map",
                &VisualizationConfig::uk_constituencies(),
                Dataset::placeholder(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn url_embeds_category() {
        let url = request_url("/choropleth/data", &"vote".into());
        assert_eq!(url, "/choropleth/data?type=vote");
    }

    #[test]
    fn url_escapes_special_characters() {
        let url = request_url("/choropleth/data", &"lab & con=1/2".into());
        assert_eq!(url, "/choropleth/data?type=lab%20%26%20con%3D1%2F2");
        let url = request_url("/d", &"a+b~c".into());
        assert_eq!(url, "/d?type=a%2Bb~c");
    }

    #[test]
    fn url_appends_to_existing_query() {
        let url = request_url("/data?year=2019", &"vote".into());
        assert_eq!(url, "/data?year=2019&type=vote");
    }

    #[test]
    fn refresh_applies_fetched_dataset() {
        let fetcher = DatasetFetcher::new(
            FakeTransport::default().reply("/choropleth/data?type=vote", Reply::Body(VOTE)),
            "/choropleth/data",
        );
        let s = surface();
        let cfg = VisualizationConfig::uk_constituencies();
        let out = pollster::block_on(fetcher.refresh(&"vote".into(), &s, &cfg)).unwrap();
        assert_eq!(out, RefreshOutcome::Applied);
        assert_eq!(
            s.borrow().displayed().traces()[0].z,
            vec![Some(5.0), Some(10.0), Some(15.0)]
        );
        assert_eq!(
            *fetcher.transport().seen.borrow(),
            vec!["/choropleth/data?type=vote".to_string()]
        );
    }

    #[test]
    fn network_failure_leaves_map_untouched() {
        let fetcher = DatasetFetcher::new(
            FakeTransport::default().reply("/d?type=bad-category", Reply::Unreachable),
            "/d",
        );
        let s = surface();
        let before = s.borrow().displayed().clone();
        let err = pollster::block_on(fetcher.refresh(
            &"bad-category".into(),
            &s,
            &VisualizationConfig::uk_constituencies(),
        ))
        .unwrap_err();
        assert!(matches!(err, RefreshError::Fetch(FetchError::Network { .. })));
        assert_eq!(s.borrow().displayed(), &before);
        assert_eq!(s.borrow().engine().replaces, 0);
    }

    #[test]
    fn error_status_is_a_fetch_failure() {
        let fetcher = DatasetFetcher::new(
            FakeTransport::default().reply("/d?type=x", Reply::Status(500)),
            "/d",
        );
        let s = surface();
        let err = pollster::block_on(fetcher.refresh(
            &"x".into(),
            &s,
            &VisualizationConfig::uk_constituencies(),
        ))
        .unwrap_err();
        assert_eq!(err.to_string(), "request to /d?type=x returned HTTP 500");
        assert_eq!(s.borrow().displayed(), &Dataset::placeholder());
    }

    #[test]
    fn unparsable_body_is_a_payload_error() {
        let fetcher = DatasetFetcher::new(
            FakeTransport::default().reply("/d?type=x", Reply::Body("<html>oops</html>")),
            "/d",
        );
        let err = pollster::block_on(fetcher.fetch(&"x".into())).unwrap_err();
        assert!(matches!(err, FetchError::Payload { .. }));
    }

    #[test]
    fn mismatched_arrays_reach_the_engine() {
        let fetcher = DatasetFetcher::new(
            FakeTransport::default().reply(
                "/d?type=x",
                Reply::Body(r#"[{"locations":["a","b"],"z":[1],"text":["a","b"]}]"#),
            ),
            "/d",
        );
        let s = surface();
        let err = pollster::block_on(fetcher.refresh(
            &"x".into(),
            &s,
            &VisualizationConfig::uk_constituencies(),
        ))
        .unwrap_err();
        match err {
            RefreshError::Render(Rejected(msg)) => assert!(msg.contains("differ in length")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(s.borrow().displayed(), &Dataset::placeholder());
    }

    #[test]
    fn older_response_arriving_late_is_dropped() {
        let slow_open = Rc::new(Cell::new(false));
        let fetcher = DatasetFetcher::new(
            FakeTransport::default()
                .reply("/d?type=slow", Reply::Body(VOTE))
                .gated("/d?type=slow", slow_open.clone())
                .reply(
                    "/d?type=fast",
                    Reply::Body(r#"[{"locations":["Wales"],"z":[9],"text":["Wales"]}]"#),
                ),
            "/d",
        );
        let s = surface();
        let cfg = VisualizationConfig::uk_constituencies();
        let slow_cat = CategoryIdentifier::from("slow");
        let fast_cat = CategoryIdentifier::from("fast");
        let mut cx = Context::from_waker(Waker::noop());

        let mut slow = pin!(fetcher.refresh(&slow_cat, &s, &cfg));
        assert!(slow.as_mut().poll(&mut cx).is_pending());

        let mut fast = pin!(fetcher.refresh(&fast_cat, &s, &cfg));
        match fast.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(RefreshOutcome::Applied)) => {}
            other => panic!("fast refresh did not apply: {:?}", other.is_ready()),
        }

        slow_open.set(true);
        match slow.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(RefreshOutcome::Superseded)) => {}
            other => panic!("slow refresh was not dropped: {:?}", other.is_ready()),
        }
        assert_eq!(s.borrow().displayed().traces()[0].locations, vec!["Wales"]);
    }
}
