use crate::models::CategoryIdentifier;

/// Id of the page element the map binds to.
pub const ELEMENT_ID: &str = "choropleth-map";
/// Backend path serving datasets, relative to the site root.
pub const DATA_PATH: &str = "/choropleth/data";
/// Category requested once the surface is bound.
pub const DEFAULT_CATEGORY: &str = "vote";
/// Query parameter carrying the category, both on the backend request and
/// on the page URL.
pub const CATEGORY_PARAM: &str = "type";

/// Runtime settings derived from constants and the hosting page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub element_id: String,
    pub data_url: String,
    pub default_category: CategoryIdentifier,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            element_id: ELEMENT_ID.to_string(),
            data_url: DATA_PATH.to_string(),
            default_category: CategoryIdentifier::from(DEFAULT_CATEGORY),
        }
    }
}

impl AppConfig {
    /// Build the config for a page. `base_url` is the optional prefix the host
    /// publishes for a non-root deployment, `search` the page's query string.
    pub fn from_page(base_url: Option<&str>, search: Option<&str>) -> Self {
        let mut cfg = AppConfig::default();
        if let Some(base) = base_url.filter(|b| !b.trim().is_empty()) {
            cfg.data_url = resolve_url(base, DATA_PATH);
        }
        if let Some(cat) = search
            .and_then(|s| query_param(s, CATEGORY_PARAM))
            .filter(|c| !c.is_empty())
        {
            cfg.default_category = CategoryIdentifier::from(cat);
        }
        cfg
    }
}

/// Join the site-relative `path` onto `base`, with exactly one `/` between.
pub fn resolve_url(base: &str, path: &str) -> String {
    let base = base.trim();
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    format!("{}{}", base, path.trim().trim_start_matches('/'))
}

/// Minimal `?a=b&c=d` lookup; the value is percent-decoded with `+` as space.
pub fn query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let k = it.next()?;
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .to_string()
}
