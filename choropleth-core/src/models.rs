use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token selecting which statistical variant the backend should return.
/// Never validated here; the backend rejects what it does not know.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryIdentifier(String);

impl CategoryIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        CategoryIdentifier(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryIdentifier {
    fn from(v: &str) -> Self {
        CategoryIdentifier(v.to_string())
    }
}

impl From<String> for CategoryIdentifier {
    fn from(v: String) -> Self {
        CategoryIdentifier(v)
    }
}

impl fmt::Display for CategoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How region identifiers in `locations` are matched against the base map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationMode {
    #[serde(rename = "ISO-3")]
    Iso3,
    #[serde(rename = "USA-states")]
    UsaStates,
    #[default]
    #[serde(rename = "country names")]
    CountryNames,
    #[serde(rename = "geojson-id")]
    GeojsonId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    #[default]
    Choropleth,
}

fn default_autocolorscale() -> bool {
    true
}

/// One choropleth trace as exchanged with the backend and handed to the
/// rendering engine. `locations`, `z` and `text` are parallel arrays; a
/// `None` in `z` is a region with no value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoroplethTrace {
    #[serde(rename = "type", default)]
    pub type_: TraceKind,
    #[serde(default)]
    pub locationmode: LocationMode,
    pub locations: Vec<String>,
    pub z: Vec<Option<f64>>,
    pub text: Vec<String>,
    #[serde(default = "default_autocolorscale")]
    pub autocolorscale: bool,
    /// Trace properties not modelled here (`colorscale`, `zmin`,
    /// `hovertemplate`, ...), passed through to the engine as sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChoroplethTrace {
    /// True when the three parallel arrays have the same length. Nothing in
    /// the pipeline enforces this; the rendering engine is the judge.
    pub fn lengths_match(&self) -> bool {
        self.locations.len() == self.z.len() && self.z.len() == self.text.len()
    }
}

/// Full data payload for one render: the ordered trace collection the
/// backend returns for a category.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset(pub Vec<ChoroplethTrace>);

impl Dataset {
    pub fn single(trace: ChoroplethTrace) -> Self {
        Dataset(vec![trace])
    }

    /// Static dataset the surface is first bound with, before the backend
    /// has answered.
    pub fn placeholder() -> Self {
        let regions = ["England", "Scotland", "Wales"];
        Dataset::single(ChoroplethTrace {
            type_: TraceKind::Choropleth,
            locationmode: LocationMode::CountryNames,
            locations: regions.iter().map(|r| r.to_string()).collect(),
            z: vec![Some(1.0), Some(2.0), Some(3.0)],
            text: regions.iter().map(|r| r.to_string()).collect(),
            autocolorscale: true,
            extra: Map::new(),
        })
    }

    pub fn traces(&self) -> &[ChoroplethTrace] {
        &self.0
    }

    pub fn lengths_match(&self) -> bool {
        self.0.iter().all(ChoroplethTrace::lengths_match)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoScope {
    World,
    Usa,
    #[default]
    Europe,
    Asia,
    Africa,
    #[serde(rename = "north america")]
    NorthAmerica,
    #[serde(rename = "south america")]
    SouthAmerica,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    #[default]
    Mercator,
    Orthographic,
    Equirectangular,
    #[serde(rename = "natural earth")]
    NaturalEarth,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub type_: ProjectionKind,
}

/// Geographic part of the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoSettings {
    pub scope: GeoScope,
    pub showframe: bool,
    pub showcoastlines: bool,
    pub projection: Projection,
}

/// Layout handed to the rendering engine on every draw. Built once and only
/// ever borrowed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    pub geo: GeoSettings,
    pub title: String,
}

impl VisualizationConfig {
    pub const UK_TITLE: &'static str = "UK Parliamentary Constituencies";

    pub fn uk_constituencies() -> Self {
        VisualizationConfig {
            geo: GeoSettings {
                scope: GeoScope::Europe,
                showframe: true,
                showcoastlines: false,
                projection: Projection {
                    type_: ProjectionKind::Mercator,
                },
            },
            title: Self::UK_TITLE.to_string(),
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self::uk_constituencies()
    }
}
