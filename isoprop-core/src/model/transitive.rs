//! Route, pattern and stop metadata in the transit-visualization schema.
//!
//! Only the fields the engine reads are typed; everything else is carried
//! through untouched so renderers receive the document they sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitiveNetwork {
    #[serde(default)]
    pub routes: Vec<TransitRoute>,
    #[serde(default)]
    pub patterns: Vec<TransitPattern>,
    #[serde(default)]
    pub stops: Vec<TransitStop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitRoute {
    pub route_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_short_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitPattern {
    pub pattern_id: String,
    pub route_id: String,
    #[serde(default)]
    pub stops: Vec<PatternStop>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternStop {
    pub stop_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitStop {
    pub stop_id: String,
    pub stop_lat: f64,
    pub stop_lon: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TransitiveNetwork {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn pattern(&self, pattern_id: &str) -> Option<&TransitPattern> {
        self.patterns.iter().find(|p| p.pattern_id == pattern_id)
    }

    pub fn route_index(&self, route_id: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.route_id == route_id)
    }
}

impl TransitPattern {
    /// Position of `stop_id` along the pattern, searching from `from`
    pub fn stop_index_from(&self, stop_id: &str, from: usize) -> Option<usize> {
        self.stops
            .iter()
            .skip(from)
            .position(|s| s.stop_id == stop_id)
            .map(|pos| pos + from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETWORK: &str = r#"{
        "routes": [{"route_id": "r1", "route_short_name": "1", "route_color": "ff0000"}],
        "patterns": [{"pattern_id": "0", "route_id": "r1",
                      "stops": [{"stop_id": "3"}, {"stop_id": "4"}, {"stop_id": "3"}]}],
        "stops": [{"stop_id": "3", "stop_lat": 39.7, "stop_lon": -86.1, "stop_name": "Main"}],
        "agencies": []
    }"#;

    #[test]
    fn keeps_unknown_fields() {
        let network = TransitiveNetwork::from_json(NETWORK).unwrap();
        assert_eq!(network.routes[0].route_short_name.as_deref(), Some("1"));
        assert!(network.extra.contains_key("agencies"));

        let json = serde_json::to_value(&network).unwrap();
        assert_eq!(json["routes"][0]["route_color"], "ff0000");
        assert_eq!(json["stops"][0]["stop_name"], "Main");
    }

    #[test]
    fn pattern_lookups() {
        let network = TransitiveNetwork::from_json(NETWORK).unwrap();
        let pattern = network.pattern("0").unwrap();
        assert_eq!(network.route_index(&pattern.route_id), Some(0));
        assert_eq!(pattern.stop_index_from("3", 0), Some(0));
        assert_eq!(pattern.stop_index_from("3", 1), Some(2));
        assert_eq!(pattern.stop_index_from("9", 0), None);
        assert!(network.pattern("1").is_none());
    }
}
