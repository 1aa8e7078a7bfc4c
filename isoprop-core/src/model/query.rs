use serde::{Deserialize, Serialize};

use super::extent::Extent;
use super::transitive::TransitiveNetwork;
use crate::Error;

/// Bounding box the routing backend computed results for.
///
/// Every pixel-indexed structure (stop tree cache, surfaces) is laid out
/// row-major over this box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(flatten)]
    pub extent: Extent,
    /// Network metadata embedded by some backends, moved into the
    /// [`Network`](crate::Network) on construction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitive_data: Option<TransitiveNetwork>,
}

impl Query {
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            transitive_data: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn width(&self) -> usize {
        self.extent.width
    }

    pub fn height(&self) -> usize {
        self.extent.height
    }

    pub fn pixel_count(&self) -> usize {
        self.extent.pixel_count()
    }
}
