//! Read-only lookups for anchors and points of interest
//!
//! Registries are filled by the caller before a request is handled; the
//! engine never writes to them.

use crate::core::{Anchor, PointOfInterest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anchor lookup by id
pub trait AnchorRegistry {
    fn get_anchor(&self, id: &str) -> Option<&Anchor>;
}

/// Point-of-interest listing and lookup
pub trait PoiRegistry {
    fn list_pois(&self) -> &[PointOfInterest];

    fn get_poi(&self, id: u32) -> Option<&PointOfInterest> {
        self.list_pois().iter().find(|poi| poi.id == id)
    }
}

impl AnchorRegistry for HashMap<String, Anchor> {
    fn get_anchor(&self, id: &str) -> Option<&Anchor> {
        self.get(id)
    }
}

impl AnchorRegistry for [Anchor] {
    fn get_anchor(&self, id: &str) -> Option<&Anchor> {
        self.iter().find(|anchor| anchor.id == id)
    }
}

impl AnchorRegistry for Vec<Anchor> {
    fn get_anchor(&self, id: &str) -> Option<&Anchor> {
        self.as_slice().get_anchor(id)
    }
}

impl PoiRegistry for [PointOfInterest] {
    fn list_pois(&self) -> &[PointOfInterest] {
        self
    }
}

impl PoiRegistry for Vec<PointOfInterest> {
    fn list_pois(&self) -> &[PointOfInterest] {
        self.as_slice()
    }
}

/// In-memory snapshot of both registries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RegistryFile")]
pub struct StaticRegistry {
    anchors: Vec<Anchor>,
    pois: Vec<PointOfInterest>,
    #[serde(skip)]
    anchor_index: HashMap<String, usize>,
}

// On-disk shape; the id index is rebuilt after loading
#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    anchors: Vec<Anchor>,
    #[serde(default)]
    pois: Vec<PointOfInterest>,
}

impl From<RegistryFile> for StaticRegistry {
    fn from(file: RegistryFile) -> Self {
        StaticRegistry::new(file.anchors, file.pois)
    }
}

impl StaticRegistry {
    pub fn new(anchors: Vec<Anchor>, pois: Vec<PointOfInterest>) -> Self {
        let mut registry = Self {
            anchors,
            pois,
            anchor_index: HashMap::new(),
        };
        registry.reindex();
        registry
    }

    /// Rebuild the id index; later duplicates shadow earlier ones
    pub fn reindex(&mut self) {
        self.anchor_index = self
            .anchors
            .iter()
            .enumerate()
            .map(|(i, anchor)| (anchor.id.clone(), i))
            .collect();
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn anchor_count(&self) -> usize {
        self.anchor_index.len()
    }
}

impl AnchorRegistry for StaticRegistry {
    fn get_anchor(&self, id: &str) -> Option<&Anchor> {
        self.anchor_index.get(id).and_then(|&i| self.anchors.get(i))
    }
}

impl PoiRegistry for StaticRegistry {
    fn list_pois(&self) -> &[PointOfInterest] {
        &self.pois
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_registry_lookup() {
        let registry = StaticRegistry::new(
            vec![Anchor::new("esp32-1", 0.0, 0.0), Anchor::new("esp32-2", 4.0, 0.0)],
            vec![PointOfInterest::new(7, 1.0, 2.0, "Library")],
        );

        assert_eq!(registry.get_anchor("esp32-2").map(|a| a.x), Some(4.0));
        assert!(registry.get_anchor("esp32-9").is_none());
        assert_eq!(registry.get_poi(7).map(|p| p.name.as_str()), Some("Library"));
        assert!(registry.get_poi(8).is_none());
        assert_eq!(registry.anchor_count(), 2);
    }

    #[test]
    fn test_duplicate_anchor_ids_shadow() {
        let registry = StaticRegistry::new(
            vec![Anchor::new("a", 0.0, 0.0), Anchor::new("a", 9.0, 9.0)],
            Vec::new(),
        );
        assert_eq!(registry.anchor_count(), 1);
        assert_eq!(registry.get_anchor("a").map(|a| a.x), Some(9.0));
    }

    #[test]
    fn test_deserialized_registry_is_indexed() {
        let json = r#"{"anchors": [{"id": "a", "x": 1.0, "y": 2.0}, {"id": "b", "x": 5.0, "y": 0.0}]}"#;
        let registry: StaticRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.get_anchor("a").map(|a| a.y), Some(2.0));
        assert_eq!(registry.anchor_count(), 2);
        assert!(registry.list_pois().is_empty());

        let round_trip: StaticRegistry = serde_json::from_str(&serde_json::to_string(&registry).unwrap()).unwrap();
        assert_eq!(round_trip.get_anchor("b").map(|a| a.x), Some(5.0));
    }

    #[test]
    fn test_deserialized_registry_locates() {
        use crate::api::engine::NavigationEngine;
        use crate::core::RssiSample;

        let json = r#"{
            "anchors": [
                {"id": "esp32-1", "x": 0.0, "y": 0.0},
                {"id": "esp32-2", "x": 10.0, "y": 0.0},
                {"id": "esp32-3", "x": 0.0, "y": 10.0}
            ]
        }"#;
        let registry: StaticRegistry = serde_json::from_str(json).unwrap();
        let samples = vec![
            RssiSample::new("esp32-1", -73),
            RssiSample::new("esp32-2", -77),
            RssiSample::new("esp32-3", -76),
        ];

        let report = NavigationEngine::default().locate(&samples, &registry).unwrap();
        assert_eq!(report.fix.anchors_used.len(), 3);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn test_slice_registries() {
        let anchors = vec![Anchor::new("x", 3.0, 3.0)];
        assert!(anchors.get_anchor("x").is_some());
        let pois = vec![PointOfInterest::new(1, 0.0, 0.0, "Cafe")];
        assert_eq!(pois.list_pois().len(), 1);
    }
}
