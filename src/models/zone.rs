use serde::Deserialize;

/// A zone polygon feature as read from the zone GeoJSON-like file (§6).
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneFeature {
    pub properties: ZoneProperties,
    pub geometry: ZoneGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneProperties {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneGeometry {
    /// `coordinates[0]` is the outer ring as `[lng, lat]` points.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZoneFeatureCollection {
    pub features: Vec<ZoneFeature>,
}

/// A named zone with its outer-ring polygon, `(lng, lat)` per vertex.
#[derive(Debug, Clone)]
pub struct Zone {
    pub name: String,
    pub outer_ring: Vec<(f64, f64)>,
}

impl From<ZoneFeature> for Zone {
    fn from(feature: ZoneFeature) -> Self {
        let outer_ring = feature
            .geometry
            .coordinates
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|c| (c[0], c[1]))
            .collect();
        Zone { name: feature.properties.name, outer_ring }
    }
}

impl From<ZoneFeatureCollection> for Vec<Zone> {
    fn from(collection: ZoneFeatureCollection) -> Self {
        collection.features.into_iter().map(Zone::from).collect()
    }
}
