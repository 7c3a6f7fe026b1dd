use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::GeographyProvider;
use crate::domain::{Region, RegionId};
use crate::error::ProviderError;
use crate::geometry::{MultiPolygon, SimplePolygon};

/// GeoJSON FeatureCollection as written by common GIS exports
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// A single region feature
#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Properties {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
}

/// Positions are `[lon, lat]` or `[lon, lat, alt]`
pub type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

impl Feature {
    pub fn id(&self) -> Option<&str> {
        self.properties.as_ref()?.id.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.properties.as_ref()?.category.as_deref()
    }

    /// Convert to a [`Region`], attributing any problem to `id`.
    ///
    /// Only exterior rings are used; holes are dropped.
    pub fn to_region(&self, id: &RegionId) -> Result<Region, ProviderError> {
        let malformed = |reason: String| ProviderError::Malformed {
            id: id.clone(),
            reason,
        };

        let props = self.properties.as_ref();
        let population = props
            .and_then(|p| p.population)
            .ok_or_else(|| malformed("missing population".to_string()))?;
        if !population.is_finite() || population < 0.0 {
            return Err(malformed(format!("invalid population {}", population)));
        }

        let rings: Vec<&Vec<Position>> = match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => coordinates.first().into_iter().collect(),
            Some(Geometry::MultiPolygon { coordinates }) => {
                coordinates.iter().filter_map(|poly| poly.first()).collect()
            }
            Some(Geometry::Unsupported) => {
                return Err(malformed("geometry is not a polygon".to_string()));
            }
            None => return Err(malformed("missing geometry".to_string())),
        };

        let mut parts = Vec::with_capacity(rings.len());
        for (i, ring) in rings.into_iter().enumerate() {
            let vertices = ring
                .iter()
                .map(|pos| match pos.as_slice() {
                    [x, y, ..] => Ok((*x, *y)),
                    _ => Err(malformed(format!("ring {} has a short position", i))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let polygon = SimplePolygon::from_tuples(&vertices)
                .map_err(|e| malformed(format!("ring {}: {}", i, e)))?;
            parts.push(polygon);
        }

        if parts.is_empty() {
            return Err(malformed("geometry has no rings".to_string()));
        }

        Ok(Region {
            id: id.clone(),
            name: props.and_then(|p| p.name.clone()),
            category: props.and_then(|p| p.category.clone()),
            population,
            geometry: MultiPolygon::new(parts),
        })
    }
}

/// Provider backed by one GeoJSON file loaded up front.
///
/// Features are converted lazily on [`GeographyProvider::resolve`], so a
/// malformed feature only fails its own region.
#[derive(Debug)]
pub struct GeoJsonProvider {
    order: Vec<RegionId>,
    features: HashMap<RegionId, Feature>,
}

impl GeoJsonProvider {
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let collection: FeatureCollection = serde_json::from_str(json)?;
        Ok(Self::from_features(collection.features))
    }

    /// Features without an id are ignored; for duplicate ids the first wins.
    pub fn from_features(features: Vec<Feature>) -> Self {
        let mut order = Vec::new();
        let mut by_id = HashMap::new();

        for feature in features {
            let Some(id) = feature.id().map(RegionId::from) else {
                continue;
            };
            if by_id.contains_key(&id) {
                tracing::warn!(region = %id, "duplicate feature id, keeping the first");
                continue;
            }
            order.push(id.clone());
            by_id.insert(id, feature);
        }

        Self {
            order,
            features: by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All ids in file order
    pub fn ids(&self) -> &[RegionId] {
        &self.order
    }
}

impl GeographyProvider for GeoJsonProvider {
    fn resolve(&self, id: &RegionId) -> Result<Region, ProviderError> {
        self.features
            .get(id)
            .ok_or_else(|| ProviderError::UnresolvedRegion(id.clone()))?
            .to_region(id)
    }

    fn list_regions(&self, category: &str) -> Result<Vec<RegionId>, ProviderError> {
        Ok(self
            .order
            .iter()
            .filter(|id| self.features[*id].category() == Some(category))
            .cloned()
            .collect())
    }
}
