use crate::domain::Color;
use crate::geometry::MultiPolygon;
use std::fmt;

/// Opaque region identity as used by the geography provider (e.g. "LK-11")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A region as resolved by a geography provider
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub population: f64,
    pub geometry: MultiPolygon,
}

/// Everything needed to place dots for one region.
///
/// `id` and `target_count` together form the cache key.
#[derive(Debug, Clone)]
pub struct RegionSpec {
    pub id: RegionId,
    pub geometry: MultiPolygon,
    pub target_count: usize,
    pub color: Color,
}

impl RegionSpec {
    pub fn new(id: RegionId, geometry: MultiPolygon, target_count: usize, color: Color) -> Self {
        Self {
            id,
            geometry,
            target_count,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_conversions() {
        let a = RegionId::from("LK-11");
        let b = RegionId::new(String::from("LK-11"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "LK-11");
        assert_eq!(format!("{}", a), "LK-11");
    }
}
