//! Geography providers: resolve region ids to boundaries and population.

pub mod geojson;
pub mod remote;

pub use geojson::GeoJsonProvider;
pub use remote::RemoteProvider;

use crate::domain::{Region, RegionId};
use crate::error::ProviderError;

pub trait GeographyProvider {
    /// Boundary geometry and population of one region
    fn resolve(&self, id: &RegionId) -> Result<Region, ProviderError>;

    /// Ids of all regions tagged with `category` (e.g. "district")
    fn list_regions(&self, category: &str) -> Result<Vec<RegionId>, ProviderError>;
}

impl<P: GeographyProvider + ?Sized> GeographyProvider for Box<P> {
    fn resolve(&self, id: &RegionId) -> Result<Region, ProviderError> {
        (**self).resolve(id)
    }

    fn list_regions(&self, category: &str) -> Result<Vec<RegionId>, ProviderError> {
        (**self).list_regions(category)
    }
}
