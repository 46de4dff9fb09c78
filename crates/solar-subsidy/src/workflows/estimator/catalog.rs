use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::domain::{EstimateError, RegionCoefficients, SizingInput, SizingResult};
use super::engine::estimate;

/// Lookup of published coefficients keyed by region (state) name.
pub trait RegionCatalog: Send + Sync {
    fn fetch(&self, region: &str) -> Option<RegionCoefficients>;
    fn list(&self) -> Vec<RegionCoefficients>;
    fn upsert(&self, coeffs: RegionCoefficients) -> Result<RegionCoefficients, EstimateError>;
}

/// Resolve the region's coefficients and run the estimate against them.
pub fn estimate_for_region<C>(
    catalog: &C,
    region: &str,
    input: &SizingInput,
) -> Result<SizingResult, EstimateError>
where
    C: RegionCatalog + ?Sized,
{
    let coeffs = catalog
        .fetch(region)
        .ok_or_else(|| EstimateError::UnknownRegion(region.trim().to_string()))?;
    estimate(input, &coeffs)
}

fn region_key(region: &str) -> String {
    region.trim().to_ascii_lowercase()
}

/// Process-local catalog; names match case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegionCatalog {
    regions: Arc<RwLock<BTreeMap<String, RegionCoefficients>>>,
}

impl InMemoryRegionCatalog {
    /// Catalog preloaded with the default state coefficients.
    pub fn with_defaults() -> Self {
        let catalog = Self::default();
        {
            let mut guard = catalog.regions.write().expect("catalog lock poisoned");
            for coeffs in default_regions() {
                guard.insert(region_key(&coeffs.region), coeffs);
            }
        }
        catalog
    }
}

impl RegionCatalog for InMemoryRegionCatalog {
    fn fetch(&self, region: &str) -> Option<RegionCoefficients> {
        let guard = self.regions.read().expect("catalog lock poisoned");
        guard.get(&region_key(region)).cloned()
    }

    fn list(&self) -> Vec<RegionCoefficients> {
        let guard = self.regions.read().expect("catalog lock poisoned");
        guard.values().cloned().collect()
    }

    fn upsert(&self, mut coeffs: RegionCoefficients) -> Result<RegionCoefficients, EstimateError> {
        coeffs.region = coeffs.region.trim().to_string();
        if coeffs.region.is_empty() {
            return Err(EstimateError::BlankRegion);
        }
        coeffs.validate()?;
        let mut guard = self.regions.write().expect("catalog lock poisoned");
        guard.insert(region_key(&coeffs.region), coeffs.clone());
        Ok(coeffs)
    }
}

fn region(
    name: &str,
    avg_sun_hours: f64,
    cost_per_kw: f64,
    tariff_per_unit: f64,
    co2_per_unit: f64,
) -> RegionCoefficients {
    RegionCoefficients {
        region: name.to_string(),
        avg_sun_hours,
        cost_per_kw,
        tariff_per_unit,
        panel_efficiency: 0.18,
        co2_per_unit,
    }
}

/// Seed coefficients used until an administrator publishes revised figures.
pub fn default_regions() -> Vec<RegionCoefficients> {
    vec![
        region("Gujarat", 5.8, 48_000.0, 7.5, 0.82),
        region("Rajasthan", 6.0, 47_000.0, 8.0, 0.82),
        region("Maharashtra", 5.4, 52_000.0, 9.5, 0.82),
        region("Tamil Nadu", 5.5, 50_000.0, 6.5, 0.82),
        region("Karnataka", 5.5, 51_000.0, 7.0, 0.82),
        region("Delhi", 5.2, 55_000.0, 8.0, 0.82),
        region("Uttar Pradesh", 5.0, 50_000.0, 7.0, 0.82),
        region("Kerala", 4.8, 53_000.0, 6.0, 0.82),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_padding() {
        let catalog = InMemoryRegionCatalog::with_defaults();
        let coeffs = catalog.fetch("  tamil nadu ").expect("seeded region");
        assert_eq!(coeffs.region, "Tamil Nadu");
        assert_eq!(catalog.list().len(), default_regions().len());
    }

    #[test]
    fn upsert_replaces_existing_region() {
        let catalog = InMemoryRegionCatalog::with_defaults();
        let mut revised = catalog.fetch("Delhi").expect("seeded region");
        revised.region = "DELHI".to_string();
        revised.tariff_per_unit = 9.0;

        catalog.upsert(revised).expect("valid coefficients");

        assert_eq!(catalog.list().len(), default_regions().len());
        assert_eq!(catalog.fetch("delhi").map(|c| c.tariff_per_unit), Some(9.0));
    }

    #[test]
    fn upsert_rejects_non_positive_coefficients() {
        let catalog = InMemoryRegionCatalog::default();
        let mut coeffs = region("Goa", 5.1, 50_000.0, 7.0, 0.82);
        coeffs.cost_per_kw = -1.0;

        assert!(matches!(
            catalog.upsert(coeffs),
            Err(EstimateError::InvalidInput {
                field: "cost_per_kw",
                ..
            })
        ));
        assert!(catalog.fetch("Goa").is_none());
    }

    #[test]
    fn upsert_requires_a_region_name() {
        let catalog = InMemoryRegionCatalog::default();
        let coeffs = region("   ", 5.1, 50_000.0, 7.0, 0.82);

        assert_eq!(catalog.upsert(coeffs), Err(EstimateError::BlankRegion));
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn unknown_region_is_reported() {
        let catalog = InMemoryRegionCatalog::with_defaults();
        let result = estimate_for_region(&catalog, "Atlantis", &SizingInput::new(2000.0, 300.0));
        assert_eq!(
            result,
            Err(EstimateError::UnknownRegion("Atlantis".to_string()))
        );
    }
}
