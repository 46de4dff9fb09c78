use serde::{Deserialize, Serialize};

/// Per-region solar economics maintained by administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCoefficients {
    pub region: String,
    pub avg_sun_hours: f64,
    pub cost_per_kw: f64,
    pub tariff_per_unit: f64,
    pub panel_efficiency: f64,
    pub co2_per_unit: f64,
}

impl RegionCoefficients {
    /// Every coefficient must be finite and strictly positive. The name is not checked here.
    pub fn validate(&self) -> Result<(), EstimateError> {
        require_positive("avg_sun_hours", self.avg_sun_hours)?;
        require_positive("cost_per_kw", self.cost_per_kw)?;
        require_positive("tariff_per_unit", self.tariff_per_unit)?;
        require_positive("panel_efficiency", self.panel_efficiency)?;
        require_positive("co2_per_unit", self.co2_per_unit)
    }
}

/// Household consumption profile submitted for a sizing estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    pub monthly_bill: f64,
    pub roof_area: f64,
    #[serde(default)]
    pub connected_load_kw: Option<f64>,
}

impl SizingInput {
    pub fn new(monthly_bill: f64, roof_area: f64) -> Self {
        Self {
            monthly_bill,
            roof_area,
            connected_load_kw: None,
        }
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        require_positive("monthly_bill", self.monthly_bill)?;
        require_positive("roof_area", self.roof_area)?;
        if let Some(load) = self.connected_load_kw {
            require_positive("connected_load_kw", load)?;
        }
        Ok(())
    }
}

pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<(), EstimateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EstimateError::InvalidInput { field, value })
    }
}

/// Unrounded recommendation derived from a sizing input and region coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub region: String,
    pub capacity_kw: f64,
    pub consumption_capacity_kw: f64,
    pub area_capacity_kw: f64,
    pub area_required_sqft: f64,
    pub estimated_cost: f64,
    pub subsidy: f64,
    pub net_cost: f64,
    pub monthly_units: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub payback_years: f64,
    pub annual_generation_units: f64,
    pub annual_co2_offset_kg: f64,
    pub within_connected_load: Option<bool>,
}

/// Client-facing shape; rounding to two decimals happens only here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateView {
    pub capacity: f64,
    pub area_required: f64,
    pub estimated_cost: f64,
    pub subsidy: f64,
    pub net_cost: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub roi: f64,
    pub state: String,
    pub annual_generation: f64,
    pub co2_offset: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_connected_load: Option<bool>,
}

impl From<&SizingResult> for EstimateView {
    fn from(result: &SizingResult) -> Self {
        Self {
            capacity: round2(result.capacity_kw),
            area_required: round2(result.area_required_sqft),
            estimated_cost: round2(result.estimated_cost),
            subsidy: round2(result.subsidy),
            net_cost: round2(result.net_cost),
            monthly_savings: round2(result.monthly_savings),
            annual_savings: round2(result.annual_savings),
            roi: round2(result.payback_years),
            state: result.region.clone(),
            annual_generation: round2(result.annual_generation_units),
            co2_offset: round2(result.annual_co2_offset_kg),
            within_connected_load: result.within_connected_load,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("{field} must be a positive number (found {value})")]
    InvalidInput { field: &'static str, value: f64 },
    #[error("region name must not be blank")]
    BlankRegion,
    #[error("no solar coefficients published for region '{0}'")]
    UnknownRegion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_rounds_only_at_presentation() {
        let result = SizingResult {
            region: "Gujarat".to_string(),
            capacity_kw: 2.272_727_27,
            consumption_capacity_kw: 2.272_727_27,
            area_capacity_kw: 4.0,
            area_required_sqft: 227.272_727,
            estimated_cost: 113_636.363_6,
            subsidy: 64_909.090_9,
            net_cost: 48_727.272_7,
            monthly_units: 300.0,
            monthly_savings: 2400.0,
            annual_savings: 28_800.0,
            payback_years: 1.691_919_19,
            annual_generation_units: 3650.0,
            annual_co2_offset_kg: 2993.0,
            within_connected_load: None,
        };

        let view = EstimateView::from(&result);
        assert_eq!(view.capacity, 2.27);
        assert_eq!(view.subsidy, 64_909.09);
        assert_eq!(view.roi, 1.69);
        assert_eq!(view.state, "Gujarat");

        let json = serde_json::to_value(&view).expect("view serializes");
        assert!(json.get("areaRequired").is_some());
        assert!(json.get("withinConnectedLoad").is_none());
    }

    #[test]
    fn non_finite_coefficients_are_rejected() {
        let coeffs = RegionCoefficients {
            region: "Kerala".to_string(),
            avg_sun_hours: f64::NAN,
            cost_per_kw: 52_000.0,
            tariff_per_unit: 6.5,
            panel_efficiency: 0.18,
            co2_per_unit: 0.82,
        };
        assert!(matches!(
            coeffs.validate(),
            Err(EstimateError::InvalidInput {
                field: "avg_sun_hours",
                ..
            })
        ));
    }
}
