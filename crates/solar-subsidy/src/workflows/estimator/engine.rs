use super::domain::{EstimateError, RegionCoefficients, SizingInput, SizingResult};
use super::tariff::{
    central_subsidy, AREA_PER_KW_SQFT, DAYS_PER_MONTH, DAYS_PER_YEAR, MONTHS_PER_YEAR,
    PERFORMANCE_RATIO,
};

/// Recommend a rooftop system for a household.
///
/// Capacity is the smaller of what covers the household's consumption and what fits on
/// the roof. Panel efficiency is stored with the coefficients but sizing uses the fixed
/// area-per-kW figure. Nothing is rounded here.
pub fn estimate(
    input: &SizingInput,
    coeffs: &RegionCoefficients,
) -> Result<SizingResult, EstimateError> {
    input.validate()?;
    coeffs.validate()?;

    let daily_generation_per_kw = coeffs.avg_sun_hours * PERFORMANCE_RATIO;

    let monthly_units = input.monthly_bill / coeffs.tariff_per_unit;
    let daily_units = monthly_units / DAYS_PER_MONTH;

    let consumption_capacity_kw = daily_units / daily_generation_per_kw;
    let area_capacity_kw = input.roof_area / AREA_PER_KW_SQFT;
    let capacity_kw = consumption_capacity_kw.min(area_capacity_kw);

    let estimated_cost = capacity_kw * coeffs.cost_per_kw;
    let subsidy = central_subsidy(capacity_kw);
    let net_cost = estimated_cost - subsidy;

    let monthly_savings = monthly_units * coeffs.tariff_per_unit;
    let annual_savings = monthly_savings * MONTHS_PER_YEAR;
    let payback_years = if annual_savings > 0.0 {
        net_cost / annual_savings
    } else {
        0.0
    };

    let annual_generation_units = capacity_kw * daily_generation_per_kw * DAYS_PER_YEAR;

    Ok(SizingResult {
        region: coeffs.region.clone(),
        capacity_kw,
        consumption_capacity_kw,
        area_capacity_kw,
        area_required_sqft: capacity_kw * AREA_PER_KW_SQFT,
        estimated_cost,
        subsidy,
        net_cost,
        monthly_units,
        monthly_savings,
        annual_savings,
        payback_years,
        annual_generation_units,
        annual_co2_offset_kg: annual_generation_units * coeffs.co2_per_unit,
        within_connected_load: input.connected_load_kw.map(|load| capacity_kw <= load),
    })
}
