//! Central financial assistance tiers and sizing coefficients for residential rooftop solar.
//!
//! Values mirror the published central-government subsidy policy and must be kept verbatim.
//! Only this module changes when the policy is revised.

/// System losses applied to nameplate generation.
pub const PERFORMANCE_RATIO: f64 = 0.8;

/// Shadow-free roof area needed per installed kW, in square feet.
pub const AREA_PER_KW_SQFT: f64 = 100.0;

/// Billing cycle length used to turn monthly consumption into a daily load.
pub const DAYS_PER_MONTH: f64 = 30.0;

pub const DAYS_PER_YEAR: f64 = 365.0;

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Capacity covered at the first-tier rate.
pub const FIRST_TIER_LIMIT_KW: f64 = 2.0;

/// Subsidy per kW for the first two kilowatts.
pub const FIRST_TIER_RATE_PER_KW: f64 = 30_000.0;

/// Upper bound of the second tier.
pub const SECOND_TIER_LIMIT_KW: f64 = 3.0;

/// Subsidy per kW for the third kilowatt.
pub const SECOND_TIER_RATE_PER_KW: f64 = 18_000.0;

/// Flat subsidy for systems above the second tier.
pub const SUBSIDY_CAP: f64 = 78_000.0;

/// Central subsidy for a system of `capacity_kw`, independent of the scheme applied against.
pub fn central_subsidy(capacity_kw: f64) -> f64 {
    if capacity_kw <= FIRST_TIER_LIMIT_KW {
        capacity_kw * FIRST_TIER_RATE_PER_KW
    } else if capacity_kw <= SECOND_TIER_LIMIT_KW {
        FIRST_TIER_LIMIT_KW * FIRST_TIER_RATE_PER_KW
            + (capacity_kw - FIRST_TIER_LIMIT_KW) * SECOND_TIER_RATE_PER_KW
    } else {
        SUBSIDY_CAP
    }
}
