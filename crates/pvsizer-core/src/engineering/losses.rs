//! Seasonal breakdown of system losses.
//!
//! Base percentages from `SystemLosses` are spread over the year with
//! per-category monthly multipliers chosen by latitude band.

use crate::dimensioning::{MonthlySeries, SystemLosses};
use serde::{Deserialize, Serialize};

const TROPIC_LATITUDE: f64 = 23.5;
const EQUATORIAL_LATITUDE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatitudeBand {
    /// |latitude| < 10°
    Equatorial,
    /// 10° ≤ |latitude| < 23.5°
    Tropical,
    /// |latitude| ≥ 23.5°
    Subtropical,
}

impl LatitudeBand {
    pub fn from_latitude(latitude: f64) -> Self {
        let abs = latitude.abs();
        if abs < EQUATORIAL_LATITUDE {
            LatitudeBand::Equatorial
        } else if abs < TROPIC_LATITUDE {
            LatitudeBand::Tropical
        } else {
            LatitudeBand::Subtropical
        }
    }

    fn multipliers(self) -> &'static BandMultipliers {
        match self {
            LatitudeBand::Equatorial => &EQUATORIAL,
            LatitudeBand::Tropical => &TROPICAL,
            LatitudeBand::Subtropical => &SUBTROPICAL,
        }
    }
}

struct BandMultipliers {
    shading: MonthlySeries,
    /// Cabling and inverter losses both follow cell and ambient temperature.
    thermal: MonthlySeries,
    soiling: MonthlySeries,
}

// Month order Jan..Dec, southern hemisphere seasons.
static EQUATORIAL: BandMultipliers = BandMultipliers {
    shading: [1.00, 1.00, 0.98, 0.98, 1.00, 1.02, 1.02, 1.00, 0.98, 0.98, 1.00, 1.00],
    thermal: [1.02, 1.02, 1.00, 1.00, 0.98, 0.96, 0.96, 0.98, 1.02, 1.05, 1.05, 1.04],
    soiling: [0.70, 0.65, 0.65, 0.70, 0.85, 1.05, 1.20, 1.35, 1.45, 1.40, 1.20, 0.90],
};

static TROPICAL: BandMultipliers = BandMultipliers {
    shading: [0.85, 0.88, 0.95, 1.05, 1.15, 1.22, 1.20, 1.10, 1.00, 0.92, 0.86, 0.84],
    thermal: [1.08, 1.08, 1.05, 1.00, 0.94, 0.90, 0.90, 0.94, 1.00, 1.05, 1.08, 1.08],
    soiling: [0.70, 0.70, 0.80, 0.95, 1.20, 1.40, 1.50, 1.45, 1.25, 0.95, 0.75, 0.70],
};

static SUBTROPICAL: BandMultipliers = BandMultipliers {
    shading: [0.75, 0.80, 0.92, 1.10, 1.30, 1.42, 1.38, 1.20, 1.02, 0.88, 0.78, 0.74],
    thermal: [1.12, 1.12, 1.06, 0.98, 0.90, 0.86, 0.86, 0.90, 0.96, 1.02, 1.08, 1.12],
    soiling: [0.85, 0.85, 0.90, 1.00, 1.10, 1.20, 1.25, 1.20, 1.05, 0.95, 0.85, 0.85],
};

/// Month-by-month loss percentages per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLosses {
    pub band: LatitudeBand,
    pub shading: MonthlySeries,
    pub mismatch: MonthlySeries,
    pub cabling: MonthlySeries,
    pub soiling: MonthlySeries,
    pub inverter: MonthlySeries,
    pub other: MonthlySeries,
    /// Sum of the categories, clamped to 0..=100.
    pub total: MonthlySeries,
}

impl MonthlyLosses {
    pub fn annual_average(&self) -> f64 {
        self.total.iter().sum::<f64>() / 12.0
    }
}

pub struct LossesEngine;

impl LossesEngine {
    pub fn monthly(base: &SystemLosses, latitude: f64) -> MonthlyLosses {
        let band = LatitudeBand::from_latitude(latitude);
        let table = band.multipliers();
        // Seasons flip north of the equator outside the equatorial band.
        let shift = if latitude > 0.0 && band != LatitudeBand::Equatorial {
            6
        } else {
            0
        };

        let shading = spread(base.shading, &table.shading, shift);
        let mismatch = flat(base.mismatch);
        let cabling = spread(base.cabling, &table.thermal, shift);
        let soiling = spread(base.soiling, &table.soiling, shift);
        let inverter = spread(base.inverter, &table.thermal, shift);
        let other = flat(base.other);

        let mut total = [0.0; 12];
        for (month, slot) in total.iter_mut().enumerate() {
            let sum = shading[month]
                + mismatch[month]
                + cabling[month]
                + soiling[month]
                + inverter[month]
                + other[month];
            *slot = sum.clamp(0.0, 100.0);
        }

        MonthlyLosses {
            band,
            shading,
            mismatch,
            cabling,
            soiling,
            inverter,
            other,
            total,
        }
    }
}

fn spread(base: f64, multipliers: &MonthlySeries, shift: usize) -> MonthlySeries {
    let mut out = [0.0; 12];
    for (month, slot) in out.iter_mut().enumerate() {
        *slot = base * multipliers[(month + shift) % 12];
    }
    out
}

fn flat(base: f64) -> MonthlySeries {
    [base; 12]
}
