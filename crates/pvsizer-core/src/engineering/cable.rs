//! AC cable sizing for the inverter output circuit.
//!
//! Ampacity follows the NBR 5410 reference tables for copper conductors,
//! 30 °C ambient, by installation method and insulation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Maximum voltage drop accepted on the inverter output circuit, percent.
pub const DROP_LIMIT_PERCENT: f64 = 2.0;

/// Commercial cross-sections in mm².
pub const COMMERCIAL_SECTIONS_MM2: [f64; 16] = [
    1.5, 2.5, 4.0, 6.0, 10.0, 16.0, 25.0, 35.0, 50.0, 70.0, 95.0, 120.0, 150.0, 185.0, 240.0,
    300.0,
];

const COPPER_RESISTIVITY: f64 = 0.0172; // Ω·mm²/m
const ALUMINUM_RESISTIVITY: f64 = 0.0282; // Ω·mm²/m
const ALUMINUM_AMPACITY_FACTOR: f64 = 0.78;

type AmpacityRow = [f64; 16];

// PVC 70 °C, (two loaded conductors, three loaded conductors)
static PVC_B1: (AmpacityRow, AmpacityRow) = (
    [17.5, 24.0, 32.0, 41.0, 57.0, 76.0, 101.0, 125.0, 151.0, 192.0, 232.0, 269.0, 309.0, 353.0, 415.0, 477.0],
    [15.5, 21.0, 28.0, 36.0, 50.0, 68.0, 89.0, 110.0, 134.0, 171.0, 207.0, 239.0, 275.0, 314.0, 370.0, 426.0],
);
static PVC_B2: (AmpacityRow, AmpacityRow) = (
    [16.5, 23.0, 30.0, 38.0, 52.0, 69.0, 90.0, 111.0, 133.0, 168.0, 201.0, 232.0, 258.0, 294.0, 344.0, 394.0],
    [15.0, 20.0, 27.0, 34.0, 46.0, 62.0, 80.0, 99.0, 118.0, 149.0, 179.0, 206.0, 225.0, 255.0, 297.0, 339.0],
);
static PVC_C: (AmpacityRow, AmpacityRow) = (
    [19.5, 27.0, 36.0, 46.0, 63.0, 85.0, 112.0, 138.0, 168.0, 213.0, 258.0, 299.0, 344.0, 392.0, 461.0, 530.0],
    [17.5, 24.0, 32.0, 41.0, 57.0, 76.0, 96.0, 119.0, 144.0, 184.0, 223.0, 259.0, 299.0, 341.0, 403.0, 464.0],
);
static PVC_D: (AmpacityRow, AmpacityRow) = (
    [22.0, 29.0, 38.0, 47.0, 63.0, 81.0, 104.0, 125.0, 148.0, 183.0, 216.0, 246.0, 278.0, 312.0, 361.0, 408.0],
    [18.0, 24.0, 31.0, 39.0, 52.0, 67.0, 86.0, 103.0, 122.0, 151.0, 179.0, 203.0, 230.0, 258.0, 297.0, 336.0],
);

// EPR / XLPE 90 °C
static EPR_B1: (AmpacityRow, AmpacityRow) = (
    [23.0, 31.0, 42.0, 54.0, 75.0, 100.0, 133.0, 164.0, 198.0, 253.0, 306.0, 354.0, 407.0, 464.0, 546.0, 628.0],
    [20.0, 28.0, 37.0, 48.0, 66.0, 88.0, 117.0, 144.0, 175.0, 222.0, 269.0, 312.0, 358.0, 408.0, 481.0, 553.0],
);
static EPR_B2: (AmpacityRow, AmpacityRow) = (
    [22.0, 30.0, 40.0, 51.0, 69.0, 91.0, 119.0, 146.0, 175.0, 221.0, 265.0, 305.0, 334.0, 384.0, 459.0, 532.0],
    [19.5, 26.0, 35.0, 44.0, 60.0, 80.0, 105.0, 128.0, 154.0, 194.0, 233.0, 268.0, 300.0, 340.0, 398.0, 455.0],
);
static EPR_C: (AmpacityRow, AmpacityRow) = (
    [24.0, 33.0, 45.0, 58.0, 80.0, 107.0, 138.0, 171.0, 209.0, 269.0, 328.0, 382.0, 441.0, 506.0, 599.0, 693.0],
    [22.0, 30.0, 40.0, 52.0, 71.0, 96.0, 119.0, 147.0, 179.0, 229.0, 278.0, 322.0, 371.0, 424.0, 500.0, 576.0],
);
static EPR_D: (AmpacityRow, AmpacityRow) = (
    [26.0, 34.0, 44.0, 56.0, 73.0, 95.0, 121.0, 146.0, 173.0, 213.0, 252.0, 287.0, 324.0, 363.0, 419.0, 474.0],
    [22.0, 29.0, 37.0, 46.0, 61.0, 79.0, 101.0, 122.0, 144.0, 178.0, 211.0, 240.0, 271.0, 304.0, 351.0, 396.0],
);

// Ambient temperature correction, rows every 5 °C from 10 °C.
const TEMP_STEPS_C: [f64; 13] = [
    10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 55.0, 60.0, 65.0, 70.0,
];
const PVC_TEMP_FACTORS: [Option<f64>; 13] = [
    Some(1.22), Some(1.17), Some(1.12), Some(1.06), Some(1.00), Some(0.94), Some(0.87),
    Some(0.79), Some(0.71), Some(0.61), Some(0.50), None, None,
];
const EPR_TEMP_FACTORS: [Option<f64>; 13] = [
    Some(1.15), Some(1.12), Some(1.08), Some(1.04), Some(1.00), Some(0.96), Some(0.91),
    Some(0.87), Some(0.82), Some(0.76), Some(0.71), Some(0.65), Some(0.58),
];

// Grouping correction by number of circuits, 9 or more share the last value.
const GROUPING_FACTORS: [f64; 9] = [1.00, 0.80, 0.70, 0.65, 0.60, 0.57, 0.54, 0.52, 0.50];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    SinglePhase,
    DualPhase,
    ThreePhase,
}

impl ConnectionType {
    fn loaded_conductors(self) -> usize {
        match self {
            ConnectionType::SinglePhase | ConnectionType::DualPhase => 2,
            ConnectionType::ThreePhase => 3,
        }
    }

    fn drop_factor(self) -> f64 {
        match self {
            ConnectionType::SinglePhase | ConnectionType::DualPhase => 2.0,
            ConnectionType::ThreePhase => 3f64.sqrt(),
        }
    }
}

impl FromStr for ConnectionType {
    type Err = CableSizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single_phase" | "monofasico" | "mono" => Ok(Self::SinglePhase),
            "dual" | "dual_phase" | "bifasico" | "bi" => Ok(Self::DualPhase),
            "three" | "three_phase" | "trifasico" | "tri" => Ok(Self::ThreePhase),
            other => Err(CableSizingError::InvalidInput(format!(
                "unknown connection type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductorMaterial {
    Copper,
    Aluminum,
}

impl ConductorMaterial {
    fn resistivity(self) -> f64 {
        match self {
            ConductorMaterial::Copper => COPPER_RESISTIVITY,
            ConductorMaterial::Aluminum => ALUMINUM_RESISTIVITY,
        }
    }

    fn ampacity_factor(self) -> f64 {
        match self {
            ConductorMaterial::Copper => 1.0,
            ConductorMaterial::Aluminum => ALUMINUM_AMPACITY_FACTOR,
        }
    }
}

impl FromStr for ConductorMaterial {
    type Err = CableSizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copper" | "cu" | "cobre" => Ok(Self::Copper),
            "aluminum" | "aluminium" | "al" | "aluminio" => Ok(Self::Aluminum),
            other => Err(CableSizingError::InvalidInput(format!(
                "unknown conductor material '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CableSizingError {
    /// No ampacity table for this installation method and insulation.
    #[error("no ampacity table for installation method '{method}' with '{insulation}' insulation")]
    UnsupportedInstallation { method: String, insulation: String },

    #[error("invalid cable sizing input: {0}")]
    InvalidInput(String),

    /// Even the largest section cannot carry the current.
    #[error("no commercial section carries {current_a:.1} A")]
    CurrentExceedsTable { current_a: f64 },
}

/// Inputs describing the inverter output circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableSizingInput {
    pub ac_power_w: f64,
    pub connection: ConnectionType,
    pub voltage_v: f64,
    pub material: ConductorMaterial,
    pub length_m: f64,
    /// Installation method code, e.g. "B1".
    pub installation_method: String,
    /// Insulation type: "PVC", "EPR" or "XLPE".
    pub insulation: String,
    #[serde(default = "default_ambient")]
    pub ambient_temp_c: f64,
    #[serde(default = "default_circuits")]
    pub grouped_circuits: u32,
}

fn default_ambient() -> f64 {
    30.0
}

fn default_circuits() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CableSizing {
    pub design_current_a: f64,
    pub temperature_factor: f64,
    pub grouping_factor: f64,
    pub derated_current_a: f64,
    /// Section chosen by ampacity alone.
    pub ampacity_section_mm2: f64,
    /// Final section after voltage-drop upsizing.
    pub section_mm2: f64,
    pub ampacity_a: f64,
    pub voltage_drop_v: f64,
    pub voltage_drop_percent: f64,
    pub drop_limit_satisfied: bool,
    pub upsizing_steps: u32,
}

pub struct CableSizingEngine;

impl CableSizingEngine {
    pub fn size(input: &CableSizingInput) -> Result<CableSizing, CableSizingError> {
        validate_input(input)?;
        let table = ampacity_table(&input.installation_method, &input.insulation)?;
        let row = match input.connection.loaded_conductors() {
            2 => &table.0,
            _ => &table.1,
        };

        let design_current_a = Self::design_current(input);
        let temperature_factor = temperature_factor(&input.insulation, input.ambient_temp_c)?;
        let grouping_factor = grouping_factor(input.grouped_circuits);
        let derated_current_a = design_current_a / (temperature_factor * grouping_factor);

        let material_factor = input.material.ampacity_factor();
        let first_index = row
            .iter()
            .position(|a| a * material_factor >= derated_current_a)
            .ok_or(CableSizingError::CurrentExceedsTable {
                current_a: derated_current_a,
            })?;

        let mut index = first_index;
        let mut drop_v = Self::voltage_drop_v(input, design_current_a, COMMERCIAL_SECTIONS_MM2[index]);
        let mut upsizing_steps = 0;
        while percent_of(drop_v, input.voltage_v) > DROP_LIMIT_PERCENT
            && index + 1 < COMMERCIAL_SECTIONS_MM2.len()
        {
            index += 1;
            upsizing_steps += 1;
            drop_v = Self::voltage_drop_v(input, design_current_a, COMMERCIAL_SECTIONS_MM2[index]);
        }
        let voltage_drop_percent = percent_of(drop_v, input.voltage_v);

        Ok(CableSizing {
            design_current_a,
            temperature_factor,
            grouping_factor,
            derated_current_a,
            ampacity_section_mm2: COMMERCIAL_SECTIONS_MM2[first_index],
            section_mm2: COMMERCIAL_SECTIONS_MM2[index],
            ampacity_a: row[index] * material_factor,
            voltage_drop_v: drop_v,
            voltage_drop_percent,
            drop_limit_satisfied: voltage_drop_percent <= DROP_LIMIT_PERCENT,
            upsizing_steps,
        })
    }

    /// Line current: P / V, or P / (V·√3) for three-phase circuits.
    pub fn design_current(input: &CableSizingInput) -> f64 {
        match input.connection {
            ConnectionType::SinglePhase | ConnectionType::DualPhase => {
                input.ac_power_w / input.voltage_v
            }
            ConnectionType::ThreePhase => input.ac_power_w / (input.voltage_v * 3f64.sqrt()),
        }
    }

    fn voltage_drop_v(input: &CableSizingInput, current_a: f64, section_mm2: f64) -> f64 {
        input.connection.drop_factor() * input.material.resistivity() * input.length_m * current_a
            / section_mm2
    }
}

fn percent_of(drop_v: f64, voltage_v: f64) -> f64 {
    drop_v / voltage_v * 100.0
}

fn validate_input(input: &CableSizingInput) -> Result<(), CableSizingError> {
    if !(input.ac_power_w > 0.0) {
        return Err(CableSizingError::InvalidInput(
            "AC power must be positive".to_string(),
        ));
    }
    if !(input.voltage_v > 0.0) {
        return Err(CableSizingError::InvalidInput(
            "line voltage must be positive".to_string(),
        ));
    }
    if !(input.length_m > 0.0) {
        return Err(CableSizingError::InvalidInput(
            "circuit length must be positive".to_string(),
        ));
    }
    if input.grouped_circuits == 0 {
        return Err(CableSizingError::InvalidInput(
            "at least one circuit is required".to_string(),
        ));
    }
    Ok(())
}

fn is_pvc(insulation: &str) -> Option<bool> {
    match insulation.trim().to_ascii_uppercase().as_str() {
        "PVC" => Some(true),
        "EPR" | "XLPE" => Some(false),
        _ => None,
    }
}

fn ampacity_table(
    method: &str,
    insulation: &str,
) -> Result<&'static (AmpacityRow, AmpacityRow), CableSizingError> {
    let unsupported = || CableSizingError::UnsupportedInstallation {
        method: method.to_string(),
        insulation: insulation.to_string(),
    };
    let pvc = is_pvc(insulation).ok_or_else(unsupported)?;
    let table = match (method.trim().to_ascii_uppercase().as_str(), pvc) {
        ("B1", true) => &PVC_B1,
        ("B2", true) => &PVC_B2,
        ("C", true) => &PVC_C,
        ("D", true) => &PVC_D,
        ("B1", false) => &EPR_B1,
        ("B2", false) => &EPR_B2,
        ("C", false) => &EPR_C,
        ("D", false) => &EPR_D,
        _ => return Err(unsupported()),
    };
    Ok(table)
}

/// Factor of the first table temperature at or above the ambient.
fn temperature_factor(insulation: &str, ambient_c: f64) -> Result<f64, CableSizingError> {
    let factors = match is_pvc(insulation) {
        Some(true) => &PVC_TEMP_FACTORS,
        _ => &EPR_TEMP_FACTORS,
    };
    TEMP_STEPS_C
        .iter()
        .position(|t| *t >= ambient_c)
        .and_then(|i| factors[i])
        .ok_or_else(|| {
            CableSizingError::InvalidInput(format!(
                "ambient temperature {} °C exceeds the insulation rating",
                ambient_c
            ))
        })
}

fn grouping_factor(circuits: u32) -> f64 {
    let index = (circuits.max(1) as usize - 1).min(GROUPING_FACTORS.len() - 1);
    GROUPING_FACTORS[index]
}
