//! Dimensioning session and its domain records.

use crate::results::DimensioningResults;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Twelve monthly values, January first.
pub type MonthlySeries = [f64; 12];

/// Brazilian tariff classification of the consumer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TariffGroup {
    /// High-voltage, time-of-use (peak / off-peak)
    A,
    /// Low-voltage, flat rate
    #[default]
    B,
}

impl fmt::Display for TariffGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TariffGroup::A => write!(f, "A"),
            TariffGroup::B => write!(f, "B"),
        }
    }
}

/// One of the seven workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    Customer = 1,
    Energy = 2,
    Location = 3,
    System = 4,
    Roof = 5,
    Budget = 6,
    Results = 7,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Customer,
        Step::Energy,
        Step::Location,
        Step::System,
        Step::Roof,
        Step::Budget,
        Step::Results,
    ];

    pub const FIRST: Step = Step::Customer;
    pub const LAST: Step = Step::Results;

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }

    /// Steps strictly before this one, in order.
    pub fn predecessors(self) -> impl Iterator<Item = Step> {
        Self::ALL.into_iter().take_while(move |s| *s < self)
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Step::from_number(value).ok_or_else(|| format!("step {} is outside 1..=7", value))
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Customer => "customer",
            Step::Energy => "energy",
            Step::Location => "location",
            Step::System => "system",
            Step::Roof => "roof",
            Step::Budget => "budget",
            Step::Results => "results",
        };
        write!(f, "{} ({})", self.number(), label)
    }
}

/// Names one domain of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainKind {
    Customer,
    Energy,
    Location,
    System,
    Roof,
    Budget,
    Results,
}

impl DomainKind {
    /// The step whose validity depends on this domain.
    pub fn owning_step(self) -> Step {
        match self {
            DomainKind::Customer => Step::Customer,
            DomainKind::Energy => Step::Energy,
            DomainKind::Location => Step::Location,
            DomainKind::System => Step::System,
            DomainKind::Roof => Step::Roof,
            DomainKind::Budget => Step::Budget,
            DomainKind::Results => Step::Results,
        }
    }
}

// ============================================================================
// Customer
// ============================================================================

/// Reference to a customer held by the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerDomain {
    pub client: Option<ClientRef>,
    pub project_name: String,
    pub tariff_group: TariffGroup,
    /// Tariff subgroup as printed on the bill (e.g. "A4", "B1").
    pub subgroup: Option<String>,
    pub utility: Option<String>,
    pub region: Option<String>,
    pub address: Option<String>,
}

// ============================================================================
// Energy
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupABill {
    pub name: String,
    pub peak_kwh: MonthlySeries,
    pub off_peak_kwh: MonthlySeries,
}

impl GroupABill {
    pub fn has_consumption(&self) -> bool {
        self.peak_kwh
            .iter()
            .chain(self.off_peak_kwh.iter())
            .any(|v| *v != 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupBBill {
    pub name: String,
    pub monthly_kwh: MonthlySeries,
}

impl GroupBBill {
    pub fn has_consumption(&self) -> bool {
        self.monthly_kwh.iter().any(|v| *v != 0.0)
    }
}

/// Energy prices in R$/kWh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TariffRates {
    pub flat_kwh: f64,
    pub peak_kwh: f64,
    pub off_peak_kwh: f64,
    pub annual_increase_percent: f64,
}

impl Default for TariffRates {
    fn default() -> Self {
        Self {
            flat_kwh: 0.0,
            peak_kwh: 0.0,
            off_peak_kwh: 0.0,
            annual_increase_percent: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EnergyDomain {
    pub group_a_bills: Vec<GroupABill>,
    pub group_b_bills: Vec<GroupBBill>,
    pub tariffs: TariffRates,
}

impl EnergyDomain {
    /// Whether any bill of the given group carries non-zero consumption.
    pub fn has_consumption_for(&self, group: TariffGroup) -> bool {
        match group {
            TariffGroup::A => self.group_a_bills.iter().any(GroupABill::has_consumption),
            TariffGroup::B => self.group_b_bills.iter().any(GroupBBill::has_consumption),
        }
    }

    /// Month-by-month sum of all group A bills as (peak, off-peak).
    pub fn group_a_totals(&self) -> (MonthlySeries, MonthlySeries) {
        let mut peak = [0.0; 12];
        let mut off_peak = [0.0; 12];
        for bill in &self.group_a_bills {
            for month in 0..12 {
                peak[month] += bill.peak_kwh[month];
                off_peak[month] += bill.off_peak_kwh[month];
            }
        }
        (peak, off_peak)
    }

    /// Month-by-month sum of all group B bills.
    pub fn group_b_totals(&self) -> MonthlySeries {
        let mut total = [0.0; 12];
        for bill in &self.group_b_bills {
            for (month, value) in bill.monthly_kwh.iter().enumerate() {
                total[month] += value;
            }
        }
        total
    }
}

// ============================================================================
// Location
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationDomain {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    /// Daily irradiation per month in kWh/m²/day.
    pub irradiance: Vec<f64>,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    /// Monthly shading percentage, when a shading study exists.
    pub shading: Option<MonthlySeries>,
}

impl Default for LocationDomain {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            city: None,
            state: None,
            irradiance: Vec::new(),
            tilt_deg: 0.0,
            azimuth_deg: 0.0,
            shading: None,
        }
    }
}

impl LocationDomain {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRef {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub power_w: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InverterSelection {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub ac_power_w: f64,
    pub quantity: u32,
}

/// Base loss percentages applied to the PV yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemLosses {
    pub shading: f64,
    pub mismatch: f64,
    pub cabling: f64,
    pub soiling: f64,
    pub inverter: f64,
    pub other: f64,
}

impl Default for SystemLosses {
    fn default() -> Self {
        Self {
            shading: 3.0,
            mismatch: 2.0,
            cabling: 2.0,
            soiling: 3.0,
            inverter: 3.0,
            other: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemDomain {
    pub module: Option<ModuleRef>,
    pub inverters: Vec<InverterSelection>,
    pub module_count: u32,
    pub losses: SystemLosses,
}

impl SystemDomain {
    /// Installed DC power in kWp.
    pub fn peak_power_kwp(&self) -> f64 {
        self.module
            .as_ref()
            .map(|m| m.power_w * f64::from(self.module_count) / 1000.0)
            .unwrap_or(0.0)
    }

    /// Total inverter AC power in kW.
    pub fn inverter_ac_power_kw(&self) -> f64 {
        self.inverters
            .iter()
            .map(|inv| inv.ac_power_w * f64::from(inv.quantity.max(1)))
            .sum::<f64>()
            / 1000.0
    }
}

// ============================================================================
// Roof and budget
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MountingArea {
    pub name: String,
    pub width_m: f64,
    pub length_m: f64,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
}

impl MountingArea {
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.length_m
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RoofDomain {
    pub areas: Vec<MountingArea>,
    pub mounting_type: Option<String>,
}

impl RoofDomain {
    pub fn total_area_m2(&self) -> f64 {
        self.areas.iter().map(MountingArea::area_m2).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentTerms {
    pub method: Option<String>,
    pub down_payment_percent: f64,
    pub installments: u32,
    pub monthly_interest_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetDomain {
    pub equipment_cost: f64,
    pub materials_cost: f64,
    pub labor_cost: f64,
    pub markup_percent: f64,
    pub discount_rate_percent: f64,
    pub analysis_years: u32,
    pub payment: PaymentTerms,
}

impl Default for BudgetDomain {
    fn default() -> Self {
        Self {
            equipment_cost: 0.0,
            materials_cost: 0.0,
            labor_cost: 0.0,
            markup_percent: 0.0,
            discount_rate_percent: 8.0,
            analysis_years: 25,
            payment: PaymentTerms::default(),
        }
    }
}

impl BudgetDomain {
    /// Equipment, materials and labor with the markup applied.
    pub fn total_investment(&self) -> f64 {
        let base = self.equipment_cost + self.materials_cost + self.labor_cost;
        base * (1.0 + self.markup_percent / 100.0)
    }
}

// ============================================================================
// Session aggregate
// ============================================================================

/// The persisted dimensioning session.
///
/// Mutated only through `DimensioningState`; readers get immutable views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensioningSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub current_step: Step,
    #[serde(default)]
    pub completed_steps: BTreeSet<Step>,
    #[serde(default)]
    pub is_dirty: bool,
    /// Mirrors the coordinator's in-flight save; never persisted.
    #[serde(skip)]
    pub is_saving: bool,
    /// Incremented on every mutation.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub customer: CustomerDomain,
    #[serde(default)]
    pub energy: EnergyDomain,
    #[serde(default)]
    pub location: LocationDomain,
    #[serde(default)]
    pub system: SystemDomain,
    #[serde(default)]
    pub roof: RoofDomain,
    #[serde(default)]
    pub budget: BudgetDomain,
    #[serde(default)]
    pub results: Option<DimensioningResults>,
}

impl Default for DimensioningSession {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            current_step: Step::FIRST,
            completed_steps: BTreeSet::new(),
            is_dirty: false,
            is_saving: false,
            revision: 0,
            created_at: None,
            updated_at: None,
            customer: CustomerDomain::default(),
            energy: EnergyDomain::default(),
            location: LocationDomain::default(),
            system: SystemDomain::default(),
            roof: RoofDomain::default(),
            budget: BudgetDomain::default(),
            results: None,
        }
    }
}

impl DimensioningSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tariff_group(&self) -> TariffGroup {
        self.customer.tariff_group
    }

    pub fn is_step_completed(&self, step: Step) -> bool {
        self.completed_steps.contains(&step)
    }
}
