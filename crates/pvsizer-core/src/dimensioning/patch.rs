//! Partial updates for the editable session domains.
//!
//! Every patch field is optional; `None` leaves the current value untouched.
//! Fields that are nullable in the domain take `Option<Option<T>>`:
//! `Some(None)` clears the value, `Some(Some(v))` sets it.

use super::model::{
    BudgetDomain, ClientRef, CustomerDomain, DimensioningSession, DomainKind, EnergyDomain,
    GroupABill, GroupBBill, InverterSelection, LocationDomain, ModuleRef, MonthlySeries,
    MountingArea, PaymentTerms, RoofDomain, SystemDomain, SystemLosses, TariffGroup, TariffRates,
};

#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub client: Option<Option<ClientRef>>,
    pub project_name: Option<String>,
    pub tariff_group: Option<TariffGroup>,
    pub subgroup: Option<Option<String>>,
    pub utility: Option<Option<String>>,
    pub region: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

impl CustomerPatch {
    fn apply(self, domain: &mut CustomerDomain) {
        if let Some(client) = self.client {
            domain.client = client;
        }
        if let Some(project_name) = self.project_name {
            domain.project_name = project_name;
        }
        if let Some(tariff_group) = self.tariff_group {
            domain.tariff_group = tariff_group;
        }
        if let Some(subgroup) = self.subgroup {
            domain.subgroup = subgroup;
        }
        if let Some(utility) = self.utility {
            domain.utility = utility;
        }
        if let Some(region) = self.region {
            domain.region = region;
        }
        if let Some(address) = self.address {
            domain.address = address;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnergyPatch {
    pub group_a_bills: Option<Vec<GroupABill>>,
    pub group_b_bills: Option<Vec<GroupBBill>>,
    pub tariffs: Option<TariffRates>,
}

impl EnergyPatch {
    fn apply(self, domain: &mut EnergyDomain) {
        if let Some(bills) = self.group_a_bills {
            domain.group_a_bills = bills;
        }
        if let Some(bills) = self.group_b_bills {
            domain.group_b_bills = bills;
        }
        if let Some(tariffs) = self.tariffs {
            domain.tariffs = tariffs;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocationPatch {
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub irradiance: Option<Vec<f64>>,
    pub tilt_deg: Option<f64>,
    pub azimuth_deg: Option<f64>,
    pub shading: Option<Option<MonthlySeries>>,
}

impl LocationPatch {
    fn apply(self, domain: &mut LocationDomain) {
        if let Some(latitude) = self.latitude {
            domain.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            domain.longitude = longitude;
        }
        if let Some(city) = self.city {
            domain.city = city;
        }
        if let Some(state) = self.state {
            domain.state = state;
        }
        if let Some(irradiance) = self.irradiance {
            domain.irradiance = irradiance;
        }
        if let Some(tilt) = self.tilt_deg {
            domain.tilt_deg = tilt;
        }
        if let Some(azimuth) = self.azimuth_deg {
            domain.azimuth_deg = azimuth;
        }
        if let Some(shading) = self.shading {
            domain.shading = shading;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemPatch {
    pub module: Option<Option<ModuleRef>>,
    pub inverters: Option<Vec<InverterSelection>>,
    pub module_count: Option<u32>,
    pub losses: Option<SystemLosses>,
}

impl SystemPatch {
    fn apply(self, domain: &mut SystemDomain) {
        if let Some(module) = self.module {
            domain.module = module;
        }
        if let Some(inverters) = self.inverters {
            domain.inverters = inverters;
        }
        if let Some(count) = self.module_count {
            domain.module_count = count;
        }
        if let Some(losses) = self.losses {
            domain.losses = losses;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoofPatch {
    pub areas: Option<Vec<MountingArea>>,
    pub mounting_type: Option<Option<String>>,
}

impl RoofPatch {
    fn apply(self, domain: &mut RoofDomain) {
        if let Some(areas) = self.areas {
            domain.areas = areas;
        }
        if let Some(mounting_type) = self.mounting_type {
            domain.mounting_type = mounting_type;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub equipment_cost: Option<f64>,
    pub materials_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub markup_percent: Option<f64>,
    pub discount_rate_percent: Option<f64>,
    pub analysis_years: Option<u32>,
    pub payment: Option<PaymentTerms>,
}

impl BudgetPatch {
    fn apply(self, domain: &mut BudgetDomain) {
        if let Some(v) = self.equipment_cost {
            domain.equipment_cost = v;
        }
        if let Some(v) = self.materials_cost {
            domain.materials_cost = v;
        }
        if let Some(v) = self.labor_cost {
            domain.labor_cost = v;
        }
        if let Some(v) = self.markup_percent {
            domain.markup_percent = v;
        }
        if let Some(v) = self.discount_rate_percent {
            domain.discount_rate_percent = v;
        }
        if let Some(v) = self.analysis_years {
            domain.analysis_years = v;
        }
        if let Some(payment) = self.payment {
            domain.payment = payment;
        }
    }
}

/// A partial update addressed to exactly one domain.
///
/// Results are absent on purpose: they are written whole through
/// `DimensioningState::set_results`.
#[derive(Debug, Clone)]
pub enum DomainPatch {
    Customer(CustomerPatch),
    Energy(EnergyPatch),
    Location(LocationPatch),
    System(SystemPatch),
    Roof(RoofPatch),
    Budget(BudgetPatch),
}

impl DomainPatch {
    pub fn kind(&self) -> DomainKind {
        match self {
            DomainPatch::Customer(_) => DomainKind::Customer,
            DomainPatch::Energy(_) => DomainKind::Energy,
            DomainPatch::Location(_) => DomainKind::Location,
            DomainPatch::System(_) => DomainKind::System,
            DomainPatch::Roof(_) => DomainKind::Roof,
            DomainPatch::Budget(_) => DomainKind::Budget,
        }
    }

    pub(crate) fn apply_to(self, session: &mut DimensioningSession) {
        match self {
            DomainPatch::Customer(p) => p.apply(&mut session.customer),
            DomainPatch::Energy(p) => p.apply(&mut session.energy),
            DomainPatch::Location(p) => p.apply(&mut session.location),
            DomainPatch::System(p) => p.apply(&mut session.system),
            DomainPatch::Roof(p) => p.apply(&mut session.roof),
            DomainPatch::Budget(p) => p.apply(&mut session.budget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut session = DimensioningSession::new();
        session.budget.labor_cost = 4_000.0;

        DomainPatch::Budget(BudgetPatch {
            equipment_cost: Some(30_000.0),
            ..BudgetPatch::default()
        })
        .apply_to(&mut session);

        assert_eq!(session.budget.equipment_cost, 30_000.0);
        assert_eq!(session.budget.labor_cost, 4_000.0);
    }

    #[test]
    fn test_nullable_fields_can_be_cleared() {
        let mut session = DimensioningSession::new();
        DomainPatch::System(SystemPatch {
            module: Some(Some(ModuleRef {
                id: "mod-550".into(),
                manufacturer: "Acme Solar".into(),
                model: "AS-550".into(),
                power_w: 550.0,
            })),
            module_count: Some(10),
            ..SystemPatch::default()
        })
        .apply_to(&mut session);
        assert!(session.system.module.is_some());

        DomainPatch::System(SystemPatch {
            module: Some(None),
            ..SystemPatch::default()
        })
        .apply_to(&mut session);
        assert!(session.system.module.is_none());
        assert_eq!(session.system.module_count, 10);

        session.customer.subgroup = Some("B1".into());
        session.customer.client = Some(ClientRef {
            id: "c-1".into(),
            name: "Maria".into(),
            email: None,
        });
        DomainPatch::Customer(CustomerPatch {
            client: Some(None),
            ..CustomerPatch::default()
        })
        .apply_to(&mut session);
        assert!(session.customer.client.is_none());
        assert_eq!(session.customer.subgroup.as_deref(), Some("B1"));

        session.location.shading = Some([1.0; 12]);
        DomainPatch::Location(LocationPatch {
            shading: Some(None),
            ..LocationPatch::default()
        })
        .apply_to(&mut session);
        assert!(session.location.shading.is_none());
    }

    #[test]
    fn test_patch_kind_matches_domain() {
        let patch = DomainPatch::Location(LocationPatch::default());
        assert_eq!(patch.kind(), DomainKind::Location);
        assert_eq!(patch.kind().owning_step().number(), 3);
    }
}
