use std::collections::HashMap;

use okr_common::{LifeDomain, Wheel, WheelType};

/// Lookup tables from life domain to wheel, built from `/wheels` and
/// `/life-domains`. Either list may still be loading (empty), in which case
/// the index is not ready and wheel-dependent filters stay inactive.
#[derive(Debug, Clone, Default)]
pub struct WheelIndex {
    wheel_type_by_id: HashMap<i64, WheelType>,
    wheel_id_by_key: HashMap<String, i64>,
    wheel_id_by_domain: HashMap<i64, i64>,
}

impl WheelIndex {
    pub fn new(wheels: &[Wheel], domains: &[LifeDomain]) -> Self {
        let mut index = Self::default();
        for wheel in wheels {
            index.wheel_id_by_key.insert(wheel.wheel_key.clone(), wheel.id);
            if let Some(wheel_type) = WheelType::from_wheel_key(&wheel.wheel_key) {
                index.wheel_type_by_id.insert(wheel.id, wheel_type);
            }
        }
        for domain in domains {
            if let Some(wheel_id) = domain.wheel_id {
                index.wheel_id_by_domain.insert(domain.id, wheel_id);
            }
        }
        index
    }

    /// Both the wheel list and the domain → wheel mapping are populated.
    pub fn is_ready(&self) -> bool {
        !self.wheel_id_by_key.is_empty() && !self.wheel_id_by_domain.is_empty()
    }

    pub fn wheel_of_domain(&self, life_domain_id: i64) -> Option<i64> {
        self.wheel_id_by_domain.get(&life_domain_id).copied()
    }

    /// `None` for unmapped domains and for wheels outside WIP accounting.
    pub fn wheel_type_of_domain(&self, life_domain_id: i64) -> Option<WheelType> {
        let wheel_id = self.wheel_of_domain(life_domain_id)?;
        self.wheel_type_by_id.get(&wheel_id).copied()
    }

    pub fn wheel_id_for_key(&self, wheel_key: &str) -> Option<i64> {
        self.wheel_id_by_key.get(wheel_key).copied()
    }
}
