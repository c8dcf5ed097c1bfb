use crate::{
    core::{
        error::PlanError,
        unit::{FuelConditions, GenerationUnit, PlantKind},
    },
    prelude::*,
    quantity::{carbon::EmissionIntensity, power::Megawatts, rate::MegawattHourRate},
};

/// Derives the marginal cost and the available power of a unit under the current conditions.
#[derive(Copy, Clone, Debug)]
pub struct CostModel {
    pub emission_intensity: EmissionIntensity,
}

impl Default for CostModel {
    fn default() -> Self {
        Self { emission_intensity: EmissionIntensity::GAS }
    }
}

/// Unit paired with the figures the allocation works with.
#[derive(Copy, Clone, Debug)]
pub struct CostedUnit<'a> {
    pub unit: &'a GenerationUnit,

    /// Cost of one megawatt-hour of output.
    pub cost: MegawattHourRate,

    /// Maximum output available right now.
    pub capacity: Megawatts,

    /// Output the unit may not go below while running.
    ///
    /// Wind is curtailable, so its floor is always zero.
    pub floor: Megawatts,
}

impl CostedUnit<'_> {
    /// Whether there exists a non-zero output within the envelope.
    ///
    /// A wind park at low availability may end up with less capacity than its nominal minimum,
    /// and a thermal unit in that situation cannot be run at all.
    pub fn can_run(&self) -> bool {
        self.capacity > Megawatts::ZERO && self.capacity >= self.floor
    }
}

impl CostModel {
    pub const fn new(emission_intensity: EmissionIntensity) -> Self {
        Self { emission_intensity }
    }

    pub fn cost<'a>(
        &self,
        unit: &'a GenerationUnit,
        fuels: &FuelConditions,
    ) -> Result<CostedUnit<'a>, PlanError> {
        if !(unit.efficiency.is_finite() && unit.efficiency > 0.0) {
            return Err(PlanError::computation(format!(
                "`{}` has non-positive efficiency {}",
                unit.name, unit.efficiency,
            )));
        }

        let costed = match unit.kind {
            PlantKind::WindTurbine => CostedUnit {
                unit,
                cost: MegawattHourRate::ZERO,
                capacity: unit.max_power * fuels.wind_availability.to_ratio(),
                floor: Megawatts::ZERO,
            },
            PlantKind::Turbojet => CostedUnit {
                unit,
                cost: fuels.kerosene_price / unit.efficiency,
                capacity: unit.max_power,
                floor: unit.min_power,
            },
            PlantKind::GasFired => {
                let carbon = fuels.carbon_price * self.emission_intensity;
                CostedUnit {
                    unit,
                    cost: fuels.gas_price / unit.efficiency + carbon / unit.efficiency,
                    capacity: unit.max_power,
                    floor: unit.min_power,
                }
            }
        };

        if !costed.cost.is_finite() || !costed.capacity.is_finite() {
            return Err(PlanError::computation(format!(
                "`{}` ends up with cost {:?} and capacity {:?}",
                unit.name, costed.cost, costed.capacity,
            )));
        }
        trace!(name = %unit.name, cost = %costed.cost, capacity = %costed.capacity, "costed");
        Ok(costed)
    }
}
