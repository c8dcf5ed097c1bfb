//! Wire format of the production plan request and response.

use std::collections::HashSet;

use serde::Deserialize;

use crate::{
    core::{
        FuelConditions,
        GenerationUnit,
        PlanError,
        PlanRequest,
        PlantKind,
        allocation::MAX_POWER,
    },
    quantity::{
        carbon::TonneRate,
        percentage::Percentage,
        power::Megawatts,
        rate::MegawattHourRate,
    },
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payload {
    pub load: f64,
    pub fuels: Fuels,
    pub powerplants: Vec<PowerPlant>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fuels {
    #[serde(rename = "gas(euro/MWh)")]
    pub gas: f64,

    #[serde(rename = "kerosine(euro/MWh)")]
    pub kerosine: f64,

    #[serde(rename = "co2(euro/ton)")]
    pub co2: f64,

    #[serde(rename = "wind(%)")]
    pub wind: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerPlant {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: PlantKind,

    pub efficiency: f64,
    pub pmin: f64,
    pub pmax: f64,
}

impl Payload {
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        serde_json::from_str(json).map_err(|error| PlanError::invalid(error.to_string()))
    }
}

impl TryFrom<Payload> for PlanRequest {
    type Error = PlanError;

    fn try_from(payload: Payload) -> Result<Self, Self::Error> {
        if !(payload.load.is_finite() && payload.load > 0.0) {
            return Err(PlanError::invalid(format!("load must be positive, got {}", payload.load)));
        }
        if payload.load > MAX_POWER.0.0 {
            return Err(PlanError::invalid(format!("load must not exceed {MAX_POWER}")));
        }
        if payload.powerplants.is_empty() {
            return Err(PlanError::invalid("there must be at least one power plant"));
        }

        let fuels = payload.fuels;
        for (name, price) in [("gas", fuels.gas), ("kerosine", fuels.kerosine), ("co2", fuels.co2)] {
            if !(price.is_finite() && price >= 0.0) {
                return Err(PlanError::invalid(format!("{name} price must be non-negative")));
            }
        }
        if !(0.0..=100.0).contains(&fuels.wind) {
            return Err(PlanError::invalid(format!("wind must be within 0-100%, got {}", fuels.wind)));
        }

        let mut names = HashSet::with_capacity(payload.powerplants.len());
        let units = payload
            .powerplants
            .into_iter()
            .map(|plant| {
                plant.validate()?;
                if !names.insert(plant.name.clone()) {
                    return Err(PlanError::invalid(format!("`{}` is listed twice", plant.name)));
                }
                Ok(GenerationUnit::from(plant))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            load: Megawatts::from(payload.load),
            fuels: FuelConditions::builder()
                .gas_price(MegawattHourRate::from(fuels.gas))
                .kerosene_price(MegawattHourRate::from(fuels.kerosine))
                .carbon_price(TonneRate::from(fuels.co2))
                .wind_availability(Percentage::from(fuels.wind))
                .build(),
            units,
        })
    }
}

impl PowerPlant {
    fn validate(&self) -> Result<(), PlanError> {
        if self.name.trim().is_empty() {
            return Err(PlanError::invalid("power plant name must not be empty"));
        }
        if !(self.efficiency > 0.0 && self.efficiency <= 1.0) {
            return Err(PlanError::invalid(format!(
                "{}: efficiency must be within (0, 1], got {}",
                self.name, self.efficiency,
            )));
        }
        if !(self.pmin.is_finite() && self.pmin >= 0.0) {
            return Err(PlanError::invalid(format!("{}: pmin must be non-negative", self.name)));
        }
        if !(self.pmax.is_finite() && self.pmax <= MAX_POWER.0.0) {
            return Err(PlanError::invalid(format!(
                "{}: pmax must not exceed {MAX_POWER}",
                self.name,
            )));
        }
        if self.pmin > self.pmax {
            return Err(PlanError::invalid(format!(
                "{}: pmin must be less than or equal to pmax",
                self.name,
            )));
        }
        Ok(())
    }
}

impl From<PowerPlant> for GenerationUnit {
    fn from(plant: PowerPlant) -> Self {
        Self::builder()
            .name(plant.name)
            .kind(plant.kind)
            .efficiency(plant.efficiency)
            .min_power(Megawatts::from(plant.pmin))
            .max_power(Megawatts::from(plant.pmax))
            .build()
    }
}
