use std::fmt::{Display, Formatter};

use bon::Builder;
use comfy_table::Color;
use serde::{Deserialize, Serialize};

use crate::quantity::{
    carbon::TonneRate,
    percentage::Percentage,
    power::Megawatts,
    rate::MegawattHourRate,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantKind {
    /// Combined-cycle gas turbine, pays for gas and for the emitted CO₂.
    GasFired,

    /// Single-cycle kerosene turbine.
    Turbojet,

    /// Free to run, but capped by the wind availability and curtailable down to zero.
    WindTurbine,
}

impl Display for PlantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GasFired => write!(f, "Gas-fired"),
            Self::Turbojet => write!(f, "Turbojet"),
            Self::WindTurbine => write!(f, "Wind turbine"),
        }
    }
}

impl PlantKind {
    pub const fn color(self) -> Color {
        match self {
            Self::GasFired => Color::DarkYellow,
            Self::Turbojet => Color::Red,
            Self::WindTurbine => Color::Green,
        }
    }
}

/// Single power plant as described in a request.
#[derive(Clone, Debug, Builder)]
pub struct GenerationUnit {
    #[builder(into)]
    pub name: String,

    pub kind: PlantKind,

    /// Share of the fuel energy converted into electricity, `(0, 1]`.
    #[builder(default = 1.0)]
    pub efficiency: f64,

    #[builder(default = Megawatts::ZERO)]
    pub min_power: Megawatts,

    pub max_power: Megawatts,
}

/// Market conditions for the hour being planned.
#[derive(Copy, Clone, Debug, Builder)]
pub struct FuelConditions {
    pub gas_price: MegawattHourRate,
    pub kerosene_price: MegawattHourRate,
    pub carbon_price: TonneRate,

    #[builder(default = Percentage::HUNDRED)]
    pub wind_availability: Percentage,
}
