use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use ordered_float::OrderedFloat;

use crate::quantity::{Quantity, rate::MegawattHourRate};

/// Euro per tonne of CO₂.
pub type TonneRate = Quantity<0, 0, -1, 1>;

/// Tonnes of CO₂ emitted per megawatt-hour of burned fuel.
pub type EmissionIntensity = Quantity<-1, -1, 1, 0>;

impl EmissionIntensity {
    /// Shared by all gas-fired units unless configured otherwise.
    pub const GAS: Self = Self(OrderedFloat(0.3));
}

impl Mul<EmissionIntensity> for TonneRate {
    type Output = MegawattHourRate;

    fn mul(self, rhs: EmissionIntensity) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}

impl Display for TonneRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} €/t", self.0)
    }
}

impl Debug for TonneRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}€/t", self.0)
    }
}

impl Display for EmissionIntensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} t/MWh", self.0)
    }
}

impl Debug for EmissionIntensity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}t/MWh", self.0)
    }
}
