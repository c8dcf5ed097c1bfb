use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::HourlyCost, rate::MegawattHourRate};

pub type Megawatts = Quantity<1, 0, 0, 0>;

impl Display for Megawatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} MW", self.0)
    }
}

impl Debug for Megawatts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}MW", self.0)
    }
}

impl Mul<MegawattHourRate> for Megawatts {
    type Output = HourlyCost;

    fn mul(self, rhs: MegawattHourRate) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}
