use std::fmt::{Debug, Display, Formatter};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(
    Copy,
    Clone,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::FromStr,
)]
#[from(f64, OrderedFloat<f64>)]
#[serde(transparent)]
pub struct Percentage(pub OrderedFloat<f64>);

impl Percentage {
    pub const HUNDRED: Self = Self(OrderedFloat(100.0));

    /// Convert the percentage into `0.0..=1.0`.
    pub const fn to_ratio(self) -> f64 {
        0.01 * self.0.0
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Debug for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
