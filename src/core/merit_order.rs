use std::cmp::Reverse;

use itertools::Itertools;

use crate::core::cost_model::CostedUnit;

/// Order the units from the cheapest to the most expensive.
///
/// Equally priced units are ordered by descending available capacity, so that fewer of them
/// need to run. Complete ties keep the input order.
pub fn rank<'a>(units: impl IntoIterator<Item = CostedUnit<'a>>) -> Vec<CostedUnit<'a>> {
    units.into_iter().sorted_by_key(|unit| (unit.cost, Reverse(unit.capacity))).collect()
}
