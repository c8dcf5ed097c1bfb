use bon::Builder;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{cost_model::CostedUnit, error::PlanError, unit::PlantKind},
    prelude::*,
    quantity::{Quantity, cost::HourlyCost, power::Megawatts, rate::MegawattHourRate},
};

/// Allowed mismatch between the requested load and the planned production.
pub const TOLERANCE: Megawatts = Quantity(OrderedFloat(0.1));

/// Largest load or capacity which still fits into the tenths used for rounding.
pub const MAX_POWER: Megawatts = Quantity(OrderedFloat(1e12));

/// Anything below this is numerical noise.
const EPSILON: Megawatts = Quantity(OrderedFloat(1e-9));

/// Units with a minimum output, above which the commitment search gives up.
const MAX_SEARCHED_UNITS: usize = 16;

/// Planned output of a single unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    pub name: String,

    #[serde(rename = "p")]
    pub power: Megawatts,

    #[serde(skip)]
    pub kind: PlantKind,

    #[serde(skip)]
    pub cost: MegawattHourRate,
}

/// Splits the load over units which are already ranked in the merit order.
#[derive(Builder)]
pub struct AllocationEngine<'a> {
    units: &'a [CostedUnit<'a>],
    load: Megawatts,

    #[builder(default = TOLERANCE)]
    tolerance: Megawatts,
}

impl AllocationEngine<'_> {
    /// Allocate the load.
    ///
    /// 1. Greedily fill the units in the merit order.
    /// 2. Repair the marginal unit if it ended up below its minimum output.
    /// 3. If the repair missed the load, search for the cheapest set of units to commit.
    /// 4. Round to tenths of a megawatt while keeping the total.
    ///
    /// The returned allocations follow the order of the units.
    #[instrument(skip_all, fields(load = %self.load, n_units = self.units.len()))]
    pub fn run(&self) -> Result<Vec<Allocation>, PlanError> {
        if !(self.load.is_finite() && self.load > Megawatts::ZERO && self.load <= MAX_POWER) {
            return Err(PlanError::invalid(format!(
                "load must be within (0, {MAX_POWER}], got {:?}",
                self.load,
            )));
        }
        if let Some(unit) =
            self.units.iter().find(|unit| unit.capacity > MAX_POWER || unit.floor > MAX_POWER)
        {
            return Err(PlanError::invalid(format!(
                "`{}` cannot produce more than {MAX_POWER}",
                unit.unit.name,
            )));
        }
        if self.units.is_empty() {
            return Err(PlanError::infeasible(self.load, "there are no units"));
        }

        let mut dispatch = Dispatch::new(self.units);
        let remaining = dispatch.fill(self.load);
        debug!(%remaining, "filled");
        dispatch.reconcile();
        dispatch.tighten();

        if (self.load - dispatch.total()).abs() > self.tolerance
            && let Some(committed) = Dispatch::search(self.units, self.load, self.tolerance)
        {
            debug!(total = %committed.total(), "committed by the search");
            dispatch = committed;
        }

        let total = dispatch.total();
        if (self.load - total).abs() > self.tolerance {
            let available: Megawatts = self
                .units
                .iter()
                .filter(|unit| unit.can_run())
                .map(|unit| unit.capacity)
                .sum();
            let reason = if available < self.load - self.tolerance {
                format!("only {available} is available")
            } else {
                format!("minimum outputs cannot be met, only {total} could be planned")
            };
            return Err(PlanError::infeasible(self.load, reason));
        }

        self.round(&dispatch)
    }

    /// Round each output to tenths and spread the rounding error over the units.
    fn round(&self, dispatch: &Dispatch) -> Result<Vec<Allocation>, PlanError> {
        let mut tenths = Vec::with_capacity(self.units.len());
        let mut bounds = Vec::with_capacity(self.units.len());
        for (unit, power) in self.units.iter().zip(&dispatch.power) {
            let (low, high) = (ceil_tenths(unit.floor), floor_tenths(unit.capacity));
            let power = to_tenths(*power);
            if power > 0 && low > high {
                return Err(PlanError::computation(format!(
                    "`{}` has no output in tenths between {} and {}",
                    unit.unit.name, unit.floor, unit.capacity,
                )));
            }
            tenths.push(if power > 0 { power.clamp(low, high) } else { 0 });
            bounds.push((low, high));
        }

        let mut residual = tenths
            .iter()
            .try_fold(0_i64, |sum, &power| sum.checked_add(power))
            .and_then(|planned| to_tenths(self.load).checked_sub(planned))
            .ok_or_else(|| PlanError::computation("the plan does not fit into tenths"))?;
        if residual > 0 {
            // Give the missing tenths to the cheapest units first:
            for (index, (power, (low, high))) in tenths.iter_mut().zip(&bounds).enumerate() {
                let is_available = *power > 0 || (*low == 0 && dispatch.is_available(index));
                if is_available && *high > *power {
                    let delta = residual.min(*high - *power);
                    *power += delta;
                    residual -= delta;
                }
                if residual == 0 {
                    break;
                }
            }
        } else if residual < 0 {
            // Take the excess tenths from the most expensive units first:
            for (power, (low, _)) in tenths.iter_mut().zip(&bounds).rev() {
                if *power > *low {
                    let delta = (-residual).min(*power - *low);
                    *power -= delta;
                    residual += delta;
                }
                if residual == 0 {
                    break;
                }
            }
        }

        let allocations: Vec<Allocation> = self
            .units
            .iter()
            .zip(tenths)
            .map(|(unit, power)| Allocation {
                name: unit.unit.name.clone(),
                power: from_tenths(power),
                kind: unit.unit.kind,
                cost: unit.cost,
            })
            .collect();

        let total: Megawatts = allocations.iter().map(|allocation| allocation.power).sum();
        if (self.load - total).abs() > self.tolerance + EPSILON {
            return Err(PlanError::computation(format!(
                "rounding drifted the total to {total:?}, requested {:?}",
                self.load,
            )));
        }
        Ok(allocations)
    }
}

/// Working state of the allocation: the output of each ranked unit.
struct Dispatch<'a> {
    units: &'a [CostedUnit<'a>],
    power: Vec<Megawatts>,

    /// Units which must stay switched off.
    dropped: Vec<bool>,
}

impl<'a> Dispatch<'a> {
    fn new(units: &'a [CostedUnit<'a>]) -> Self {
        Self {
            units,
            power: vec![Megawatts::ZERO; units.len()],
            dropped: units.iter().map(|unit| !unit.can_run()).collect(),
        }
    }

    fn total(&self) -> Megawatts {
        self.power.iter().copied().sum()
    }

    fn cost(&self) -> HourlyCost {
        self.units.iter().zip(&self.power).map(|(unit, power)| *power * unit.cost).sum()
    }

    fn is_running(&self, index: usize) -> bool {
        self.power[index] > EPSILON
    }

    fn is_available(&self, index: usize) -> bool {
        !self.dropped[index]
    }

    /// Power the unit could still produce, ignoring its minimum.
    fn room(&self, index: usize) -> Megawatts {
        if self.dropped[index] {
            Megawatts::ZERO
        } else {
            (self.units[index].capacity - self.power[index]).max(Megawatts::ZERO)
        }
    }

    /// Power the unit can take on top without leaving its envelope.
    fn headroom(&self, index: usize) -> Megawatts {
        if self.is_running(index) || self.units[index].floor <= EPSILON {
            self.room(index)
        } else {
            Megawatts::ZERO
        }
    }

    /// Power the unit can give away while staying at or above its minimum.
    fn slack(&self, index: usize) -> Megawatts {
        if self.is_running(index) {
            (self.power[index] - self.units[index].floor).max(Megawatts::ZERO)
        } else {
            Megawatts::ZERO
        }
    }

    /// Walk the units in the merit order, loading each one as much as possible.
    ///
    /// Returns the power which could not be placed.
    fn fill(&mut self, mut remaining: Megawatts) -> Megawatts {
        for index in 0..self.units.len() {
            if remaining <= EPSILON {
                break;
            }
            let take = remaining.min(self.room(index));
            if take > EPSILON {
                self.power[index] += take;
                remaining -= take;
            }
        }
        remaining
    }

    /// Running unit which produces less than its minimum.
    fn violation(&self) -> Option<usize> {
        (0..self.units.len()).find(|&index| {
            self.is_running(index) && self.power[index] < self.units[index].floor - EPSILON
        })
    }

    /// Repair minimum output violations until there are none left.
    ///
    /// Every iteration either clears the violation, or drops a unit for good,
    /// so this takes at most twice as many iterations as there are units.
    fn reconcile(&mut self) {
        let units = self.units;
        while let Some(marginal) = self.violation() {
            let name = &units[marginal].unit.name;
            if self.absorb(marginal) {
                debug!(%name, "absorbed by cheaper units");
            } else if self.force_minimum(marginal) {
                debug!(%name, power = %self.power[marginal], "forced to minimum");
            } else {
                let remaining = self.drop_and_refill(marginal);
                debug!(%name, %remaining, "dropped");
            }
        }
    }

    /// Move the output of the marginal unit to cheaper running units and switch it off.
    fn absorb(&mut self, marginal: usize) -> bool {
        let carried = self.power[marginal];
        let headroom: Megawatts = (0..marginal).map(|index| self.headroom(index)).sum();
        if headroom < carried - EPSILON {
            return false;
        }
        let mut remaining = carried;
        for index in (0..marginal).rev() {
            if remaining <= EPSILON {
                break;
            }
            let raise = remaining.min(self.headroom(index));
            self.power[index] += raise;
            remaining -= raise;
        }
        self.power[marginal] = Megawatts::ZERO;
        true
    }

    /// Run the marginal unit at its minimum and release the excess from the other units.
    ///
    /// The other running units are visited from the most expensive one. A unit which can cover
    /// the rest of the excess gets shaved. Otherwise, it is switched off when the marginal unit
    /// can take over its whole output, and shaved down to its own minimum when it cannot.
    fn force_minimum(&mut self, marginal: usize) -> bool {
        let unit = &self.units[marginal];
        let carried = self.power[marginal];
        let needed = unit.floor - carried;
        let allowed = unit.capacity - carried;

        let mut power = self.power.clone();
        let mut released = Megawatts::ZERO;

        for index in (0..self.units.len()).rev().filter(|&index| index != marginal) {
            let missing = needed - released;
            if missing <= EPSILON {
                break;
            }
            if power[index] <= EPSILON {
                continue;
            }
            let slack = (power[index] - self.units[index].floor).max(Megawatts::ZERO);
            if slack >= missing {
                power[index] -= missing;
                released += missing;
            } else if released + power[index] <= allowed + EPSILON {
                released += power[index];
                power[index] = Megawatts::ZERO;
            } else {
                power[index] -= slack;
                released += slack;
            }
        }

        if released < needed - EPSILON {
            return false;
        }
        power[marginal] = carried + released;
        self.power = power;
        true
    }

    /// Try every set of units with a minimum output, and keep the cheapest one meeting the load.
    ///
    /// Units without a minimum are always available. Each set runs its units at their minimum
    /// and fills the rest of the load in the merit order.
    fn search(units: &'a [CostedUnit<'a>], load: Megawatts, tolerance: Megawatts) -> Option<Self> {
        let candidates: Vec<usize> = (0..units.len())
            .filter(|&index| units[index].can_run() && units[index].floor > EPSILON)
            .collect();
        if candidates.len() > MAX_SEARCHED_UNITS {
            warn!(n_candidates = candidates.len(), "too many units to search through");
            return None;
        }

        let mut best: Option<(HourlyCost, Self)> = None;
        for mask in 0..(1_u32 << candidates.len()) {
            let mut dispatch = Self::new(units);
            for (bit, &index) in candidates.iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    dispatch.dropped[index] = true;
                } else {
                    dispatch.power[index] = units[index].floor;
                }
            }
            let committed = dispatch.total();
            if committed > load + EPSILON || dispatch.fill(load - committed) > tolerance {
                continue;
            }
            let cost = dispatch.cost();
            if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                best = Some((cost, dispatch));
            }
        }
        best.map(|(_, dispatch)| dispatch)
    }

    /// Switch the marginal unit off for good and place its output elsewhere.
    fn drop_and_refill(&mut self, marginal: usize) -> Megawatts {
        let carried = self.power[marginal];
        self.power[marginal] = Megawatts::ZERO;
        self.dropped[marginal] = true;
        self.fill(carried)
    }

    /// Shift output from more expensive units to cheaper ones with headroom.
    ///
    /// Afterwards, for any two running units, either the cheaper one is at its capacity,
    /// or the more expensive one is at its minimum.
    fn tighten(&mut self) {
        for cheaper in 0..self.units.len() {
            for pricier in (cheaper + 1..self.units.len()).rev() {
                if self.units[pricier].cost <= self.units[cheaper].cost {
                    continue;
                }
                let shift = self.headroom(cheaper).min(self.slack(pricier));
                if shift > EPSILON {
                    self.power[cheaper] += shift;
                    self.power[pricier] -= shift;
                }
            }
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn to_tenths(power: Megawatts) -> i64 {
    (power.0.0 * 10.0).round() as i64
}

#[expect(clippy::cast_possible_truncation)]
fn ceil_tenths(power: Megawatts) -> i64 {
    (power.0.0 * 10.0 - 1e-6).ceil().max(0.0) as i64
}

#[expect(clippy::cast_possible_truncation)]
fn floor_tenths(power: Megawatts) -> i64 {
    (power.0.0 * 10.0 + 1e-6).floor() as i64
}

#[expect(clippy::cast_precision_loss)]
fn from_tenths(tenths: i64) -> Megawatts {
    Megawatts::from(tenths as f64 / 10.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use itertools::iproduct;

    use super::*;
    use crate::core::unit::GenerationUnit;

    fn plant(name: &str) -> GenerationUnit {
        GenerationUnit::builder()
            .name(name)
            .kind(PlantKind::GasFired)
            .max_power(Megawatts::from(1000.0))
            .build()
    }

    fn costed(unit: &GenerationUnit, cost: f64, floor: f64, capacity: f64) -> CostedUnit<'_> {
        CostedUnit {
            unit,
            cost: MegawattHourRate::from(cost),
            capacity: Megawatts::from(capacity),
            floor: Megawatts::from(floor),
        }
    }

    fn allocate(units: &[CostedUnit<'_>], load: f64) -> Result<Vec<f64>, PlanError> {
        let allocations =
            AllocationEngine::builder().units(units).load(Megawatts::from(load)).build().run()?;
        assert_valid(units, &allocations, load);
        Ok(allocations.into_iter().map(|allocation| allocation.power.0.0).collect())
    }

    /// Check the total, the envelopes, and the merit order.
    fn assert_valid(units: &[CostedUnit<'_>], allocations: &[Allocation], load: f64) {
        let total: f64 = allocations.iter().map(|allocation| allocation.power.0.0).sum();
        assert!((total - load).abs() <= 0.1 + 1e-6, "total {total} vs load {load}");

        for (unit, allocation) in units.iter().zip(allocations) {
            assert_eq!(unit.unit.name, allocation.name);
            let power = allocation.power.0.0;
            assert!(
                power == 0.0
                    || (unit.floor.0.0 - 1e-6 <= power && power <= unit.capacity.0.0 + 1e-6),
                "{} is outside of its envelope: {power}",
                allocation.name,
            );
        }

        for (i, (cheaper, cheaper_allocation)) in units.iter().zip(allocations).enumerate() {
            for (pricier, pricier_allocation) in units.iter().zip(allocations).skip(i + 1) {
                if cheaper.cost < pricier.cost
                    && cheaper_allocation.power.0.0 > 0.0
                    && pricier_allocation.power.0.0 > 0.0
                {
                    assert!(
                        cheaper_allocation.power.0.0 >= cheaper.capacity.0.0 - 0.1 - 1e-6
                            || pricier_allocation.power.0.0 <= pricier.floor.0.0 + 0.1 + 1e-6,
                        "{} has headroom while {} runs above its minimum",
                        cheaper_allocation.name,
                        pricier_allocation.name,
                    );
                }
            }
        }
    }

    #[test]
    fn test_greedy_fill() {
        let plants = [
            "windpark1",
            "windpark2",
            "gasfiredbig1",
            "gasfiredbig2",
            "gasfiredsomewhatsmaller",
            "tj1",
        ]
        .map(plant);
        let units = [
            costed(&plants[0], 0.0, 0.0, 90.0),
            costed(&plants[1], 0.0, 0.0, 21.6),
            costed(&plants[2], 36.6, 100.0, 460.0),
            costed(&plants[3], 36.6, 100.0, 460.0),
            costed(&plants[4], 52.4, 40.0, 210.0),
            costed(&plants[5], 169.3, 0.0, 16.0),
        ];
        let powers = allocate(&units, 910.0).unwrap();
        assert_eq!(powers, [90.0, 21.6, 460.0, 338.4, 0.0, 0.0]);
    }

    #[test]
    fn test_wind_covers_load() {
        let plants = ["wind", "gas"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 150.0), costed(&plants[1], 30.0, 50.0, 200.0)];
        assert_eq!(allocate(&units, 100.0).unwrap(), [100.0, 0.0]);
    }

    #[test]
    fn test_everything_at_capacity() {
        let plants = ["wind", "gas", "jet"].map(plant);
        let units = [
            costed(&plants[0], 0.0, 0.0, 90.0),
            costed(&plants[1], 30.0, 100.0, 460.0),
            costed(&plants[2], 160.0, 0.0, 16.0),
        ];
        assert_eq!(allocate(&units, 566.0).unwrap(), [90.0, 460.0, 16.0]);
    }

    #[test]
    fn test_force_minimum_shaves_cheaper_unit() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 50.0, 100.0), costed(&plants[1], 20.0, 80.0, 200.0)];
        assert_eq!(allocate(&units, 150.0).unwrap(), [70.0, 80.0]);
    }

    #[test]
    fn test_force_minimum_shaves_most_expensive_first() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 10.0, 10.0, 100.0),
            costed(&plants[1], 20.0, 10.0, 100.0),
            costed(&plants[2], 30.0, 50.0, 100.0),
        ];
        // Greedy gives 100 + 100 + 20, then `c` goes to 50 and `b` gives away the extra 30:
        assert_eq!(allocate(&units, 220.0).unwrap(), [100.0, 70.0, 50.0]);
    }

    #[test]
    fn test_force_minimum_switches_cheaper_unit_off() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 50.0, 100.0), costed(&plants[1], 20.0, 80.0, 200.0)];
        assert_eq!(allocate(&units, 120.0).unwrap(), [0.0, 120.0]);
    }

    #[test]
    fn test_force_minimum_switches_pricier_unit_off_before_shaving_cheaper() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 0.0, 20.0, 30.0),
            costed(&plants[1], 1.0, 20.0, 20.0),
            costed(&plants[2], 2.0, 70.0, 70.0),
        ];
        // Greedy gives 30 + 20 + 50, shaving `a` would leave no room to take over `b`:
        assert_eq!(allocate(&units, 100.0).unwrap(), [30.0, 0.0, 70.0]);
    }

    #[test]
    fn test_search_commits_when_repair_fails() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 0.0, 20.0, 30.0),
            costed(&plants[1], 1.0, 20.0, 20.0),
            costed(&plants[2], 2.0, 70.0, 70.0),
        ];
        let search = Dispatch::search(&units, Megawatts::from(100.0), TOLERANCE).unwrap();
        assert_eq!(search.power, [30.0, 0.0, 70.0].map(Megawatts::from));
        assert!(Dispatch::search(&units, Megawatts::from(10.0), TOLERANCE).is_none());
    }

    #[test]
    fn test_marginal_unit_is_dropped() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 100.0, 200.0), costed(&plants[1], 20.0, 0.0, 100.0)];
        assert_eq!(allocate(&units, 50.0).unwrap(), [0.0, 50.0]);
    }

    #[test]
    fn test_unit_below_its_minimum_capacity_is_skipped() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 100.0, 60.0), costed(&plants[1], 20.0, 0.0, 100.0)];
        assert_eq!(allocate(&units, 50.0).unwrap(), [0.0, 50.0]);
    }

    #[test]
    fn test_load_below_every_minimum_is_infeasible() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 100.0, 200.0), costed(&plants[1], 20.0, 80.0, 100.0)];
        let error = allocate(&units, 50.0).unwrap_err();
        assert!(matches!(error, PlanError::Infeasible { .. }), "{error}");
    }

    #[test]
    fn test_insufficient_capacity_is_infeasible() {
        let plants = ["wind", "gas", "jet"].map(plant);
        let units = [
            costed(&plants[0], 0.0, 0.0, 150.0),
            costed(&plants[1], 35.9, 100.0, 460.0),
            costed(&plants[2], 169.3, 0.0, 200.0),
        ];
        let error = allocate(&units, 910.0).unwrap_err();
        let PlanError::Infeasible { reason, .. } = error else {
            panic!("unexpected error: {error}");
        };
        assert_eq!(reason, "only 810.0 MW is available");
    }

    #[test]
    fn test_wind_only_below_load_is_infeasible() {
        let plants = ["wind"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 50.0)];
        assert!(matches!(allocate(&units, 60.0), Err(PlanError::Infeasible { .. })));
    }

    #[test]
    fn test_no_units_is_infeasible() {
        assert!(matches!(allocate(&[], 60.0), Err(PlanError::Infeasible { .. })));
    }

    #[test]
    fn test_non_positive_load_is_invalid() {
        let plants = ["wind"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 50.0)];
        assert!(matches!(allocate(&units, 0.0), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn test_huge_load_is_invalid() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 1e300), costed(&plants[1], 1.0, 0.0, 1e300)];
        assert!(matches!(allocate(&units, 2e300), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn test_huge_capacity_is_invalid() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 1e300), costed(&plants[1], 1.0, 0.0, 100.0)];
        assert!(matches!(allocate(&units, 50.0), Err(PlanError::InvalidInput(_))));
    }

    #[test]
    fn test_rounding_keeps_capacity_and_total() {
        let plants = ["wind", "gas"].map(plant);
        let units = [costed(&plants[0], 0.0, 0.0, 21.66), costed(&plants[1], 10.0, 0.0, 100.0)];
        // 21.66 would round up past the capacity, so the gas unit takes the extra tenth:
        assert_eq!(allocate(&units, 50.0).unwrap(), [21.6, 28.4]);
    }

    #[test]
    fn test_load_within_tolerance_of_capacity() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 0.0, 0.0, 33.33),
            costed(&plants[1], 0.0, 0.0, 33.33),
            costed(&plants[2], 0.0, 0.0, 33.33),
        ];
        let powers = allocate(&units, 100.0).unwrap();
        assert_abs_diff_eq!(powers.iter().sum::<f64>(), 99.9, epsilon = 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 10.0, 10.0, 100.0),
            costed(&plants[1], 20.0, 10.0, 100.0),
            costed(&plants[2], 30.0, 50.0, 100.0),
        ];
        assert_eq!(allocate(&units, 220.0).unwrap(), allocate(&units, 220.0).unwrap());
    }

    #[test]
    fn test_absorb_into_cheaper_headroom() {
        let plants = ["a", "b", "c"].map(plant);
        let units = [
            costed(&plants[0], 10.0, 10.0, 100.0),
            costed(&plants[1], 20.0, 10.0, 100.0),
            costed(&plants[2], 30.0, 50.0, 100.0),
        ];
        let mut dispatch = Dispatch::new(&units);
        dispatch.power = [60.0, 90.0, 20.0].map(Megawatts::from).to_vec();
        assert_eq!(dispatch.violation(), Some(2));
        assert!(dispatch.absorb(2));
        assert_eq!(dispatch.power, [70.0, 100.0, 0.0].map(Megawatts::from));
        assert_eq!(dispatch.violation(), None);
    }

    #[test]
    fn test_tighten_respects_merit_order() {
        let plants = ["a", "b"].map(plant);
        let units = [costed(&plants[0], 10.0, 10.0, 100.0), costed(&plants[1], 20.0, 30.0, 100.0)];
        let mut dispatch = Dispatch::new(&units);
        dispatch.power = [40.0, 80.0].map(Megawatts::from).to_vec();
        dispatch.tighten();
        assert_eq!(dispatch.power, [90.0, 30.0].map(Megawatts::from));
    }

    /// Whether any set of runnable units can meet the load within their envelopes.
    fn has_feasible_commitment(units: &[CostedUnit<'_>], load: f64) -> bool {
        (0..1_u32 << units.len()).any(|mask| {
            let committed: Vec<_> = units
                .iter()
                .enumerate()
                .filter(|(index, _)| mask & (1 << *index) != 0)
                .map(|(_, unit)| unit)
                .collect();
            committed.iter().all(|unit| unit.can_run())
                && committed.iter().map(|unit| unit.floor.0.0).sum::<f64>() <= load
                && committed.iter().map(|unit| unit.capacity.0.0).sum::<f64>() >= load
        })
    }

    #[test]
    fn test_plans_whenever_feasible() {
        const ENVELOPES: [(f64, f64); 8] = [
            (0.0, 0.0),
            (0.0, 10.0),
            (0.0, 30.0),
            (10.0, 40.0),
            (20.0, 20.0),
            (20.0, 30.0),
            (40.0, 70.0),
            (70.0, 70.0),
        ];
        let plants = ["a", "b", "c"].map(plant);
        for (a, b, c) in iproduct!(ENVELOPES, ENVELOPES, ENVELOPES) {
            let units = [
                costed(&plants[0], 0.0, a.0, a.1),
                costed(&plants[1], 1.0, b.0, b.1),
                costed(&plants[2], 2.0, c.0, c.1),
            ];
            for load in (1..=32).map(|step| f64::from(step) * 5.0) {
                let is_feasible = has_feasible_commitment(&units, load);
                match allocate(&units, load) {
                    Ok(_) => assert!(is_feasible, "{a:?} {b:?} {c:?} planned {load} MW"),
                    Err(PlanError::Infeasible { .. }) => {
                        assert!(!is_feasible, "{a:?} {b:?} {c:?} missed {load} MW");
                    }
                    Err(error) => panic!("{a:?} {b:?} {c:?} at {load} MW: {error}"),
                }
            }
        }
    }
}
