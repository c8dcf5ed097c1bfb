use itertools::Itertools;

use crate::{
    core::{
        allocation::{Allocation, AllocationEngine, TOLERANCE},
        cost_model::{CostModel, CostedUnit},
        error::PlanError,
        merit_order::rank,
        unit::{FuelConditions, GenerationUnit},
    },
    prelude::*,
    quantity::{cost::HourlyCost, power::Megawatts},
};

/// Validated request for a single hour.
#[derive(Clone, Debug)]
pub struct PlanRequest {
    pub load: Megawatts,
    pub fuels: FuelConditions,
    pub units: Vec<GenerationUnit>,
}

#[derive(Clone, Debug)]
pub struct ProductionPlan {
    /// One entry per unit, in the merit order.
    pub allocations: Vec<Allocation>,

    /// What running the plan costs.
    pub cost: HourlyCost,
}

impl ProductionPlan {
    pub fn total(&self) -> Megawatts {
        self.allocations.iter().map(|allocation| allocation.power).sum()
    }
}

pub struct ProductionPlanService {
    cost_model: CostModel,
    tolerance: Megawatts,
}

impl ProductionPlanService {
    pub const fn new(cost_model: CostModel) -> Self {
        Self { cost_model, tolerance: TOLERANCE }
    }

    /// Cost and rank the units without allocating anything.
    pub fn merit_order<'r>(
        &self,
        request: &'r PlanRequest,
    ) -> Result<Vec<CostedUnit<'r>>, PlanError> {
        if request.units.is_empty() {
            return Err(PlanError::invalid("there must be at least one power plant"));
        }
        let costed = request
            .units
            .iter()
            .map(|unit| self.cost_model.cost(unit, &request.fuels))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rank(costed))
    }

    #[instrument(skip_all, fields(load = %request.load, n_units = request.units.len()))]
    pub fn plan(&self, request: &PlanRequest) -> Result<ProductionPlan, PlanError> {
        if !(request.load.is_finite() && request.load > Megawatts::ZERO) {
            return Err(PlanError::invalid(format!(
                "load must be positive, got {:?}",
                request.load,
            )));
        }

        let ranked = self.merit_order(request)?;
        info!(
            merit_order = %ranked.iter().map(|unit| format!("{}({})", unit.unit.name, unit.cost)).join(", "),
            "ranked",
        );

        let allocations = AllocationEngine::builder()
            .units(&ranked)
            .load(request.load)
            .tolerance(self.tolerance)
            .build()
            .run()?;
        let plan = ProductionPlan {
            cost: allocations.iter().map(|allocation| allocation.power * allocation.cost).sum(),
            allocations,
        };
        info!(total = %plan.total(), cost = %plan.cost, "planned");
        Ok(plan)
    }
}
