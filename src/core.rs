pub mod allocation;
pub mod cost_model;
pub mod error;
pub mod merit_order;
pub mod plan;
pub mod unit;

pub use self::{
    allocation::{Allocation, AllocationEngine},
    cost_model::{CostModel, CostedUnit},
    error::PlanError,
    merit_order::rank,
    plan::{PlanRequest, ProductionPlan, ProductionPlanService},
    unit::{FuelConditions, GenerationUnit, PlantKind},
};
