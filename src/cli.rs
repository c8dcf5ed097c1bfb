use std::{
    fs,
    io::{Read, stdin},
    path::PathBuf,
};

use clap::{Parser, Subcommand};

use crate::{
    core::{CostModel, PlanRequest, ProductionPlanService},
    payload::Payload,
    prelude::*,
    quantity::carbon::EmissionIntensity,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: read the payload and print the production plan as JSON.
    #[clap(name = "plan")]
    Plan(PlanArgs),

    /// Print the merit order without allocating anything.
    #[clap(name = "rank")]
    Rank(RankArgs),
}

#[derive(Parser)]
pub struct PlanArgs {
    #[clap(flatten)]
    pub payload: PayloadArgs,

    #[clap(flatten)]
    pub cost: CostArgs,

    /// Also render the plan as a table on stderr.
    #[clap(long)]
    pub table: bool,
}

#[derive(Parser)]
pub struct RankArgs {
    #[clap(flatten)]
    pub payload: PayloadArgs,

    #[clap(flatten)]
    pub cost: CostArgs,
}

#[derive(Parser)]
pub struct PayloadArgs {
    /// Path to the JSON payload, standard input when omitted.
    #[clap(long = "payload", env = "PAYLOAD")]
    pub path: Option<PathBuf>,
}

impl PayloadArgs {
    #[instrument(skip_all)]
    pub fn read(&self) -> Result<PlanRequest> {
        let json = match &self.path {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?,
            None => {
                let mut json = String::new();
                stdin().read_to_string(&mut json).context("failed to read the standard input")?;
                json
            }
        };
        let request = PlanRequest::try_from(Payload::from_json(&json)?)?;
        debug!(load = %request.load, n_units = request.units.len(), "read the payload");
        Ok(request)
    }
}

#[derive(Copy, Clone, Parser)]
pub struct CostArgs {
    /// CO₂ emitted by gas-fired units, tonnes per megawatt-hour of fuel.
    #[clap(long = "emission-factor", default_value = "0.3", env = "EMISSION_FACTOR")]
    pub emission_intensity: EmissionIntensity,
}

impl CostArgs {
    pub const fn service(self) -> ProductionPlanService {
        ProductionPlanService::new(CostModel::new(self.emission_intensity))
    }
}
