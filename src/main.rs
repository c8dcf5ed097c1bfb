#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod cli;
mod core;
mod payload;
mod prelude;
mod quantity;
mod tables;

use std::io::stderr;

use clap::{Parser, crate_version};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

use crate::{
    cli::{Args, Command, PlanArgs, RankArgs},
    prelude::*,
    tables::{build_merit_order_table, build_plan_table},
};

fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_env_filter(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .with_writer(stderr)
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Plan(args) => plan(&args),
        Command::Rank(args) => rank(&args),
    }
}

fn plan(args: &PlanArgs) -> Result {
    let request = args.payload.read()?;
    let plan = args.cost.service().plan(&request)?;
    if args.table {
        eprintln!("{}", build_plan_table(&plan));
    }
    println!("{}", serde_json::to_string_pretty(&plan.allocations)?);
    Ok(())
}

fn rank(args: &RankArgs) -> Result {
    let request = args.payload.read()?;
    let merit_order = args.cost.service().merit_order(&request)?;
    println!("{}", build_merit_order_table(&merit_order));
    Ok(())
}
