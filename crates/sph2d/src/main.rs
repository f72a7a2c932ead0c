//! sph2d - headless 2D SPH fluid simulation

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};

use sph2d::SimConfig;
use sph2d::StateSummary;
use sph2d::scenario::{ScenarioDefinition, ScenarioExecutor, ScenarioExecutorConfig};
use sph2d_core::Simulation;
use sph2d_species::SpeciesTable;

/// Ticks between progress lines in a free run
const PROGRESS_INTERVAL: u64 = 100;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run a RON scenario file instead of a free run
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Load species presets from a RON file instead of the built-ins
    #[arg(long)]
    species: Option<PathBuf>,

    /// Number of ticks for a free run
    #[arg(long, default_value = "600")]
    ticks: u64,

    /// Seed a dam instead of a block in the middle of the domain
    #[arg(long)]
    dam: bool,

    /// Species to seed a free run with
    #[arg(long, default_value = "water")]
    fluid: String,

    /// Write the scenario report (or free-run summary) as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// List available species and exit
    #[arg(long)]
    list_species: bool,

    /// Log every scenario action
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let species = match &args.species {
        Some(path) => SpeciesTable::from_file(path)
            .with_context(|| format!("Failed to load species file: {}", path.display()))?,
        None => SpeciesTable::new(),
    };

    if args.list_species {
        list_species(&species);
        return Ok(());
    }

    let config = SimConfig::load()?;
    let params = config.to_sim_params()?;
    let mut sim = Simulation::new(species, params).context("Failed to create simulation")?;

    match &args.scenario {
        Some(path) => run_scenario(&args, path, &mut sim),
        None => free_run(&args, &mut sim),
    }
}

fn list_species(species: &SpeciesTable) {
    println!("Available species:");
    for def in species.iter() {
        println!(
            "  {:>2}  {:<10} rest density {:<8} H {:<5} mass {:<5} viscosity {}",
            def.id, def.name, def.rest_density, def.smoothing_radius, def.mass, def.viscosity
        );
    }
}

fn run_scenario(args: &Args, path: &Path, sim: &mut Simulation) -> Result<()> {
    let scenario = ScenarioDefinition::from_file(path)?;
    log::info!("Loaded scenario '{}' from {}", scenario.name, path.display());

    let mut executor = ScenarioExecutor::with_config(ScenarioExecutorConfig {
        verbose: args.verbose,
    });
    let report = executor.execute_scenario(&scenario, sim)?;

    if let Some(report_path) = &args.report {
        report.save_json(report_path)?;
        log::info!("Report written to {}", report_path.display());
    }

    if !report.passed {
        bail!(
            "Scenario '{}' failed {} verification(s)",
            scenario.name,
            report.verification_failures.len()
        );
    }
    Ok(())
}

fn free_run(args: &Args, sim: &mut Simulation) -> Result<()> {
    let fluid = match sim.species().find_by_name(&args.fluid) {
        Some(def) => def.id,
        None => bail!("Unknown species: {}", args.fluid),
    };

    let spawned = if args.dam {
        sim.spawn_dam(fluid)?
    } else {
        let center = sim.domain().center();
        sim.spawn_block(center, fluid)?
    };
    log::info!("Seeded {} {} particles", spawned, args.fluid);

    sim.start();
    while sim.tick_count() < args.ticks {
        let before = sim.tick_count();
        sim.advance_until(args.ticks)?;
        let after = sim.tick_count();
        if after == before {
            bail!("Simulation stopped advancing at tick {}", after);
        }
        if before / PROGRESS_INTERVAL != after / PROGRESS_INTERVAL {
            log::info!("{}", StateSummary::capture(sim));
        }
    }

    let summary = StateSummary::capture(sim);
    log::info!("Finished: {}", summary);

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write summary: {}", report_path.display()))?;
        log::info!("Summary written to {}", report_path.display());
    }
    Ok(())
}
