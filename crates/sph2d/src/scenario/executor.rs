//! Scenario execution engine

use std::time::Instant;

use anyhow::{Context, Result, bail};
use glam::Vec2;
use sph2d_core::Simulation;

use super::actions::ScenarioAction;
use super::definition::ScenarioDefinition;
use super::results::{ExecutionReport, TickStats};
use crate::summary::StateSummary;

/// Configuration for scenario executor
#[derive(Debug, Clone, Default)]
pub struct ScenarioExecutorConfig {
    /// Log every action before it runs
    pub verbose: bool,
}

/// Executes scenario actions against a simulation
pub struct ScenarioExecutor {
    config: ScenarioExecutorConfig,

    /// Host frames executed (for timing)
    frame_count: usize,

    /// Ticks rewound by back-steps
    rewound: usize,

    /// Action execution log
    log: Vec<String>,

    /// Forward tick timings (milliseconds)
    tick_times: Vec<f64>,
}

impl ScenarioExecutor {
    /// Create new executor with default config
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    /// Create new executor with custom config
    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            rewound: 0,
            log: Vec::new(),
            tick_times: Vec::new(),
        }
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        sim: &mut Simulation,
    ) -> Result<ExecutionReport> {
        let start_time = Instant::now();
        let mut report = ExecutionReport::new(scenario.name.as_str());

        self.log.clear();
        self.frame_count = 0;
        self.rewound = 0;
        self.tick_times.clear();

        self.log(&format!("Starting scenario: {}", scenario.name));
        if !scenario.description.is_empty() {
            self.log(&format!("Description: {}", scenario.description));
        }

        // Execute setup actions
        let setup_start = Instant::now();
        if !scenario.setup.is_empty() {
            self.log(&format!("Running {} setup actions", scenario.setup.len()));
            for (idx, action) in scenario.setup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, sim) {
                    let msg = format!("Setup action {} failed: {:#}", idx, e);
                    self.log(&msg);
                    report.log = self.log.clone();
                    bail!(msg);
                }
            }
        }
        report.timings.setup_ms = setup_start.elapsed().as_secs_f64() * 1000.0;

        // Execute main actions
        let action_start = Instant::now();
        self.log(&format!("Running {} main actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            if let Err(e) = self.execute_action(action, sim) {
                let msg = format!("Action {} failed: {:#}", idx, e);
                self.log(&msg);
                report.log = self.log.clone();
                bail!(msg);
            }
        }
        report.timings.actions_ms = action_start.elapsed().as_secs_f64() * 1000.0;

        report.actions_executed = scenario.setup.len() + scenario.actions.len();
        report.final_state = StateSummary::capture(sim);
        self.log(&format!("  State: {}", report.final_state));

        // Run verifications
        let verify_start = Instant::now();
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(sim);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "✓" } else { "✗" },
                    result.message
                ));

                if !result.passed {
                    report.verification_failures.push(result);
                }
            }
        }
        report.timings.verify_ms = verify_start.elapsed().as_secs_f64() * 1000.0;

        // Cleanup actions (always run)
        if !scenario.cleanup.is_empty() {
            self.log(&format!(
                "Running {} cleanup actions",
                scenario.cleanup.len()
            ));
            for (idx, action) in scenario.cleanup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, sim) {
                    self.log(&format!("Warning: Cleanup action {} failed: {:#}", idx, e));
                }
            }
        }

        // Finalize report
        report.frames_executed = self.frame_count;
        report.ticks_rewound = self.rewound;
        report.log = self.log.clone();
        report.passed = report.success();

        report.timings.total_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        report.timings.ticks = TickStats::from_samples(&self.tick_times);

        self.log(&format!(
            "Scenario complete: {} ({} frames, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            self.frame_count,
            report.timings.total_ms
        ));
        self.log(&format!("  Timing: {}", report.timings));
        report.log = self.log.clone();

        Ok(report)
    }

    /// Execute a single action
    fn execute_action(&mut self, action: &ScenarioAction, sim: &mut Simulation) -> Result<()> {
        if self.config.verbose {
            self.log(&format!("[Tick {}] {:?}", sim.tick_count(), action));
        }

        match action {
            ScenarioAction::Spawn { x, y, species } => {
                let id = species_id(sim, species)?;
                let handle = sim
                    .spawn(*x, *y, id)
                    .with_context(|| format!("Failed to spawn {} at ({}, {})", species, x, y))?;
                self.log(&format!(
                    "  Spawned {} #{} at ({}, {})",
                    species, handle.index, x, y
                ));
            }

            ScenarioAction::Throw {
                x,
                y,
                vx,
                vy,
                species,
            } => {
                let id = species_id(sim, species)?;
                sim.spawn_with_velocity(Vec2::new(*x, *y), Vec2::new(*vx, *vy), id)
                    .with_context(|| format!("Failed to throw {} at ({}, {})", species, x, y))?;
                self.log(&format!(
                    "  Threw {} from ({}, {}) at ({}, {})",
                    species, x, y, vx, vy
                ));
            }

            ScenarioAction::Splash { x, y, species } => {
                let id = species_id(sim, species)?;
                let spawned = sim.spawn_block(Vec2::new(*x, *y), id)?;
                self.log(&format!(
                    "  Splashed {} {} particles at ({}, {})",
                    spawned, species, x, y
                ));
            }

            ScenarioAction::Dam { species } => {
                let id = species_id(sim, species)?;
                let spawned = sim.spawn_dam(id)?;
                self.log(&format!("  Built dam of {} {} particles", spawned, species));
            }

            ScenarioAction::Explode {
                x,
                y,
                radius,
                strength,
            } => {
                let affected = sim.explode(Vec2::new(*x, *y), *radius, *strength);
                self.log(&format!(
                    "  Explosion at ({}, {}) r={} moved {} particles",
                    x, y, radius, affected
                ));
            }

            ScenarioAction::Clear => {
                sim.clear();
                self.log("  Cleared simulation");
            }

            ScenarioAction::Select { index } => {
                if !sim.select_index(*index) {
                    bail!("No particle at index {}", index);
                }
                self.log(&format!("  Selected particle {}", index));
            }

            ScenarioAction::SelectAt { x, y } => match sim.select_at(Vec2::new(*x, *y)) {
                Some(handle) => {
                    self.log(&format!("  Selected particle {} near ({}, {})", handle.index, x, y))
                }
                None => self.log(&format!("  Nothing to select near ({}, {})", x, y)),
            },

            ScenarioAction::Deselect => {
                sim.deselect();
                self.log("  Deselected");
            }

            ScenarioAction::Start => {
                let changed = sim.start();
                self.log_transition("start", changed, sim);
            }

            ScenarioAction::Pause => {
                let changed = sim.pause();
                self.log_transition("pause", changed, sim);
            }

            ScenarioAction::Resume => {
                let changed = sim.resume();
                self.log_transition("resume", changed, sim);
            }

            ScenarioAction::RunFrames { frames } => {
                let mut ticks = 0;
                for _ in 0..*frames {
                    let tick_start = Instant::now();
                    let ran = sim.advance()?;
                    if ran > 0 {
                        self.record_ticks(tick_start, ran);
                    }
                    ticks += ran;
                    self.frame_count += 1;
                }
                self.log(&format!("  Ran {} frames ({} ticks)", frames, ticks));
            }

            ScenarioAction::Step => {
                let tick_start = Instant::now();
                let ran = sim.step_forward()?;
                self.record_ticks(tick_start, ran);
                self.log(&format!("  Stepped to tick {}", sim.tick_count()));
            }

            ScenarioAction::LargeStep => {
                let tick_start = Instant::now();
                let ran = sim.large_step_forward()?;
                self.record_ticks(tick_start, ran);
                self.log(&format!("  Stepped {} ticks to {}", ran, sim.tick_count()));
            }

            ScenarioAction::Back => {
                let rewound = sim.step_back();
                self.rewound += rewound;
                self.log(&format!("  Rewound {} tick(s) to {}", rewound, sim.tick_count()));
            }

            ScenarioAction::LargeBack => {
                let rewound = sim.large_step_back();
                self.rewound += rewound;
                self.log(&format!("  Rewound {} tick(s) to {}", rewound, sim.tick_count()));
            }

            ScenarioAction::SetGravity { enabled, vector } => {
                if let Some((x, y)) = vector {
                    sim.set_gravity(Vec2::new(*x, *y));
                }
                sim.set_gravity_enabled(*enabled);
                self.log(&format!("  Gravity {} ({})", enabled, sim.gravity()));
            }

            ScenarioAction::Resize { width, height } => {
                sim.resize_window(*width, *height)
                    .with_context(|| format!("Failed to resize to {}x{}", width, height))?;
                self.log(&format!("  Resized window to {}x{}", width, height));
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  [LOG] {}", message));
            }
        }

        Ok(())
    }

    /// Spread the wall time of a batch evenly over its ticks
    fn record_ticks(&mut self, start: Instant, ticks: usize) {
        if ticks == 0 {
            return;
        }
        let per_tick = start.elapsed().as_secs_f64() * 1000.0 / ticks as f64;
        self.tick_times
            .extend(std::iter::repeat(per_tick).take(ticks));
    }

    fn log_transition(&mut self, command: &str, changed: bool, sim: &Simulation) {
        if changed {
            self.log(&format!("  Now {:?}", sim.run_state()));
        } else {
            self.log(&format!(
                "  Ignored {} while {:?}",
                command,
                sim.run_state()
            ));
        }
    }

    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn species_id(sim: &Simulation, name: &str) -> Result<u16> {
    match sim.species().find_by_name(name) {
        Some(def) => Ok(def.id),
        None => bail!("Unknown species: {}", name),
    }
}
