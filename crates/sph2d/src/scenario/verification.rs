//! Verification conditions and state checks for scenarios

use serde::{Deserialize, Serialize};
use sph2d_core::{RunState, Simulation};

/// Conditions that can be verified against simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationCondition {
    // === PARTICLE CHECKS ===
    /// Assert particle count
    ParticleCount {
        expected: usize,
        #[serde(default)]
        tolerance: Option<usize>, // Allow ±N variance
    },

    /// Assert every particle lies within the wall margins
    AllInsideDomain,

    /// Assert every particle has at least this density
    MinDensity { min: f32 },

    /// Assert no particle moves faster than this
    MaxSpeed { max: f32 },

    // === DRIVER STATE CHECKS ===
    RunState { expected: RunState },

    SelectionActive { expected: bool },

    /// Assert the tick counter
    TickCount { expected: u64 },

    // === LOGICAL OPERATORS ===
    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Result of a verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

impl VerificationCondition {
    /// Evaluate condition against simulation state
    pub fn evaluate(&self, sim: &Simulation) -> VerificationResult {
        match self {
            VerificationCondition::ParticleCount {
                expected,
                tolerance,
            } => {
                let actual = sim.len();
                let tol = tolerance.unwrap_or(0);
                let passed = actual >= expected.saturating_sub(tol) && actual <= expected + tol;

                VerificationResult {
                    passed,
                    message: format!(
                        "Particle count: expected {}±{}, got {}",
                        expected, tol, actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::AllInsideDomain => {
                let domain = sim.domain();
                let outside = sim
                    .particles()
                    .iter()
                    .filter(|p| !p.position.is_finite() || !domain.contains(p.position))
                    .count();

                VerificationResult {
                    passed: outside == 0,
                    message: format!("Particles outside domain: {}", outside),
                    actual_value: Some(outside.to_string()),
                }
            }

            VerificationCondition::MinDensity { min } => {
                let lowest = sim
                    .particles()
                    .iter()
                    .map(|p| p.density)
                    .fold(f32::INFINITY, f32::min);
                let passed = sim.is_empty() || lowest >= *min;

                VerificationResult {
                    passed,
                    message: format!("Lowest density: expected >= {}, got {}", min, lowest),
                    actual_value: Some(lowest.to_string()),
                }
            }

            VerificationCondition::MaxSpeed { max } => {
                let fastest = sim
                    .particles()
                    .iter()
                    .map(|p| p.velocity.length())
                    .fold(0.0, f32::max);

                VerificationResult {
                    passed: fastest <= *max,
                    message: format!("Highest speed: expected <= {}, got {}", max, fastest),
                    actual_value: Some(fastest.to_string()),
                }
            }

            VerificationCondition::RunState { expected } => {
                let actual = sim.run_state();

                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Run state: expected {:?}, got {:?}", expected, actual),
                    actual_value: Some(format!("{:?}", actual)),
                }
            }

            VerificationCondition::SelectionActive { expected } => {
                let actual = sim.selection().is_active();

                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Selection active: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::TickCount { expected } => {
                let actual = sim.tick_count();

                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Tick count: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::All { conditions } => {
                let results: Vec<_> = conditions.iter().map(|c| c.evaluate(sim)).collect();
                let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();

                VerificationResult {
                    passed: failed.is_empty(),
                    message: if failed.is_empty() {
                        format!("All {} conditions passed", conditions.len())
                    } else {
                        format!(
                            "{} of {} conditions failed: {}",
                            failed.len(),
                            conditions.len(),
                            failed
                                .iter()
                                .map(|r| r.message.as_str())
                                .collect::<Vec<_>>()
                                .join("; ")
                        )
                    },
                    actual_value: None,
                }
            }

            VerificationCondition::Not { condition } => {
                let result = condition.evaluate(sim);

                VerificationResult {
                    passed: !result.passed,
                    message: format!("NOT ({})", result.message),
                    actual_value: result.actual_value,
                }
            }
        }
    }
}
