//! Scenario reports

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::verification::VerificationResult;
use crate::summary::StateSummary;

/// Forward tick cost over a run, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickStats {
    pub count: usize,
    pub mean_ms: f64,
    pub peak_ms: f64,
}

impl TickStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        Self {
            count: samples.len(),
            mean_ms: samples.iter().sum::<f64>() / samples.len() as f64,
            peak_ms: samples.iter().copied().fold(0.0, f64::max),
        }
    }
}

/// Wall-clock time per scenario section, in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct Timings {
    pub setup_ms: f64,
    pub actions_ms: f64,
    pub verify_ms: f64,
    pub total_ms: f64,
    pub ticks: TickStats,
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}ms total | {} ticks, mean {:.3}ms, peak {:.3}ms",
            self.total_ms, self.ticks.count, self.ticks.mean_ms, self.ticks.peak_ms
        )
    }
}

/// Outcome of one scenario run, written with `--report`
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub scenario_name: String,
    /// RFC 3339, taken when the run started
    pub timestamp: String,
    pub passed: bool,
    /// Host frames driven by `RunFrames`
    pub frames_executed: usize,
    /// Setup plus main actions
    pub actions_executed: usize,
    pub ticks_rewound: usize,
    /// State after the main actions, before cleanup
    pub final_state: StateSummary,
    pub verification_failures: Vec<VerificationResult>,
    pub log: Vec<String>,
    pub timings: Timings,
}

impl ExecutionReport {
    pub fn new(scenario_name: impl Into<String>) -> Self {
        Self {
            scenario_name: scenario_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            passed: false,
            frames_executed: 0,
            actions_executed: 0,
            ticks_rewound: 0,
            final_state: StateSummary::default(),
            verification_failures: Vec::new(),
            log: Vec::new(),
            timings: Timings::default(),
        }
    }

    pub fn success(&self) -> bool {
        self.verification_failures.is_empty()
    }

    /// Write pretty JSON, creating missing parent directories
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create report: {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_stats() {
        assert_eq!(TickStats::from_samples(&[]), TickStats::default());

        let stats = TickStats::from_samples(&[1.0, 3.0, 2.0]);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.mean_ms, 2.0);
        assert_eq!(stats.peak_ms, 3.0);
    }

    #[test]
    fn test_timings_display() {
        let timings = Timings {
            total_ms: 12.34,
            ticks: TickStats::from_samples(&[0.5, 1.5]),
            ..Default::default()
        };
        assert_eq!(
            timings.to_string(),
            "12.3ms total | 2 ticks, mean 1.000ms, peak 1.500ms"
        );
    }

    #[test]
    fn test_save_json_creates_directories() {
        let mut report = ExecutionReport::new("Test Scenario");
        report.passed = true;
        report.frames_executed = 120;
        report.final_state.particles = 42;
        report.log.push("Test log message".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/test.json");
        report.save_json(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["scenario_name"], "Test Scenario");
        assert_eq!(json["frames_executed"], 120);
        assert_eq!(json["final_state"]["particles"], 42);
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_success_check() {
        let mut report = ExecutionReport::new("Test");
        assert!(report.success());

        report.verification_failures.push(VerificationResult {
            passed: false,
            message: "Test failure".to_string(),
            actual_value: None,
        });
        assert!(!report.success());
    }
}
