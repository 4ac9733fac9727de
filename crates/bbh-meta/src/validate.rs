//! Physical-convention checks that the file format itself does not enforce.

use bbh_core::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::record::{BodyState, SimulationRecord};

/// Tolerance on `|m1 + m2 - E_ADM| / E_ADM` before the t=0 masses are flagged.
pub const ADM_MASS_TOLERANCE: f64 = 0.05;

/// How much a finding matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Noted, nothing wrong.
    Info,
    /// Likely a bad value.
    Warning,
}

/// One observation about a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// How much it matters.
    pub severity: Severity,
    /// Key the finding is about.
    pub key: String,
    /// Human-readable description.
    pub message: String,
}

/// All findings for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    /// Findings in check order.
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Findings of [`Severity::Warning`].
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.findings
            .iter()
            .filter(|finding| finding.severity == Severity::Warning)
    }

    /// Whether any finding is a warning.
    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    fn push(&mut self, severity: Severity, key: &str, message: String) {
        self.findings.push(Finding {
            severity,
            key: key.to_string(),
            message,
        });
    }
}

/// Checks `record` against domain conventions. Never fails; problems are
/// returned as findings.
pub fn validate(record: &SimulationRecord) -> ValidationReport {
    let mut report = ValidationReport::default();

    let spins = [
        ("initial-dimensionless-spin1", &record.initial().body1),
        ("initial-dimensionless-spin2", &record.initial().body2),
        ("reference-dimensionless-spin1", &record.reference().body1),
        ("reference-dimensionless-spin2", &record.reference().body2),
    ];
    for (key, body) in spins {
        check_spin(&mut report, key, body);
    }
    if let Some(spin) = record.remnant().dimensionless_spin {
        if spin.norm() > 1.0 {
            report.push(
                Severity::Warning,
                "remnant-dimensionless-spin",
                format!("spin magnitude {:.6} exceeds 1", spin.norm()),
            );
        }
    }

    if let Some(time) = record.reference().time {
        if time < 0.0 {
            report.push(
                Severity::Warning,
                "reference-time",
                format!("reference time {time} precedes the initial slice"),
            );
        }
    }

    if let Some(eccentricity) = record.reference().eccentricity {
        if eccentricity.value() < 0.0 {
            report.push(
                Severity::Warning,
                "reference-eccentricity",
                format!("eccentricity {eccentricity} is negative"),
            );
        }
    }

    let initial = record.initial();
    if let (Some(m1), Some(m2), Some(energy)) =
        (initial.body1.mass, initial.body2.mass, initial.adm_energy)
    {
        let total = m1 + m2;
        if energy > 0.0 && ((total - energy) / energy).abs() > ADM_MASS_TOLERANCE {
            report.push(
                Severity::Warning,
                "initial-ADM-energy",
                format!("ADM energy {energy} differs from m1 + m2 = {total} by more than 5%"),
            );
        }
    }

    if let Some(version) = record.provenance().metadata_version {
        if !version.is_supported() {
            report.push(
                Severity::Warning,
                "metadata-version",
                format!(
                    "metadata version {version} is not supported (current is {})",
                    SchemaVersion::CURRENT
                ),
            );
        }
    }

    for key in ["object1", "object2"] {
        if record.get(key).is_none() {
            report.push(
                Severity::Info,
                key,
                "object type not recorded; assuming a black hole".into(),
            );
        }
    }

    report
}

fn check_spin(report: &mut ValidationReport, key: &str, body: &BodyState) {
    if let Some(spin) = body.dimensionless_spin {
        let magnitude = spin.norm();
        if magnitude > 1.0 {
            report.push(
                Severity::Warning,
                key,
                format!("spin magnitude {magnitude:.6} exceeds 1"),
            );
        }
    }
}
