//! Quantities computed from a record for plotting and catalog consumers.

use bbh_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::record::{Bibliography, BodyState, SimulationRecord};

/// Summary quantities derived from a record.
///
/// Component quantities prefer the reference time and fall back to t=0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DerivedQuantities {
    /// `m1 + m2`.
    pub total_mass: Option<f64>,
    /// `m1 / m2`, oriented so that `q >= 1`.
    pub mass_ratio: Option<f64>,
    /// `m1 m2 / (m1 + m2)^2`.
    pub symmetric_mass_ratio: Option<f64>,
    /// Mass-weighted spin along the orbital angular momentum.
    pub chi_eff: Option<f64>,
    /// `|chi|` of the remnant.
    pub remnant_spin_magnitude: Option<f64>,
    /// Speed of the remnant recoil.
    pub remnant_kick: Option<f64>,
    /// Remnant parameters for quasinormal-mode ringdown models.
    pub ringdown: Option<RingdownParameters>,
}

/// Mass and spin magnitude of the remnant in the range ringdown models accept:
/// `mass > 0` and `0 <= chi < 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingdownParameters {
    /// Remnant mass.
    pub mass: f64,
    /// Remnant dimensionless spin magnitude.
    pub chi: f64,
}

impl RingdownParameters {
    /// Remnant parameters of `record`, or `None` when either is missing or
    /// outside the range quasinormal-mode frequencies are defined for.
    pub fn from_record(record: &SimulationRecord) -> Option<Self> {
        let remnant = record.remnant();
        let mass = remnant.mass?;
        let chi = remnant.dimensionless_spin?.norm();
        (mass > 0.0 && (0.0..1.0).contains(&chi)).then_some(Self { mass, chi })
    }
}

impl DerivedQuantities {
    /// Computes every quantity the record has inputs for.
    pub fn from_record(record: &SimulationRecord) -> Self {
        let (body1, body2) = component_states(record);
        let masses = body1.mass.zip(body2.mass);
        let total_mass = masses.map(|(m1, m2)| m1 + m2);
        let mass_ratio = masses.map(|(m1, m2)| if m1 >= m2 { m1 / m2 } else { m2 / m1 });
        let symmetric_mass_ratio = masses.map(|(m1, m2)| m1 * m2 / ((m1 + m2) * (m1 + m2)));

        let axis = record
            .reference()
            .orbital_frequency
            .and_then(|omega| omega.normalized())
            .unwrap_or(Vec3::new(0.0, 0.0, 1.0));
        let chi_eff = match (
            masses,
            body1.dimensionless_spin,
            body2.dimensionless_spin,
        ) {
            (Some((m1, m2)), Some(chi1), Some(chi2)) => {
                Some((m1 * chi1.dot(&axis) + m2 * chi2.dot(&axis)) / (m1 + m2))
            }
            _ => None,
        };

        Self {
            total_mass,
            mass_ratio,
            symmetric_mass_ratio,
            chi_eff,
            remnant_spin_magnitude: record.remnant().dimensionless_spin.map(|chi| chi.norm()),
            remnant_kick: record.remnant().velocity.map(|v| v.norm()),
            ringdown: RingdownParameters::from_record(record),
        }
    }
}

/// Component states, each field taken from the reference time when present.
pub fn component_states(record: &SimulationRecord) -> (BodyState, BodyState) {
    let pick = |reference: &BodyState, initial: &BodyState| BodyState {
        mass: reference.mass.or(initial.mass),
        dimensionless_spin: reference.dimensionless_spin.or(initial.dimensionless_spin),
        position: reference.position.or(initial.position),
    };
    (
        pick(&record.reference().body1, &record.initial().body1),
        pick(&record.reference().body2, &record.initial().body2),
    )
}

impl Bibliography {
    /// Every citation key once, in role order: simulation, code, initial
    /// data, quasicircular reduction.
    pub fn cited_keys(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let roles = [
            &self.simulation,
            &self.code,
            &self.initial_data,
            &self.quasicircular,
        ];
        for key in roles.into_iter().flatten().flatten() {
            if !seen.contains(&key.as_str()) {
                seen.push(key);
            }
        }
        seen
    }
}
