//! `chemistryProperties` configuration.
//!
//! ```yaml
//! chemistryType:
//!   chemistrySolver: QSS
//!   chemistryThermo: psi
//! QSSCoeffs:
//!   solver: seulex
//!   absTol: 1e-12
//!   relTol: 0.1
//! ```
//!
//! Unrecognized keys are ignored.

use crate::error::{ChemResult, ChemistryError};
use qc_core::Tolerances;
use qc_kinetics::JacobianMethod;
use qc_ode::{OdeOptions, OdeSolverKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChemistryProperties {
    pub chemistry_type: ChemistryTypeDef,
    #[serde(
        rename = "QSSCoeffs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub qss_coeffs: Option<QssCoeffsDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChemistryTypeDef {
    pub chemistry_solver: String,
    #[serde(default = "default_thermo")]
    pub chemistry_thermo: String,
}

fn default_thermo() -> String {
    "psi".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QssCoeffsDef {
    #[serde(default = "default_solver")]
    pub solver: String,
    #[serde(default = "default_abs_tol")]
    pub abs_tol: f64,
    #[serde(default = "default_rel_tol")]
    pub rel_tol: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_min_step")]
    pub min_step: f64,
    #[serde(default = "default_jacobian")]
    pub jacobian: String,
}

fn default_solver() -> String {
    OdeSolverKind::default().name().to_string()
}

fn default_abs_tol() -> f64 {
    OdeOptions::default().tolerances.abs
}

fn default_rel_tol() -> f64 {
    OdeOptions::default().tolerances.rel
}

fn default_max_steps() -> usize {
    OdeOptions::default().max_steps
}

fn default_min_step() -> f64 {
    OdeOptions::default().min_step
}

fn default_jacobian() -> String {
    JacobianMethod::default().name().to_string()
}

impl Default for QssCoeffsDef {
    fn default() -> Self {
        Self {
            solver: default_solver(),
            abs_tol: default_abs_tol(),
            rel_tol: default_rel_tol(),
            max_steps: default_max_steps(),
            min_step: default_min_step(),
            jacobian: default_jacobian(),
        }
    }
}

/// Validated QSS integrator coefficients. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QssCoeffs {
    pub solver: OdeSolverKind,
    pub tolerances: Tolerances,
    pub max_steps: usize,
    pub min_step: f64,
    pub jacobian: JacobianMethod,
}

impl Default for QssCoeffs {
    fn default() -> Self {
        let opts = OdeOptions::default();
        Self {
            solver: OdeSolverKind::default(),
            tolerances: opts.tolerances,
            max_steps: opts.max_steps,
            min_step: opts.min_step,
            jacobian: JacobianMethod::default(),
        }
    }
}

impl QssCoeffs {
    pub fn ode_options(&self) -> OdeOptions {
        OdeOptions {
            tolerances: self.tolerances,
            max_steps: self.max_steps,
            min_step: self.min_step,
        }
    }

    pub fn validate(&self) -> ChemResult<()> {
        self.ode_options()
            .validate()
            .map_err(|e| ChemistryError::Configuration {
                what: format!("QSSCoeffs: {e}"),
            })
    }
}

impl TryFrom<&QssCoeffsDef> for QssCoeffs {
    type Error = ChemistryError;

    fn try_from(def: &QssCoeffsDef) -> ChemResult<Self> {
        let coeffs = Self {
            solver: def.solver.parse()?,
            tolerances: Tolerances {
                abs: def.abs_tol,
                rel: def.rel_tol,
            },
            max_steps: def.max_steps,
            min_step: def.min_step,
            jacobian: def.jacobian.parse()?,
        };
        coeffs.validate()?;
        Ok(coeffs)
    }
}

/// Chemistry scheme selected by `chemistryType.chemistrySolver`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChemistrySelection {
    Qss(QssCoeffs),
    /// Chemistry switched off.
    None,
}

impl ChemistryProperties {
    /// Resolve and validate the selected scheme.
    pub fn selection(&self) -> ChemResult<ChemistrySelection> {
        let thermo = self.chemistry_type.chemistry_thermo.as_str();
        if thermo != "psi" {
            return Err(ChemistryError::Configuration {
                what: format!("unsupported chemistryThermo '{thermo}' (expected psi)"),
            });
        }
        match self.chemistry_type.chemistry_solver.as_str() {
            "QSS" => {
                let def = self
                    .qss_coeffs
                    .as_ref()
                    .ok_or_else(|| ChemistryError::Configuration {
                        what: "QSS chemistry requires a QSSCoeffs section".to_string(),
                    })?;
                Ok(ChemistrySelection::Qss(QssCoeffs::try_from(def)?))
            }
            "none" => Ok(ChemistrySelection::None),
            other => Err(ChemistryError::Configuration {
                what: format!("unknown chemistrySolver '{other}' (expected QSS or none)"),
            }),
        }
    }

    pub fn from_yaml_str(content: &str) -> ChemResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> ChemResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Load and validate a YAML configuration.
pub fn load_yaml(path: &Path) -> ChemResult<ChemistryProperties> {
    let content = std::fs::read_to_string(path)?;
    let props = ChemistryProperties::from_yaml_str(&content)?;
    props.selection()?;
    Ok(props)
}

/// Load and validate a JSON configuration.
pub fn load_json(path: &Path) -> ChemResult<ChemistryProperties> {
    let content = std::fs::read_to_string(path)?;
    let props = ChemistryProperties::from_json_str(&content)?;
    props.selection()?;
    Ok(props)
}

/// Load by file extension (`.json`, otherwise YAML).
pub fn load(path: &Path) -> ChemResult<ChemistryProperties> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        _ => load_yaml(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QSS_YAML: &str = "
chemistryType:
  chemistrySolver: QSS
  chemistryThermo: psi
QSSCoeffs:
  solver: seulex
  absTol: 1e-12
  relTol: 0.1
  someFutureKey: 3
";

    #[test]
    fn parses_qss_section_and_ignores_unknown_keys() {
        let props = ChemistryProperties::from_yaml_str(QSS_YAML).unwrap();
        let ChemistrySelection::Qss(coeffs) = props.selection().unwrap() else {
            panic!("expected QSS selection");
        };
        assert_eq!(coeffs.solver, OdeSolverKind::Seulex);
        assert_eq!(coeffs.tolerances.abs, 1e-12);
        assert_eq!(coeffs.tolerances.rel, 0.1);
        assert_eq!(coeffs.max_steps, 10_000);
        assert_eq!(coeffs.jacobian, JacobianMethod::Auto);
    }

    #[test]
    fn unknown_solver_variant_is_configuration_error() {
        let yaml = QSS_YAML.replace("seulex", "rk4");
        let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
        assert!(matches!(
            props.selection(),
            Err(ChemistryError::Configuration { .. })
        ));
    }

    #[test]
    fn non_positive_tolerance_is_rejected() {
        let yaml = QSS_YAML.replace("relTol: 0.1", "relTol: -1");
        let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
        assert!(matches!(
            props.selection(),
            Err(ChemistryError::Configuration { .. })
        ));
    }

    #[test]
    fn unsupported_thermo_and_scheme() {
        let yaml = QSS_YAML.replace("psi", "rho");
        let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
        assert!(props.selection().is_err());

        let yaml = QSS_YAML.replace("QSS\n", "EulerImplicitChemistry\n");
        let props = ChemistryProperties::from_yaml_str(&yaml).unwrap();
        assert!(props.selection().is_err());
    }

    #[test]
    fn missing_coefficients_section() {
        let props = ChemistryProperties::from_yaml_str(
            "chemistryType:\n  chemistrySolver: QSS\n",
        )
        .unwrap();
        assert!(props.selection().is_err());

        let props = ChemistryProperties::from_yaml_str(
            "chemistryType:\n  chemistrySolver: none\n",
        )
        .unwrap();
        assert_eq!(props.selection().unwrap(), ChemistrySelection::None);
    }

    #[test]
    fn json_round_trip() {
        let props = ChemistryProperties::from_yaml_str(QSS_YAML).unwrap();
        let json = serde_json::to_string(&props).unwrap();
        let back = ChemistryProperties::from_json_str(&json).unwrap();
        assert_eq!(props, back);
    }
}
