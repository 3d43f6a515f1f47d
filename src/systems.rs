//! Registry of the transit systems the pipeline knows about.
//!
//! Stored as a JSON array on disk:
//! ```json
//! [
//!   {
//!     "name": "cleveland",
//!     "zip_codes": ["44112", "44104"],
//!     "ntd_id": "5015",
//!     "magnitude_correction": { "before": 2015 }
//!   }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DataError;

/// Which years of a system's NTD series may be rescaled by 1000 when they
/// stray more than one standard deviation from the system's own mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeCorrection {
    #[default]
    All,
    /// Only years strictly before the given one.
    Before(u16),
    None,
}

impl MagnitudeCorrection {
    pub fn applies_to(self, year: u16) -> bool {
        match self {
            MagnitudeCorrection::All => true,
            MagnitudeCorrection::Before(cutoff) => year < cutoff,
            MagnitudeCorrection::None => false,
        }
    }
}

/// A named BRT system and the ZIP codes approximating its service area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    #[serde(default)]
    pub zip_codes: Vec<String>,
    /// Identifier of the operating agency in the NTD archives.
    pub ntd_id: String,
    #[serde(default)]
    pub magnitude_correction: MagnitudeCorrection,
}

impl System {
    pub fn new(name: &str, zip_codes: &[&str], ntd_id: &str) -> Self {
        Self {
            name: name.to_string(),
            zip_codes: zip_codes.iter().map(|z| z.to_string()).collect(),
            ntd_id: ntd_id.to_string(),
            magnitude_correction: MagnitudeCorrection::All,
        }
    }

    pub fn with_magnitude_correction(mut self, policy: MagnitudeCorrection) -> Self {
        self.magnitude_correction = policy;
        self
    }
}

pub struct SystemRegistry {
    systems: Vec<System>,
}

impl SystemRegistry {
    /// Loads the registry from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DataError> {
        let systems: Vec<System> = serde_json::from_str(content)?;
        Ok(Self { systems })
    }

    pub fn get(&self, name: &str) -> Result<&System, DataError> {
        self.systems
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DataError::UnknownSystem(name.to_string()))
    }

    /// Resolves `names`, or every configured system when `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<&System>, DataError> {
        if names.is_empty() {
            return Ok(self.systems.iter().collect());
        }
        names.iter().map(|n| self.get(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"[
        {"name": "cleveland", "zip_codes": ["44112", "44104"], "ntd_id": "5015",
         "magnitude_correction": {"before": 2015}},
        {"name": "hartford", "ntd_id": "1048", "magnitude_correction": "none"},
        {"name": "houston", "zip_codes": ["77056"], "ntd_id": "6008"}
    ]"#;

    #[test]
    fn test_from_json_reads_policies() {
        let registry = SystemRegistry::from_json(REGISTRY).unwrap();

        let cleveland = registry.get("cleveland").unwrap();
        assert_eq!(cleveland.zip_codes, vec!["44112", "44104"]);
        assert_eq!(
            cleveland.magnitude_correction,
            MagnitudeCorrection::Before(2015)
        );

        let hartford = registry.get("hartford").unwrap();
        assert!(hartford.zip_codes.is_empty());
        assert_eq!(hartford.magnitude_correction, MagnitudeCorrection::None);

        let houston = registry.get("houston").unwrap();
        assert_eq!(houston.magnitude_correction, MagnitudeCorrection::All);
    }

    #[test]
    fn test_unknown_system() {
        let registry = SystemRegistry::from_json(REGISTRY).unwrap();
        assert!(matches!(
            registry.get("brooklyn"),
            Err(DataError::UnknownSystem(_))
        ));
        assert!(registry.select(&["brooklyn".to_string()]).is_err());
    }

    #[test]
    fn test_select_all_when_empty() {
        let registry = SystemRegistry::from_json(REGISTRY).unwrap();
        assert_eq!(registry.select(&[]).unwrap().len(), 3);
    }

    #[test]
    fn test_policy_years() {
        assert!(MagnitudeCorrection::All.applies_to(2020));
        assert!(MagnitudeCorrection::Before(2015).applies_to(2014));
        assert!(!MagnitudeCorrection::Before(2015).applies_to(2015));
        assert!(!MagnitudeCorrection::None.applies_to(2013));
    }
}
