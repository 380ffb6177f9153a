use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::tax::FilingStatus;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExpenseConfig {
    pub name: String,
    pub amount: String,
}

/// The budget as entered by the user. Income and amounts stay strings here;
/// validation happens when a calculation is requested.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BudgetConfig {
    pub gross_monthly_income: String,
    pub location: String,
    pub filing_status: FilingStatus,
    #[serde(default)]
    pub expenses: Vec<ExpenseConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub budget: BudgetConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "budgeteer", "budgeteer")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Resolves the estimation-service credential at startup.
    ///
    /// The `api_key` config field wins; otherwise `GEMINI_API_KEY` from the
    /// environment. A missing credential is a startup error, surfaced before
    /// any remote call is attempted.
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.service.api_key.as_deref()
            && !key.is_empty()
        {
            return Ok(key.to_string());
        }
        std::env::var("GEMINI_API_KEY")
            .context("No API key: set service.api_key in the config or the GEMINI_API_KEY env var")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
budget:
  gross_monthly_income: "5200"
  location: "Austin, TX"
  filing_status: single
  expenses:
    - name: "Rent"
      amount: "1800"
    - name: "Groceries"
      amount: "450.50"
service:
  base_url: "http://example.com/gemini"
  model: "test-model"
  api_key: "secret"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.budget.gross_monthly_income, "5200");
        assert_eq!(config.budget.location, "Austin, TX");
        assert_eq!(config.budget.filing_status, FilingStatus::Single);
        assert_eq!(config.budget.expenses.len(), 2);
        assert_eq!(config.budget.expenses[0].name, "Rent");
        assert_eq!(config.budget.expenses[0].amount, "1800");
        assert_eq!(config.service.base_url, "http://example.com/gemini");
        assert_eq!(config.service.model, "test-model");
        assert_eq!(config.service.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_service_section_is_optional() {
        let yaml_str = r#"
budget:
  gross_monthly_income: "5200"
  location: "Austin"
  filing_status: married_filing_jointly
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.budget.filing_status,
            FilingStatus::MarriedFilingJointly
        );
        assert!(config.budget.expenses.is_empty());
        assert_eq!(
            config.service.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.service.model, "gemini-2.0-flash");
        assert!(config.service.api_key.is_none());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let config = AppConfig {
            budget: BudgetConfig {
                gross_monthly_income: "5000".to_string(),
                location: "Austin".to_string(),
                filing_status: FilingStatus::Single,
                expenses: Vec::new(),
            },
            service: ServiceConfig {
                api_key: Some("from-config".to_string()),
                ..ServiceConfig::default()
            },
        };

        assert_eq!(config.resolve_api_key().unwrap(), "from-config");
    }
}
