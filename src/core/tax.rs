//! Net-income estimation abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::core::error::EstimationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FilingStatus::Single => "single",
                FilingStatus::MarriedFilingJointly => "married filing jointly",
                FilingStatus::MarriedFilingSeparately => "married filing separately",
                FilingStatus::HeadOfHousehold => "head of household",
            }
        )
    }
}

impl FromStr for FilingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(' ', "_").as_str() {
            "single" => Ok(FilingStatus::Single),
            "married_filing_jointly" => Ok(FilingStatus::MarriedFilingJointly),
            "married_filing_separately" => Ok(FilingStatus::MarriedFilingSeparately),
            "head_of_household" => Ok(FilingStatus::HeadOfHousehold),
            _ => Err(anyhow::anyhow!("Invalid filing status: {}", s)),
        }
    }
}

/// The validated inputs sent to the net-income estimation call.
#[derive(Debug, Clone)]
pub struct TaxProfile {
    pub gross_monthly_income: f64,
    pub location: String,
    pub filing_status: FilingStatus,
}

/// The service's answer to a net-income estimation request.
///
/// Values are produced opaquely by the remote model and are not range- or
/// sign-checked locally.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxEstimate {
    pub net_income: f64,
    pub total_tax: f64,
    pub disclaimer: String,
}

#[async_trait]
pub trait TaxEstimator: Send + Sync {
    async fn estimate_net_income(
        &self,
        profile: &TaxProfile,
    ) -> Result<TaxEstimate, EstimationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filing_status_display() {
        assert_eq!(FilingStatus::Single.to_string(), "single");
        assert_eq!(
            FilingStatus::MarriedFilingJointly.to_string(),
            "married filing jointly"
        );
        assert_eq!(
            FilingStatus::HeadOfHousehold.to_string(),
            "head of household"
        );
    }

    #[test]
    fn test_filing_status_from_str() {
        assert_eq!(
            "single".parse::<FilingStatus>().unwrap(),
            FilingStatus::Single
        );
        assert_eq!(
            "married_filing_jointly".parse::<FilingStatus>().unwrap(),
            FilingStatus::MarriedFilingJointly
        );
        assert_eq!(
            "Head of Household".parse::<FilingStatus>().unwrap(),
            FilingStatus::HeadOfHousehold
        );
        assert!("widowed".parse::<FilingStatus>().is_err());
    }

    #[test]
    fn test_filing_status_serde_round_trip() {
        let status: FilingStatus = serde_yaml::from_str("married_filing_separately").unwrap();
        assert_eq!(status, FilingStatus::MarriedFilingSeparately);
        assert_eq!(
            serde_yaml::to_string(&status).unwrap().trim(),
            "married_filing_separately"
        );
    }
}
