//! Gemini `generateContent` transport for both estimation operations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::core::analysis::{AnalysisContext, BudgetAnalyst};
use crate::core::error::EstimationError;
use crate::core::tax::{TaxEstimate, TaxEstimator, TaxProfile};
use crate::core::validate::parse_amount;

/// Client for a single configured Gemini model.
///
/// Implements both remote operations of the workflow: the structured
/// net-income estimation and the free-text budget analysis. Neither call
/// retries; retry policy, if any, belongs to the caller.
pub struct GeminiEstimator {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiEstimator {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        GeminiEstimator {
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Sends one generation request and extracts the first candidate's text.
    async fn generate(
        &self,
        prompt: String,
        generation_config: Option<serde_json::Value>,
    ) -> Result<String, EstimationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting generation from {}", url);

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        if let Some(config) = generation_config {
            body["generationConfig"] = config;
        }

        let client = reqwest::Client::builder()
            .user_agent("budgeteer/0.1")
            .build()?;
        let response = client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EstimationError::Status(response.status()));
        }

        let payload = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| EstimationError::Malformed(e.to_string()))?;

        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(EstimationError::Empty)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// The exact three-field shape requested from the structured call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxEstimatePayload {
    estimated_net_income: f64,
    estimated_total_tax: f64,
    disclaimer: String,
}

fn tax_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "estimatedNetIncome": { "type": "NUMBER" },
            "estimatedTotalTax": { "type": "NUMBER" },
            "disclaimer": { "type": "STRING" }
        },
        "required": ["estimatedNetIncome", "estimatedTotalTax", "disclaimer"]
    })
}

fn tax_prompt(profile: &TaxProfile) -> String {
    format!(
        "Estimate the monthly net (take-home) income for a person living in {} \
         with a gross monthly income of {:.2}, filing as {}. \
         Account for the federal, state, and local taxes that typically apply.",
        profile.location, profile.gross_monthly_income, profile.filing_status
    )
}

fn analysis_prompt(context: &AnalysisContext) -> String {
    let mut prompt = format!(
        "Write a short, encouraging budget review for a person living in {}.\n\
         Gross monthly income: {:.2}\n\
         Estimated net income: {:.2}\n\
         Monthly expenses:\n",
        context.location, context.gross_income, context.net_income
    );
    for expense in &context.expenses {
        match parse_amount(&expense.amount) {
            Some(amount) => prompt.push_str(&format!("- {}: {:.2}\n", expense.name, amount)),
            None => prompt.push_str(&format!("- {}: {}\n", expense.name, expense.amount)),
        }
    }
    prompt.push_str(&format!(
        "Total expenses: {:.2}\n\
         Remaining balance: {:.2}\n\
         Keep it under 120 words and suggest one concrete improvement.",
        context.total_expenses, context.remaining_balance
    ));
    prompt
}

#[async_trait]
impl TaxEstimator for GeminiEstimator {
    #[instrument(
        name = "GeminiTaxEstimate",
        skip(self, profile),
        fields(location = %profile.location)
    )]
    async fn estimate_net_income(
        &self,
        profile: &TaxProfile,
    ) -> Result<TaxEstimate, EstimationError> {
        let config = json!({
            "responseMimeType": "application/json",
            "responseSchema": tax_response_schema()
        });

        let text = self.generate(tax_prompt(profile), Some(config)).await?;
        let payload: TaxEstimatePayload = serde_json::from_str(&text)
            .map_err(|e| EstimationError::Malformed(format!("tax estimate payload: {e}")))?;

        debug!(
            net_income = payload.estimated_net_income,
            total_tax = payload.estimated_total_tax,
            "Received tax estimate"
        );

        Ok(TaxEstimate {
            net_income: payload.estimated_net_income,
            total_tax: payload.estimated_total_tax,
            disclaimer: payload.disclaimer,
        })
    }
}

#[async_trait]
impl BudgetAnalyst for GeminiEstimator {
    #[instrument(
        name = "GeminiBudgetAnalysis",
        skip(self, context),
        fields(location = %context.location)
    )]
    async fn analyze_budget(&self, context: &AnalysisContext) -> Result<String, EstimationError> {
        let text = self.generate(analysis_prompt(context), None).await?;
        if text.trim().is_empty() {
            return Err(EstimationError::Empty);
        }
        Ok(text)
    }
}
