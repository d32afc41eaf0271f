// ============================================================
// Layer 4b — NHTSA HTTP Client
// ============================================================
// Blocking reqwest client for the four NHTSA endpoints the
// harvester walks. Every call carries a bounded timeout and an
// identifying user agent; every response body is expected to be
// `{"results": [...]}` where a missing key means empty.
//
// Errors here are real errors — the fail-soft policy (log and
// treat as zero results) belongs to the harvester, which also
// owns the optional retry knob's semantics. The client just
// re-issues the request `retries` extra times before giving up.
//
// Reference: api.nhtsa.gov products/complaints endpoints

use anyhow::{Context, Result};
use std::time::Duration;

use crate::domain::complaint::{ComplaintRecord, MakeRow, VehicleKey, VehicleRow};
use crate::domain::traits::VehicleApi;

const BASE_URL:   &str = "https://api.nhtsa.gov";
const USER_AGENT: &str = concat!("complaints-classifier/", env!("CARGO_PKG_VERSION"));

pub struct NhtsaClient {
    client:  reqwest::blocking::Client,
    base:    String,
    retries: usize,
}

impl NhtsaClient {
    pub fn new(timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base: BASE_URL.to_string(),
            retries,
        })
    }

    /// GET `url` and return the `results` array, retrying up to
    /// `self.retries` extra times on any failure.
    fn get_results(&self, url: &str) -> Result<Vec<serde_json::Value>> {
        let mut last_err = None;

        for attempt in 0..=self.retries {
            if attempt > 0 {
                tracing::debug!("Retry {}/{} for {}", attempt, self.retries, url);
            }
            match self.get_results_once(url) {
                Ok(results) => return Ok(results),
                Err(e)      => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request failed: {url}")))
    }

    fn get_results_once(&self, url: &str) -> Result<Vec<serde_json::Value>> {
        let response = self.client.get(url).send()
            .with_context(|| format!("Request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("NHTSA returned {status} for {url}");
        }

        let body: serde_json::Value = response.json()
            .with_context(|| format!("Malformed JSON from {url}"))?;

        // Absence of `results` (or of the key entirely) is empty,
        // not an error — the API does this for unknown vehicles.
        match body.get("results") {
            Some(serde_json::Value::Array(rows)) => Ok(rows.clone()),
            _ => Ok(Vec::new()),
        }
    }

    fn parse_rows<T: serde::de::DeserializeOwned>(rows: Vec<serde_json::Value>) -> Result<Vec<T>> {
        serde_json::from_value(serde_json::Value::Array(rows))
            .context("Unexpected row shape in `results`")
    }
}

impl VehicleApi for NhtsaClient {
    fn model_years(&self) -> Result<Vec<String>> {
        let url  = format!("{}/products/vehicle/modelYears?issueType=c", self.base);
        let rows = self.get_results(&url)?;

        #[derive(serde::Deserialize)]
        struct YearRow {
            #[serde(rename = "modelYear")]
            model_year: String,
        }

        let years: Vec<YearRow> = Self::parse_rows(rows)?;
        Ok(years.into_iter().map(|y| y.model_year).collect())
    }

    fn makes_for_year(&self, model_year: &str) -> Result<Vec<MakeRow>> {
        let url = format!(
            "{}/products/vehicle/makes?modelYear={model_year}&issueType=c",
            self.base
        );
        Self::parse_rows(self.get_results(&url)?)
    }

    fn models_for(&self, model_year: &str, make: &str) -> Result<Vec<VehicleRow>> {
        let url = format!(
            "{}/products/vehicle/models?modelYear={model_year}&make={make}&issueType=c",
            self.base
        );
        Self::parse_rows(self.get_results(&url)?)
    }

    fn complaints_for(&self, vehicle: &VehicleKey) -> Result<Vec<ComplaintRecord>> {
        let url = format!(
            "{}/complaints/complaintsByVehicle?make={}&model={}&modelYear={}",
            self.base, vehicle.make, vehicle.model, vehicle.model_year
        );
        Self::parse_rows(self.get_results(&url)?)
    }
}
