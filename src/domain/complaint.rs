// ============================================================
// Layer 3 — Complaint Domain Types
// ============================================================
// Raw records as they come off the NHTSA API, plus the vehicle
// identity tuples the harvester enumerates on its way to them.
//
// The hierarchy walked by the harvester is:
//   model year → {modelYear, make} → {modelYear, make, model}
// and finally one complaints query per complete triple.
//
// ComplaintRecord is never mutated after harvest — the dataset
// builder only filters, deduplicates and re-labels into derived
// LabeledExamples.
//
// Reference: NHTSA products/complaints API
//            Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A {modelYear, make} pair from the makes endpoint.
/// Fields are optional because the API occasionally returns
/// rows with missing values; incomplete rows are dropped
/// before the next stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeRow {
    #[serde(rename = "modelYear")]
    pub model_year: Option<String>,
    pub make:       Option<String>,
}

/// A {modelYear, make, model} row from the models endpoint,
/// before null-dropping and deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRow {
    #[serde(rename = "modelYear")]
    pub model_year: Option<String>,
    pub make:       Option<String>,
    pub model:      Option<String>,
}

impl VehicleRow {
    /// Keep only rows with every field present.
    pub fn complete(self) -> Option<VehicleKey> {
        Some(VehicleKey {
            model_year: self.model_year?,
            make:       self.make?,
            model:      self.model?,
        })
    }
}

/// Identifies one vehicle population — unique per harvested triple.
/// Used as the query parameter set for the complaints endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleKey {
    #[serde(rename = "modelYear")]
    pub model_year: String,
    pub make:       String,
    pub model:      String,
}

/// One consumer-submitted defect report from the complaints endpoint.
///
/// Only the four fields the dataset builder projects on are typed;
/// everything else the API returns is carried through untouched in
/// `extra` so the raw JSON store stays lossless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    /// Unique external id assigned by NHTSA
    #[serde(rename = "odiNumber")]
    pub odi_number: Option<u64>,

    /// Filing date, `MM/DD/YYYY`
    #[serde(rename = "dateComplaintFiled")]
    pub date_complaint_filed: Option<String>,

    /// Free-text category label, e.g. "SERVICE BRAKES"
    pub components: Option<String>,

    /// Free-text complaint narrative
    pub summary: Option<String>,

    /// All other API fields, passed through as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ComplaintRecord {
    /// Convenience constructor used by tests and synthetic fixtures.
    pub fn new(
        odi_number: u64,
        date_complaint_filed: impl Into<String>,
        components: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            odi_number:           Some(odi_number),
            date_complaint_filed: Some(date_complaint_filed.into()),
            components:           Some(components.into()),
            summary:              Some(summary.into()),
            extra:                serde_json::Map::new(),
        }
    }
}
