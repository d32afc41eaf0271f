// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// similar to interfaces in Java or abstract classes in Python.
//
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - NhtsaClient implements VehicleApi over HTTP
//   - Tests implement VehicleApi with canned in-memory data
//   - The harvester only sees VehicleApi and works with both
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::complaint::{ComplaintRecord, MakeRow, VehicleKey, VehicleRow};

// ─── VehicleApi ───────────────────────────────────────────────────────────────
/// The four paginated NHTSA endpoints the harvester walks.
///
/// Each method returns the parsed `results` array for one query.
/// A missing `results` key means an empty vec, but transport and
/// parse failures surface as errors — the harvester decides how
/// to tolerate them (fail-soft, one query never aborts siblings).
///
/// Implementations:
///   - NhtsaClient → real HTTP calls with timeout + user agent
///   - (tests)     → mock sources with synthetic records
pub trait VehicleApi {
    /// Stage A: every model year with complaint data available.
    fn model_years(&self) -> Result<Vec<String>>;

    /// Stage B: makes associated with one model year.
    fn makes_for_year(&self, model_year: &str) -> Result<Vec<MakeRow>>;

    /// Stage C: models associated with one {modelYear, make} pair.
    fn models_for(&self, model_year: &str, make: &str) -> Result<Vec<VehicleRow>>;

    /// Stage D: complaints filed against one vehicle population.
    fn complaints_for(&self, vehicle: &VehicleKey) -> Result<Vec<ComplaintRecord>>;
}
