//! Biomarker assessment data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A biomarker/lifestyle assessment submitted for screening.
///
/// Fields mirror the OASIS longitudinal columns the tabular classifier was
/// trained on, in the post-cleaning column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomarkerAssessment {
    /// Patient or assessment identifier supplied by the caller
    pub assessment_id: String,

    /// Sex (0 = female, 1 = male)
    #[serde(alias = "M/F")]
    pub sex: i32,

    /// Age in years
    #[serde(alias = "Age")]
    pub age: i32,

    /// Years of education
    #[serde(alias = "EDUC")]
    pub education_years: i32,

    /// Socioeconomic status (1 = highest, 5 = lowest)
    #[serde(alias = "SES")]
    pub ses: f64,

    /// Mini-Mental State Examination score (0-30)
    #[serde(alias = "MMSE")]
    pub mmse: f64,

    /// Estimated total intracranial volume (mm^3)
    #[serde(alias = "eTIV")]
    pub etiv: f64,

    /// Normalized whole-brain volume
    #[serde(alias = "nWBV")]
    pub nwbv: f64,

    /// Atlas scaling factor
    #[serde(alias = "ASF")]
    pub asf: f64,

    /// Submission timestamp (optional, defaults to now)
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl BiomarkerAssessment {
    /// Create an assessment with required fields and neutral defaults
    pub fn new(assessment_id: String, age: i32, mmse: f64) -> Self {
        Self {
            assessment_id,
            sex: 0,
            age,
            education_years: 12,
            ses: 2.0,
            mmse,
            etiv: 1500.0,
            nwbv: 0.74,
            asf: 1.2,
            timestamp: Utc::now(),
        }
    }
}
