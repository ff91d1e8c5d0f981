use serde::{Deserialize, Serialize};

/// Thresholds behind the reach, chance, and cost heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// GPA assumed when the applicant or the university leaves it blank.
    pub baseline_gpa: f64,
    /// Standardized-test score assumed when either side leaves it blank.
    pub baseline_test_score: f64,
    /// Acceptance rates (percent) below this are always a reach.
    pub highly_selective_rate: f64,
    /// Acceptance rates (percent) below this cap the chance at medium.
    pub selective_rate: f64,
    pub dream_gpa_gap: f64,
    pub dream_score_gap: f64,
    pub safe_gpa_gap: f64,
    pub safe_score_gap: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            baseline_gpa: 3.0,
            baseline_test_score: 300.0,
            highly_selective_rate: 10.0,
            selective_rate: 30.0,
            dream_gpa_gap: -0.2,
            dream_score_gap: -10.0,
            safe_gpa_gap: 0.3,
            safe_score_gap: 20.0,
        }
    }
}
