mod advisory;
mod config;
mod rules;

pub use config::FitConfig;

use super::domain::{
    ApplicantProfile, ChanceBand, CostBand, FitAdvisory, ReachCategory, University,
};
use serde::{Deserialize, Serialize};

/// Raised when a profile lacks what a heuristic needs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    #[error("profile has no budget range; cost band cannot be estimated")]
    MissingBudget,
}

/// Stateless classifier applying [`FitConfig`] thresholds to a profile/university pair.
#[derive(Debug, Clone, Default)]
pub struct FitClassifier {
    config: FitConfig,
}

impl FitClassifier {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn classify(&self, profile: &ApplicantProfile, university: &University) -> ReachCategory {
        let gaps = rules::requirement_gaps(profile, university, &self.config);
        rules::reach_category(gaps, university, &self.config)
    }

    pub fn estimate_chance(
        &self,
        profile: &ApplicantProfile,
        university: &University,
    ) -> ChanceBand {
        let gaps = rules::requirement_gaps(profile, university, &self.config);
        rules::chance_band(gaps, university, &self.config)
    }

    pub fn estimate_cost(
        &self,
        profile: &ApplicantProfile,
        university: &University,
    ) -> Result<CostBand, FitError> {
        let budget = profile.budget.as_ref().ok_or(FitError::MissingBudget)?;
        Ok(rules::cost_band(budget, university))
    }

    /// Run all three heuristics and render the advisory narratives.
    pub fn assess(
        &self,
        profile: &ApplicantProfile,
        university: &University,
    ) -> Result<FitAssessment, FitError> {
        let gaps = rules::requirement_gaps(profile, university, &self.config);
        let category = rules::reach_category(gaps, university, &self.config);
        let chance = rules::chance_band(gaps, university, &self.config);
        let cost = self.estimate_cost(profile, university)?;

        Ok(FitAssessment {
            category,
            chance,
            cost,
            gpa_gap: gaps.gpa_gap,
            score_gap: gaps.score_gap,
            fit_narrative: advisory::fit_narrative(profile, university, category),
            risk_narrative: advisory::risk_narrative(chance, cost),
        })
    }
}

/// Classifier output for one university, including the gaps it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitAssessment {
    pub category: ReachCategory,
    pub chance: ChanceBand,
    pub cost: CostBand,
    pub gpa_gap: f64,
    pub score_gap: f64,
    pub fit_narrative: String,
    pub risk_narrative: String,
}

impl FitAssessment {
    pub fn advisory(&self) -> FitAdvisory {
        FitAdvisory {
            fit_narrative: self.fit_narrative.clone(),
            risk_narrative: self.risk_narrative.clone(),
            chance: self.chance,
            cost: self.cost,
        }
    }
}
