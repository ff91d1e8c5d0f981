use super::super::domain::{
    ApplicantProfile, BudgetRange, ChanceBand, CostBand, ReachCategory, University,
};
use super::config::FitConfig;

/// Applicant-minus-requirement differences after baseline substitution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RequirementGaps {
    pub gpa_gap: f64,
    pub score_gap: f64,
}

impl RequirementGaps {
    pub(crate) fn meets_requirements(&self) -> bool {
        self.gpa_gap >= 0.0 && self.score_gap >= 0.0
    }
}

pub(crate) fn requirement_gaps(
    profile: &ApplicantProfile,
    university: &University,
    config: &FitConfig,
) -> RequirementGaps {
    let applicant_gpa = profile.academics.gpa.unwrap_or(config.baseline_gpa);
    let applicant_score = profile
        .exams
        .graduate_score
        .unwrap_or(config.baseline_test_score);

    let required_gpa = university
        .requirements
        .min_gpa
        .unwrap_or(config.baseline_gpa);
    let required_score = university
        .requirements
        .min_test_score
        .unwrap_or(config.baseline_test_score);

    RequirementGaps {
        gpa_gap: applicant_gpa - required_gpa,
        score_gap: applicant_score - required_score,
    }
}

// Unknown acceptance rates are treated as non-selective.
fn acceptance_rate(university: &University, config: &FitConfig) -> f64 {
    university
        .acceptance_rate
        .unwrap_or(config.selective_rate)
}

pub(crate) fn reach_category(
    gaps: RequirementGaps,
    university: &University,
    config: &FitConfig,
) -> ReachCategory {
    let rate = acceptance_rate(university, config);

    if rate < config.highly_selective_rate
        || gaps.gpa_gap < config.dream_gpa_gap
        || gaps.score_gap < config.dream_score_gap
    {
        ReachCategory::Dream
    } else if gaps.gpa_gap > config.safe_gpa_gap || gaps.score_gap > config.safe_score_gap {
        ReachCategory::Safe
    } else {
        ReachCategory::Target
    }
}

pub(crate) fn chance_band(
    gaps: RequirementGaps,
    university: &University,
    config: &FitConfig,
) -> ChanceBand {
    let rate = acceptance_rate(university, config);
    let meets = gaps.meets_requirements();

    if rate < config.highly_selective_rate {
        if meets {
            ChanceBand::Medium
        } else {
            ChanceBand::Low
        }
    } else if rate < config.selective_rate {
        if meets {
            ChanceBand::High
        } else {
            ChanceBand::Medium
        }
    } else {
        ChanceBand::High
    }
}

pub(crate) fn cost_band(budget: &BudgetRange, university: &University) -> CostBand {
    let average = university.tuition.average();

    if average > budget.max {
        CostBand::High
    } else if average < budget.min {
        CostBand::Low
    } else {
        CostBand::Medium
    }
}
