use super::super::domain::{ApplicantProfile, ChanceBand, CostBand, ReachCategory, University};

pub(crate) fn fit_narrative(
    profile: &ApplicantProfile,
    university: &University,
    category: ReachCategory,
) -> String {
    let field = profile
        .goals
        .field_of_study
        .as_deref()
        .unwrap_or("chosen field");

    format!(
        "This university matches your {field} interests and is located in {}. Your academic profile is well-suited for this {} university.",
        university.country,
        category.label()
    )
}

pub(crate) fn risk_narrative(chance: ChanceBand, cost: CostBand) -> String {
    let mut risks = Vec::new();
    if chance == ChanceBand::Low {
        risks.push("Highly competitive admission.");
    }
    if cost == CostBand::High {
        risks.push("Tuition exceeds your budget range.");
    }

    if risks.is_empty() {
        "No major risks identified.".to_string()
    } else {
        risks.join(" ")
    }
}
