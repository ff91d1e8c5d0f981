//! Profile strength ratings.
//!
//! Ratings are never edited directly: every mutating entry point calls [`score`] and
//! overwrites the stored triple before persisting the profile.

use super::domain::{ApplicantProfile, ProfileStrength, StrengthRating};

const STRONG_GPA: f64 = 3.5;
const AVERAGE_GPA: f64 = 3.0;

pub fn score(profile: &ApplicantProfile) -> ProfileStrength {
    let academic = academic_rating(profile.academics.gpa);
    let exam = exam_rating(profile.exams.completed_count());
    let overall = overall_rating(academic, exam);

    ProfileStrength {
        academic,
        exam,
        overall,
    }
}

/// Recompute and overwrite the stored ratings in place.
pub fn rescore(profile: &mut ApplicantProfile) -> ProfileStrength {
    let strength = score(profile);
    profile.strength = Some(strength);
    strength
}

pub(crate) fn academic_rating(gpa: Option<f64>) -> StrengthRating {
    match gpa {
        Some(gpa) if gpa >= STRONG_GPA => StrengthRating::Strong,
        Some(gpa) if gpa >= AVERAGE_GPA => StrengthRating::Average,
        Some(_) => StrengthRating::Weak,
        None => StrengthRating::Average,
    }
}

pub(crate) fn exam_rating(completed: usize) -> StrengthRating {
    match completed {
        0 => StrengthRating::Weak,
        1 => StrengthRating::Average,
        _ => StrengthRating::Strong,
    }
}

pub(crate) fn overall_rating(academic: StrengthRating, exam: StrengthRating) -> StrengthRating {
    let ratings = [academic, exam];
    let strong = ratings
        .iter()
        .filter(|rating| **rating == StrengthRating::Strong)
        .count();
    let weak = ratings
        .iter()
        .filter(|rating| **rating == StrengthRating::Weak)
        .count();

    if strong >= 2 {
        StrengthRating::Strong
    } else if weak >= 2 {
        StrengthRating::Weak
    } else {
        StrengthRating::Average
    }
}
