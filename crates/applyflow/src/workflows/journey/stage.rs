//! Journey stage transitions.
//!
//! The machine has no reject states: an event arriving in a stage it does not apply to
//! yields `None` and the caller leaves the stored stage alone.

use super::domain::JourneyStage;
use serde::Serialize;

/// Events the service reports after each applicant action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum StageEvent {
    OnboardingCompleted { first_time: bool },
    ShortlistCreated { shortlist_count: usize },
    UniversityLocked,
    UniversityUnlocked { other_locked_remaining: bool },
}

impl StageEvent {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OnboardingCompleted { .. } => "onboarding_completed",
            Self::ShortlistCreated { .. } => "shortlist_created",
            Self::UniversityLocked => "university_locked",
            Self::UniversityUnlocked { .. } => "university_unlocked",
        }
    }
}

/// Outcome of applying a [`StageEvent`] that the machine accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageTransition {
    pub from: JourneyStage,
    pub to: JourneyStage,
    pub event: StageEvent,
}

impl StageTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Resolve the target stage for `event`, or `None` when the event is a no-op here.
pub fn next_stage(current: JourneyStage, event: StageEvent) -> Option<JourneyStage> {
    match event {
        StageEvent::OnboardingCompleted { first_time: true } => {
            Some(JourneyStage::DiscoveringUniversities)
        }
        StageEvent::OnboardingCompleted { first_time: false } => None,
        StageEvent::ShortlistCreated { shortlist_count: 1 }
            if current == JourneyStage::DiscoveringUniversities =>
        {
            Some(JourneyStage::FinalizingUniversities)
        }
        StageEvent::ShortlistCreated { .. } => None,
        // Applied even when already preparing applications.
        StageEvent::UniversityLocked => Some(JourneyStage::PreparingApplications),
        StageEvent::UniversityUnlocked {
            other_locked_remaining: false,
        } => Some(JourneyStage::FinalizingUniversities),
        StageEvent::UniversityUnlocked {
            other_locked_remaining: true,
        } => None,
    }
}

pub fn transition(current: JourneyStage, event: StageEvent) -> Option<StageTransition> {
    next_stage(current, event).map(|to| StageTransition {
        from: current,
        to,
        event,
    })
}
