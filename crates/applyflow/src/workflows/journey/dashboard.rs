use super::domain::{
    ApplicantProfile, DerivedDocument, DerivedTask, JourneyStage, ShortlistEntry, University,
};
use serde::Serialize;

/// A locked shortlist entry with the open work attached to it.
#[derive(Debug, Clone, Serialize)]
pub struct CommittedUniversity {
    pub entry: ShortlistEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<University>,
    pub tasks: Vec<DerivedTask>,
    pub documents: Vec<DerivedDocument>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyDashboard {
    pub stage: JourneyStage,
    pub stage_label: &'static str,
    pub profile: ApplicantProfile,
    pub open_tasks: Vec<DerivedTask>,
    pub shortlist: Vec<ShortlistEntry>,
    pub locked_count: usize,
    pub committed: Vec<CommittedUniversity>,
}

impl JourneyDashboard {
    pub(crate) fn new(
        profile: ApplicantProfile,
        open_tasks: Vec<DerivedTask>,
        shortlist: Vec<ShortlistEntry>,
        committed: Vec<CommittedUniversity>,
    ) -> Self {
        Self {
            stage: profile.stage,
            stage_label: profile.stage.label(),
            locked_count: committed.len(),
            profile,
            open_tasks,
            shortlist,
            committed,
        }
    }
}
