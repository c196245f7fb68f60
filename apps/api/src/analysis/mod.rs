pub mod highlight;
pub mod jobs;
pub mod pos;
pub mod skills;

use serde::Serialize;

use crate::analysis::highlight::highlight_keywords;
use crate::analysis::jobs::{JobCatalog, JobMatch};
use crate::analysis::skills::{extract_skills, skill_set, unique_skills};

/// Result of running a resume through skill extraction and job scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub jobs: Vec<JobMatch>,
    pub highlighted: String,
}

pub fn analyze_resume(text: &str, catalog: &JobCatalog) -> ResumeAnalysis {
    let skills = extract_skills(text);
    let jobs = catalog.recommend(&skill_set(&skills));

    let mut matched: Vec<String> = jobs
        .iter()
        .flat_map(|job| job.matched_keywords.iter().cloned())
        .collect();
    matched.sort();
    matched.dedup();

    ResumeAnalysis {
        skills: unique_skills(&skills),
        highlighted: highlight_keywords(text, &matched),
        jobs,
    }
}
