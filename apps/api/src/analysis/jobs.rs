//! Job catalog — a fixed list of job titles, each with the keywords that signal it.
//!
//! Scoring is a percentage heuristic: the share of a job's keywords present in the
//! resume's skill set. No weighting, no synonyms.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::pos::tag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub title: String,
    pub keywords: Vec<String>,
}

/// A job scored against one resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub title: String,
    /// 0.0 – 100.0
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub total_keywords: usize,
}

#[derive(Debug, Clone)]
pub struct JobCatalog {
    jobs: Vec<JobProfile>,
}

const BUILTIN_CATALOG: &[(&str, &[&str])] = &[
    (
        "Software Developer",
        &[
            "python",
            "java",
            "javascript",
            "rust",
            "c++",
            "git",
            "sql",
            "api",
            "software",
            "programming",
            "testing",
            "linux",
        ],
    ),
    (
        "Data Scientist",
        &[
            "python",
            "statistics",
            "machine learning",
            "pandas",
            "numpy",
            "tensorflow",
            "sql",
            "data",
            "analysis",
            "visualization",
            "modeling",
        ],
    ),
    (
        "System Analyst",
        &[
            "systems",
            "analysis",
            "requirements",
            "uml",
            "sql",
            "documentation",
            "erp",
            "networking",
            "troubleshooting",
            "workflow",
        ],
    ),
    (
        "Marketing",
        &[
            "marketing",
            "seo",
            "branding",
            "campaigns",
            "social media",
            "analytics",
            "content",
            "advertising",
            "strategy",
            "communication",
        ],
    ),
];

impl JobCatalog {
    pub fn builtin() -> Self {
        let jobs = BUILTIN_CATALOG
            .iter()
            .map(|(title, keywords)| JobProfile {
                title: (*title).to_string(),
                keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            })
            .collect();
        Self { jobs }
    }

    /// Validates and normalizes a catalog: keywords are trimmed, lowercased and deduplicated.
    pub fn new(jobs: Vec<JobProfile>) -> Result<Self> {
        if jobs.is_empty() {
            bail!("job catalog must contain at least one job");
        }
        let mut normalized = Vec::with_capacity(jobs.len());
        for job in jobs {
            let title = job.title.trim().to_string();
            if title.is_empty() {
                bail!("job catalog entries must have a non-empty title");
            }
            let mut keywords: Vec<String> = Vec::new();
            for keyword in job.keywords {
                let keyword = keyword.split_whitespace().collect::<Vec<_>>().join(" ");
                let keyword = keyword.to_lowercase();
                if !keyword.is_empty() && !keywords.contains(&keyword) {
                    keywords.push(keyword);
                }
            }
            if keywords.is_empty() {
                bail!("job '{title}' has no keywords");
            }
            for keyword in keywords.iter().filter(|k| !is_extractable(k)) {
                warn!(
                    "Keyword '{keyword}' of job '{title}' is not tagged as a noun and will rarely match"
                );
            }
            normalized.push(JobProfile { title, keywords });
        }
        Ok(Self { jobs: normalized })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let jobs: Vec<JobProfile> =
            serde_json::from_str(json).context("job catalog is not a JSON array of jobs")?;
        Self::new(jobs)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read job catalog {}", path.display()))?;
        let catalog = Self::from_json(&raw)
            .with_context(|| format!("Invalid job catalog {}", path.display()))?;
        info!(
            "Loaded {} jobs from catalog {}",
            catalog.jobs.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn jobs(&self) -> &[JobProfile] {
        &self.jobs
    }

    /// Scores every job in catalog order.
    pub fn score(&self, skills: &BTreeSet<String>) -> Vec<JobMatch> {
        self.jobs.iter().map(|job| score_job(job, skills)).collect()
    }

    /// Jobs with at least one matched keyword, best first. Ties keep catalog order.
    pub fn recommend(&self, skills: &BTreeSet<String>) -> Vec<JobMatch> {
        let mut matches: Vec<JobMatch> = self
            .score(skills)
            .into_iter()
            .filter(|m| m.score > 0.0)
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }
}

fn score_job(job: &JobProfile, skills: &BTreeSet<String>) -> JobMatch {
    let matched_keywords: Vec<String> = job
        .keywords
        .iter()
        .filter(|keyword| keyword_present(keyword, skills))
        .cloned()
        .collect();

    let total_keywords = job.keywords.len();
    let score = if total_keywords == 0 {
        0.0
    } else {
        matched_keywords.len() as f64 / total_keywords as f64 * 100.0
    };

    JobMatch {
        title: job.title.clone(),
        score,
        matched_keywords,
        total_keywords,
    }
}

/// Multi-word keywords match when every word is among the skills.
fn keyword_present(keyword: &str, skills: &BTreeSet<String>) -> bool {
    keyword
        .split_whitespace()
        .all(|word| skills.contains(word))
}

/// Skills are nouns, so a keyword can only match if every word of it tags as one.
fn is_extractable(keyword: &str) -> bool {
    keyword
        .split_whitespace()
        .all(|word| tag(word).iter().all(|token| token.pos.is_nominal()))
}
