use std::collections::{BTreeSet, HashSet};

use crate::analysis::pos::tag;

/// Every noun and proper noun in `text`, in document order, duplicates kept.
pub fn extract_skills(text: &str) -> Vec<String> {
    tag(text)
        .into_iter()
        .filter(|token| token.pos.is_nominal())
        .map(|token| token.text.to_string())
        .collect()
}

/// First occurrence of each skill, compared case-insensitively.
pub fn unique_skills(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .filter(|skill| seen.insert(normalize_skill(skill)))
        .cloned()
        .collect()
}

/// Lowercased set used for keyword matching.
pub fn skill_set(skills: &[String]) -> BTreeSet<String> {
    skills.iter().map(|s| normalize_skill(s)).collect()
}

fn normalize_skill(skill: &str) -> String {
    let lower = skill.to_lowercase();
    match lower
        .strip_suffix("'s")
        .or_else(|| lower.strip_suffix("\u{2019}s"))
    {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}
