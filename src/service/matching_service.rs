// service/matching_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    db::{db::DBClient, jobdb::JobExt},
    models::{jobmodel::Job, usermodel::User},
    service::error::ServiceError,
};

pub const SKILL_POINTS: f64 = 10.0;
pub const LOCATION_POINTS: f64 = 3.0;
pub const RECENCY_MAX_BONUS: f64 = 5.0;
pub const DEFAULT_MATCH_LIMIT: usize = 10;
pub const FALLBACK_CAP: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job: Job,
    pub score: f64,
    pub matching_skills: Vec<String>,
    pub location_match: bool,
    pub recency_days: i64,
}

/// Linear decay from 5 to 0 over ten days.
fn recency_bonus(age_in_days: i64) -> f64 {
    (RECENCY_MAX_BONUS - age_in_days as f64 / 2.0).max(0.0)
}

fn score_job(job: &Job, worker_skills: &[String], barangay: &str, now: DateTime<Utc>) -> JobMatch {
    let matching_skills: Vec<String> = job
        .required_skills
        .iter()
        .filter(|s| worker_skills.iter().any(|w| w == *s))
        .cloned()
        .collect();
    let location_match = job.barangay == barangay;
    let recency_days = job.age_in_days(now);

    let score = SKILL_POINTS * matching_skills.len() as f64
        + if location_match { LOCATION_POINTS } else { 0.0 }
        + recency_bonus(recency_days);

    JobMatch {
        job: job.clone(),
        score,
        matching_skills,
        location_match,
        recency_days,
    }
}

fn sort_matches(matches: &mut [JobMatch]) {
    // Score descending; ties broken by newest posting, then id, so the
    // ordering is reproducible.
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.job.created_at.cmp(&a.job.created_at))
            .then_with(|| a.job.id.cmp(&b.job.id))
    });
}

/// Rank a pool of open jobs for a worker. Pure; the consistency window is
/// "as of read time" and results are recomputed per call.
///
/// Jobs with no skill overlap are dropped, unless that would leave the
/// worker with nothing while open jobs exist: then a fallback pool scored
/// by location and recency alone is returned, capped at `min(5, limit)`.
/// The degraded match quality of the fallback is intended behavior, not a
/// bug: a worker should always see something while open jobs exist.
pub fn rank_jobs(
    open_jobs: &[Job],
    worker_skills: &[String],
    barangay: &str,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<JobMatch> {
    // No recommendations without a skills profile.
    if worker_skills.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<JobMatch> = open_jobs
        .iter()
        .map(|job| score_job(job, worker_skills, barangay, now))
        .filter(|m| !m.matching_skills.is_empty())
        .collect();

    if matches.is_empty() && !open_jobs.is_empty() {
        let mut fallback: Vec<JobMatch> = open_jobs
            .iter()
            .map(|job| score_job(job, &[], barangay, now))
            .collect();
        sort_matches(&mut fallback);
        fallback.truncate(FALLBACK_CAP.min(limit));
        return fallback;
    }

    sort_matches(&mut matches);
    matches.truncate(limit);
    matches
}

#[derive(Debug, Clone)]
pub struct MatchingService {
    db_client: Arc<DBClient>,
}

impl MatchingService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn find_matching_jobs(
        &self,
        worker: &User,
        limit: usize,
    ) -> Result<Vec<JobMatch>, ServiceError> {
        if worker.skills.is_empty() {
            return Ok(Vec::new());
        }

        let open_jobs = self.db_client.get_open_jobs().await?;

        // Never recommend the worker's own postings.
        let pool: Vec<_> = open_jobs
            .into_iter()
            .filter(|j| j.employer_id != worker.id)
            .collect();

        Ok(rank_jobs(
            &pool,
            &worker.skills,
            &worker.barangay,
            Utc::now(),
            limit,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::jobmodel::JobStatus;
    use bigdecimal::BigDecimal;
    use chrono::Duration;
    use uuid::Uuid;

    fn job(skills: &[&str], barangay: &str, age_days: i64, now: DateTime<Utc>) -> Job {
        Job {
            id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            title: "test job".to_string(),
            description: "test".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            barangay: barangay.to_string(),
            price: BigDecimal::from(500),
            is_open: true,
            status: JobStatus::Open,
            completed: false,
            assigned_to: None,
            payment_proof: None,
            completed_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: now - Duration::days(age_days),
            updated_at: now - Duration::days(age_days),
        }
    }

    fn skills(s: &[&str]) -> Vec<String> {
        s.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_empty_skills_returns_nothing() {
        let now = Utc::now();
        let jobs = vec![job(&["Plumbing"], "Brgy 1", 0, now)];
        assert!(rank_jobs(&jobs, &[], "Brgy 1", now, 10).is_empty());
    }

    #[test]
    fn test_recency_bonus_decay() {
        assert_eq!(recency_bonus(0), 5.0);
        assert_eq!(recency_bonus(4), 3.0);
        assert_eq!(recency_bonus(10), 0.0);
        assert_eq!(recency_bonus(30), 0.0);
    }

    #[test]
    fn test_scoring_formula() {
        let now = Utc::now();
        let j = job(&["Plumbing", "Carpentry"], "Brgy 1", 0, now);
        let m = score_job(&j, &skills(&["Plumbing", "Carpentry"]), "Brgy 1", now);
        // 2 skills * 10 + 3 location + 5 recency
        assert_eq!(m.score, 28.0);
        assert_eq!(m.matching_skills.len(), 2);
        assert!(m.location_match);
    }

    #[test]
    fn test_skill_match_excludes_non_overlapping() {
        // A plumber in Brgy 1 sees the plumbing job only.
        let now = Utc::now();
        let a = job(&["Plumbing"], "Brgy 1", 0, now);
        let b = job(&["Carpentry"], "Brgy 2", 0, now);
        let ranked = rank_jobs(
            &[a.clone(), b],
            &skills(&["Plumbing"]),
            "Brgy 1",
            now,
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].job.id, a.id);
    }

    #[test]
    fn test_fallback_pool_when_no_skill_matches() {
        let now = Utc::now();
        let jobs: Vec<Job> = (0..8).map(|i| job(&["Welding"], "Brgy 1", i, now)).collect();
        let ranked = rank_jobs(&jobs, &skills(&["Plumbing"]), "Brgy 1", now, 10);
        // Non-empty despite zero skill overlap, capped at min(5, limit).
        assert_eq!(ranked.len(), 5);
        assert!(ranked.iter().all(|m| m.matching_skills.is_empty()));
        // Ranked by recency: newest first.
        assert!(ranked[0].recency_days <= ranked[1].recency_days);
    }

    #[test]
    fn test_fallback_respects_small_limit() {
        let now = Utc::now();
        let jobs: Vec<Job> = (0..8).map(|i| job(&["Welding"], "Brgy 1", i, now)).collect();
        let ranked = rank_jobs(&jobs, &skills(&["Plumbing"]), "Brgy 1", now, 3);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_monotonicity_adding_skill_never_lowers_score() {
        let now = Utc::now();
        let j = job(&["Plumbing", "Masonry"], "Brgy 1", 2, now);

        let base = score_job(&j, &skills(&["Plumbing"]), "Brgy 1", now);
        let more = score_job(&j, &skills(&["Plumbing", "Masonry"]), "Brgy 1", now);
        assert!(more.score >= base.score);
        assert_eq!(more.score - base.score, SKILL_POINTS);
    }

    #[test]
    fn test_tiebreak_is_deterministic() {
        let now = Utc::now();
        let mut a = job(&["Plumbing"], "Brgy 1", 1, now);
        let mut b = job(&["Plumbing"], "Brgy 1", 1, now);
        // Same score, same created_at: tie falls through to id ordering.
        b.created_at = a.created_at;
        b.updated_at = a.updated_at;
        if b.id < a.id {
            std::mem::swap(&mut a, &mut b);
        }

        let ranked = rank_jobs(
            &[b.clone(), a.clone()],
            &skills(&["Plumbing"]),
            "Brgy 1",
            now,
            10,
        );
        assert_eq!(ranked[0].job.id, a.id);
        assert_eq!(ranked[1].job.id, b.id);
    }

    #[test]
    fn test_limit_caps_results() {
        let now = Utc::now();
        let jobs: Vec<Job> = (0..20).map(|i| job(&["Plumbing"], "Brgy 1", i % 5, now)).collect();
        let ranked = rank_jobs(&jobs, &skills(&["Plumbing"]), "Brgy 1", now, 10);
        assert_eq!(ranked.len(), 10);
    }
}
