//! Achievement evaluation.

use database::achievement::{self, NewAchievement};
use database::{profile, report, Achievement, Database};
use serde::Serialize;
use tracing::info;

use crate::error::Result;

/// What an achievement measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    /// Number of submitted reports.
    Reports,
    /// Leaderboard points.
    Points,
    /// Percentage of reports approved.
    ApprovalRate,
}

struct Definition {
    title: &'static str,
    description: &'static str,
    badge_type: &'static str,
    target: i64,
    metric: Metric,
}

const DEFINITIONS: [Definition; 4] = [
    Definition {
        title: "First Report",
        description: "Submit your first incident report",
        badge_type: "reports",
        target: 1,
        metric: Metric::Reports,
    },
    Definition {
        title: "Guardian Elite",
        description: "Earn 10,000 points",
        badge_type: "points",
        target: 10_000,
        metric: Metric::Points,
    },
    Definition {
        title: "Sharp Eye",
        description: "Keep at least 90% of your reports approved",
        badge_type: "verification",
        target: 90,
        metric: Metric::ApprovalRate,
    },
    Definition {
        title: "Marine Protector",
        description: "Submit 50 incident reports",
        badge_type: "reports",
        target: 50,
        metric: Metric::Reports,
    },
];

/// Result of an achievement check.
#[derive(Debug, Clone, Serialize)]
pub struct AchievementCheck {
    pub achievements: Vec<Achievement>,
    /// Titles earned by this check.
    pub newly_earned: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct UserStats {
    total_reports: i64,
    approved_reports: i64,
    points: i64,
}

impl UserStats {
    fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Reports => self.total_reports as f64,
            Metric::Points => self.points as f64,
            Metric::ApprovalRate => {
                if self.total_reports == 0 {
                    0.0
                } else {
                    self.approved_reports as f64 / self.total_reports as f64 * 100.0
                }
            }
        }
    }
}

/// Recompute a user's achievements from their current stats.
pub async fn check(db: &Database, user_id: &str) -> Result<AchievementCheck> {
    let pool = db.pool();

    let (total_reports, approved_reports) = report::user_report_stats(pool, user_id).await?;
    let points = profile::get_profile(pool, user_id)
        .await?
        .map(|p| p.points)
        .unwrap_or(0);
    let stats = UserStats {
        total_reports,
        approved_reports,
        points,
    };

    let mut newly_earned = Vec::new();

    for definition in &DEFINITIONS {
        let progress = stats.value(definition.metric);
        let earned = progress >= definition.target as f64;

        match achievement::get_achievement(pool, user_id, definition.title).await? {
            None => {
                achievement::insert_achievement(
                    pool,
                    user_id,
                    NewAchievement {
                        title: definition.title,
                        description: definition.description,
                        badge_type: definition.badge_type,
                        target: definition.target,
                        progress,
                        earned,
                    },
                )
                .await?;
                if earned {
                    newly_earned.push(definition.title.to_string());
                }
            }
            Some(existing) if !existing.earned && earned => {
                if achievement::mark_earned(pool, &existing.id, progress).await? {
                    newly_earned.push(definition.title.to_string());
                }
            }
            Some(existing) if existing.progress != progress => {
                achievement::update_progress(pool, &existing.id, progress).await?;
            }
            Some(_) => {}
        }
    }

    if !newly_earned.is_empty() {
        info!(user = %user_id, earned = ?newly_earned, "Achievements unlocked");
    }

    Ok(AchievementCheck {
        achievements: achievement::list_achievements(pool, user_id).await?,
        newly_earned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_rate() {
        let stats = UserStats {
            total_reports: 10,
            approved_reports: 9,
            points: 0,
        };
        assert_eq!(stats.value(Metric::ApprovalRate), 90.0);

        let empty = UserStats {
            total_reports: 0,
            approved_reports: 0,
            points: 0,
        };
        assert_eq!(empty.value(Metric::ApprovalRate), 0.0);
    }
}
