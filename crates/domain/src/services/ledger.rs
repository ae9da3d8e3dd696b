use crate::entities::{AchievementView, EarnedAchievement, ACHIEVEMENT_CATALOG};

/// Merge the static catalog with a user's earned records
///
/// Total over the catalog: every entry appears exactly once, ordered by
/// descending points (ties keep catalog order). Records are expected to
/// belong to a single user; duplicates keep the earliest timestamp.
pub fn merge_achievements(earned: &[EarnedAchievement]) -> Vec<AchievementView> {
    let mut views: Vec<AchievementView> = ACHIEVEMENT_CATALOG
        .iter()
        .map(|def| AchievementView {
            kind: def.kind,
            title: def.title,
            description: def.description,
            points: def.points,
            earned_at: earned
                .iter()
                .filter(|e| e.kind == def.kind)
                .map(|e| e.earned_at)
                .min(),
        })
        .collect();

    views.sort_by(|a, b| b.points.cmp(&a.points));
    views
}

/// Points collected from unlocked achievements
pub fn total_points(views: &[AchievementView]) -> u32 {
    views
        .iter()
        .filter(|v| v.is_unlocked())
        .map(|v| v.points)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AchievementKind;
    use chrono::{Duration, Utc};

    #[test]
    fn test_merge_without_records_is_total() {
        let views = merge_achievements(&[]);
        assert_eq!(views.len(), ACHIEVEMENT_CATALOG.len());
        assert!(views.iter().all(|v| !v.is_unlocked()));
        assert!(views.windows(2).all(|w| w[0].points >= w[1].points));
        assert_eq!(total_points(&views), 0);
    }

    #[test]
    fn test_merge_marks_earned() {
        let now = Utc::now();
        let earned = vec![
            EarnedAchievement {
                user_id: "u1".into(),
                kind: AchievementKind::BlogPosted,
                earned_at: now,
            },
            EarnedAchievement {
                user_id: "u1".into(),
                kind: AchievementKind::BlogPosted,
                earned_at: now - Duration::days(1),
            },
        ];

        let views = merge_achievements(&earned);
        assert_eq!(views.len(), ACHIEVEMENT_CATALOG.len());
        let blog = views
            .iter()
            .find(|v| v.kind == AchievementKind::BlogPosted)
            .unwrap();
        assert_eq!(blog.earned_at, Some(now - Duration::days(1)));
        assert_eq!(views.iter().filter(|v| v.is_unlocked()).count(), 1);
        assert_eq!(total_points(&views), blog.points);
        assert_eq!(views[0].kind, AchievementKind::BestPaper);
    }
}
