//! WeeklyUpdate - freeform progress post with peer ratings

use crate::entities::UserId;
use crate::value_objects::RatingValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UpdateId = Uuid;

/// One rater's score; at most one per rater per update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rater_id: UserId,
    pub value: RatingValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyUpdate {
    pub id: UpdateId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub ratings: Vec<Rating>,
}

impl WeeklyUpdate {
    /// Compose a new post; blank content yields `None`
    pub fn compose(author_id: &str, content: &str, now: DateTime<Utc>) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: now,
            ratings: Vec::new(),
        })
    }

    /// The viewer's own rating, if any
    pub fn rating_by(&self, rater_id: &str) -> Option<RatingValue> {
        self.ratings
            .iter()
            .find(|r| r.rater_id == rater_id)
            .map(|r| r.value)
    }

    /// Highlighted stars for `viewer`: star `n` is lit when the viewer's own
    /// rating is at least `n`; other raters never affect it
    pub fn star_states(&self, viewer_id: &str) -> [bool; 5] {
        let own = self.rating_by(viewer_id).map_or(0, |v| v.value());
        std::array::from_fn(|i| (i as u8) < own)
    }

    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|r| u32::from(r.value.value())).sum();
        Some(f64::from(sum) / self.ratings.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(rater: &str, value: i64) -> Rating {
        Rating {
            rater_id: rater.to_string(),
            value: RatingValue::new(value).unwrap(),
        }
    }

    #[test]
    fn test_compose_rejects_blank_content() {
        assert!(WeeklyUpdate::compose("u1", "", Utc::now()).is_none());
        assert!(WeeklyUpdate::compose("u1", "  \n\t", Utc::now()).is_none());

        let update = WeeklyUpdate::compose("u1", "progress!", Utc::now()).unwrap();
        assert_eq!(update.content, "progress!");
        assert!(update.ratings.is_empty());
    }

    #[test]
    fn test_star_states_follow_viewer_only() {
        let mut update = WeeklyUpdate::compose("u1", "week 3", Utc::now()).unwrap();
        update.ratings.push(rating("u2", 5));
        update.ratings.push(rating("u3", 2));

        assert_eq!(update.star_states("u3"), [true, true, false, false, false]);
        assert_eq!(update.star_states("u4"), [false; 5]);
    }

    #[test]
    fn test_average_rating() {
        let mut update = WeeklyUpdate::compose("u1", "week 4", Utc::now()).unwrap();
        assert_eq!(update.average_rating(), None);
        update.ratings.push(rating("u2", 4));
        update.ratings.push(rating("u3", 1));
        assert_eq!(update.average_rating(), Some(2.5));
    }
}
