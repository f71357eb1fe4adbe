//! Per-subject study progress.
//!
//! Progress is the share of a subject's topics marked completed. Topics that
//! are merely in progress count toward the total only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub subject_id: i64,
    pub total_topics: u32,
    pub completed_topics: u32,
    /// 0.0 ..= 1.0; 0.0 for a subject without topics.
    pub ratio: f32,
}

impl SubjectProgress {
    pub fn from_statuses<I>(subject_id: i64, statuses: I) -> Self
    where
        I: IntoIterator<Item = TopicStatus>,
    {
        let (total_topics, completed_topics) =
            statuses
                .into_iter()
                .fold((0u32, 0u32), |(total, done), status| {
                    let done = done + u32::from(status == TopicStatus::Completed);
                    (total + 1, done)
                });
        Self {
            subject_id,
            total_topics,
            completed_topics,
            ratio: ratio(completed_topics, total_topics),
        }
    }

    /// Whole percent, rounded down.
    pub fn percent(&self) -> u32 {
        if self.total_topics == 0 {
            return 0;
        }
        self.completed_topics * 100 / self.total_topics
    }
}

/// Progress for every subject in `subject_ids`, in that order.
///
/// `topics` holds `(subject_id, status)` pairs. Subjects without topics get
/// a zero entry.
///
/// # Errors
///
/// Returns `ValidationError::UnknownSubject` if a topic names a subject that
/// is not in `subject_ids`, and `ValidationError::DuplicateSubject` if a
/// subject is listed twice.
pub fn aggregate(
    subject_ids: &[i64],
    topics: &[(i64, TopicStatus)],
) -> Result<Vec<SubjectProgress>, ValidationError> {
    let mut by_subject: BTreeMap<i64, Vec<TopicStatus>> = BTreeMap::new();
    for &subject_id in subject_ids {
        if by_subject.insert(subject_id, Vec::new()).is_some() {
            return Err(ValidationError::DuplicateSubject { subject_id });
        }
    }

    for &(subject_id, status) in topics {
        by_subject
            .get_mut(&subject_id)
            .ok_or(ValidationError::UnknownSubject { subject_id })?
            .push(status);
    }

    Ok(subject_ids
        .iter()
        .map(|id| {
            let statuses = by_subject.remove(id).unwrap_or_default();
            SubjectProgress::from_statuses(*id, statuses)
        })
        .collect())
}

/// Completed share across all subjects, weighted by topic count.
pub fn overall(subjects: &[SubjectProgress]) -> f32 {
    let (done, total) = subjects.iter().fold((0u32, 0u32), |(done, total), s| {
        (done + s.completed_topics, total + s.total_topics)
    });
    ratio(done, total)
}

fn ratio(done: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        done as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TopicStatus::*;

    #[test]
    fn empty_subject_has_zero_progress() {
        let p = SubjectProgress::from_statuses(1, Vec::<TopicStatus>::new());
        assert_eq!(p.total_topics, 0);
        assert_eq!(p.ratio, 0.0);
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn in_progress_counts_toward_total_only() {
        let p = SubjectProgress::from_statuses(1, [Completed, InProgress, Pending, Completed]);
        assert_eq!(p.total_topics, 4);
        assert_eq!(p.completed_topics, 2);
        assert_eq!(p.ratio, 0.5);
        assert_eq!(p.percent(), 50);
    }

    #[test]
    fn percent_rounds_down() {
        let p = SubjectProgress::from_statuses(1, [Completed, Pending, Pending]);
        assert_eq!(p.percent(), 33);
    }

    #[test]
    fn aggregate_keeps_subject_order_and_empty_subjects() {
        let topics = [(7, Completed), (3, Pending), (7, Pending), (3, Completed), (3, Completed)];
        let progress = aggregate(&[7, 3, 9], &topics).unwrap();

        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].subject_id, 7);
        assert_eq!(progress[0].completed_topics, 1);
        assert_eq!(progress[1].subject_id, 3);
        assert_eq!(progress[1].completed_topics, 2);
        assert_eq!(progress[1].total_topics, 3);
        assert_eq!(progress[2].total_topics, 0);

        assert_eq!(overall(&progress), 0.6);
    }

    #[test]
    fn aggregate_rejects_orphan_topic() {
        let err = aggregate(&[1], &[(2, Pending)]).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownSubject { subject_id: 2 }));
    }

    #[test]
    fn aggregate_rejects_repeated_subject() {
        let err = aggregate(&[4, 5, 4], &[(4, Completed)]).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateSubject { subject_id: 4 }));
    }

    #[test]
    fn overall_of_nothing_is_zero() {
        assert_eq!(overall(&[]), 0.0);
    }
}
