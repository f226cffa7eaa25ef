use serde::{Deserialize, Serialize};

use crate::navigator::Position;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of an enrollment, as the backend stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Server-held bookmark for one learner-course pair.
///
/// Owned by the enrollment backend; the player only reads it to resume and
/// writes it through the update-progress endpoint. Index fields may be absent
/// on enrollments created before bookmarking existed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub progress: u8,
    pub status: ProgressStatus,
    #[serde(default)]
    pub last_module_index: Option<usize>,
    #[serde(default)]
    pub last_lesson_index: Option<usize>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub certificate_id: Option<String>,
}

impl ProgressRecord {
    /// The bookmarked position, when both indices are present.
    ///
    /// The caller still has to bounds-check the position against the current
    /// course: a stale bookmark (course shrank since it was written) is a
    /// collaborator-side artifact the navigator must not trust.
    #[must_use]
    pub fn resume_position(&self) -> Option<Position> {
        Some(Position::new(
            self.last_module_index?,
            self.last_lesson_index?,
        ))
    }
}

//
// ─── PERCENT CALCULATION ───────────────────────────────────────────────────────
//

/// Progress percent reported on a save.
///
/// `round((module_index + 1) / total_modules * 100)`, capped at 90 until the
/// course is completed, then forced to 100. An empty course reports 0.
#[must_use]
pub fn progress_percent(
    module_index: usize,
    total_modules: usize,
    status: ProgressStatus,
) -> u8 {
    if status == ProgressStatus::Completed {
        return 100;
    }
    if total_modules == 0 {
        return 0;
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let raw = ((module_index + 1) as f64 / total_modules as f64 * 100.0).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        raw.clamp(0.0, 90.0) as u8
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_backend_wire_strings() {
        assert_eq!(
            serde_json::to_string(&ProgressStatus::InProgress).unwrap(),
            r#""in-progress""#
        );
        assert_eq!(
            serde_json::to_string(&ProgressStatus::Completed).unwrap(),
            r#""completed""#
        );
    }

    #[test]
    fn percent_rounds_forward_by_module() {
        assert_eq!(progress_percent(2, 5, ProgressStatus::InProgress), 60);
        assert_eq!(progress_percent(0, 3, ProgressStatus::InProgress), 33);
    }

    #[test]
    fn percent_caps_at_ninety_until_completed() {
        assert_eq!(progress_percent(4, 5, ProgressStatus::InProgress), 90);
        assert_eq!(progress_percent(4, 5, ProgressStatus::Completed), 100);
    }

    #[test]
    fn percent_handles_empty_course() {
        assert_eq!(progress_percent(0, 0, ProgressStatus::InProgress), 0);
    }

    #[test]
    fn resume_position_requires_both_indices() {
        let record = ProgressRecord {
            progress: 40,
            status: ProgressStatus::InProgress,
            last_module_index: Some(1),
            last_lesson_index: Some(2),
            score: None,
            certificate_id: None,
        };
        assert_eq!(record.resume_position(), Some(Position::new(1, 2)));

        let legacy = ProgressRecord {
            last_lesson_index: None,
            ..record
        };
        assert_eq!(legacy.resume_position(), None);
    }

    #[test]
    fn decodes_backend_enrollment_payload() {
        let record: ProgressRecord = serde_json::from_str(
            r#"{
                "progress": 60,
                "status": "in-progress",
                "last_module_index": 2,
                "last_lesson_index": 0,
                "score": 0.0,
                "certificate_id": null
            }"#,
        )
        .unwrap();

        assert_eq!(record.progress, 60);
        assert_eq!(record.status, ProgressStatus::InProgress);
        assert_eq!(record.resume_position(), Some(Position::new(2, 0)));
    }
}
