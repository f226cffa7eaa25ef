use player_core::Position;

/// Aggregated view of where the learner is in a course, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    pub position: Position,
    pub total_modules: usize,
    pub total_lessons: usize,
    /// In-progress percent for the current position (capped at 90).
    pub percent: u8,
    pub is_first_lesson: bool,
    pub is_last_lesson: bool,
    pub is_empty: bool,
}
