//! Lesson position arithmetic over an ordered module list.
//!
//! These are total functions: any position is accepted and boundary moves
//! return `None` instead of wrapping or panicking. Modules without lessons
//! are skipped when rolling across module boundaries, so a half-authored
//! course still navigates cleanly.

use serde::{Deserialize, Serialize};

use crate::model::Module;

/// Zero-based (module, lesson) coordinate within a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub module: usize,
    pub lesson: usize,
}

impl Position {
    /// The default starting position for a fresh enrollment.
    pub const START: Position = Position {
        module: 0,
        lesson: 0,
    };

    #[must_use]
    pub fn new(module: usize, lesson: usize) -> Self {
        Self { module, lesson }
    }
}

/// True when the position addresses an existing (module, lesson) pair.
#[must_use]
pub fn contains(modules: &[Module], position: Position) -> bool {
    modules
        .get(position.module)
        .is_some_and(|module| position.lesson < module.lessons.len())
}

/// First navigable lesson, or `None` when no module has lessons.
#[must_use]
pub fn first(modules: &[Module]) -> Option<Position> {
    modules
        .iter()
        .position(|module| !module.lessons.is_empty())
        .map(|index| Position::new(index, 0))
}

/// Last navigable lesson, or `None` when no module has lessons.
#[must_use]
pub fn last(modules: &[Module]) -> Option<Position> {
    modules
        .iter()
        .enumerate()
        .rev()
        .find(|(_, module)| !module.lessons.is_empty())
        .map(|(index, module)| Position::new(index, module.lessons.len() - 1))
}

/// Advance one lesson, rolling into the next non-empty module at a module
/// boundary. `None` at the course's last lesson or for invalid positions.
#[must_use]
pub fn next(modules: &[Module], position: Position) -> Option<Position> {
    let lessons = modules.get(position.module)?.lessons.len();
    if position.lesson + 1 < lessons {
        return Some(Position::new(position.module, position.lesson + 1));
    }

    modules
        .iter()
        .enumerate()
        .skip(position.module + 1)
        .find(|(_, module)| !module.lessons.is_empty())
        .map(|(index, _)| Position::new(index, 0))
}

/// Retreat one lesson, rolling onto the previous non-empty module's last
/// lesson at a module boundary. `None` at the course's first lesson.
#[must_use]
pub fn previous(modules: &[Module], position: Position) -> Option<Position> {
    if position.lesson > 0 && contains(modules, position) {
        return Some(Position::new(position.module, position.lesson - 1));
    }

    let upper = position.module.min(modules.len());
    modules[..upper]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, module)| !module.lessons.is_empty())
        .map(|(index, module)| Position::new(index, module.lessons.len() - 1))
}

/// True at the course's first lesson; drives the disabled "previous" control.
#[must_use]
pub fn is_first(modules: &[Module], position: Position) -> bool {
    first(modules) == Some(position)
}

/// True at the course's last lesson; drives the disabled "next" control.
#[must_use]
pub fn is_last(modules: &[Module], position: Position) -> bool {
    last(modules) == Some(position)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lesson, LessonContent, TextBody};

    fn lesson(title: &str) -> Lesson {
        Lesson {
            title: title.into(),
            content: LessonContent::Text {
                content: TextBody::Html(format!("<p>{title}</p>")),
            },
        }
    }

    fn module(title: &str, lessons: usize) -> Module {
        Module {
            title: title.into(),
            lessons: (0..lessons).map(|i| lesson(&format!("{title}-{i}"))).collect(),
        }
    }

    /// 2 modules, 2 lessons then 1 lesson.
    fn two_module_course() -> Vec<Module> {
        vec![module("M0", 2), module("M1", 1)]
    }

    #[test]
    fn next_rolls_into_following_module() {
        let modules = two_module_course();
        assert_eq!(
            next(&modules, Position::new(0, 1)),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn next_is_noop_at_last_lesson() {
        let modules = two_module_course();
        assert_eq!(next(&modules, Position::new(1, 0)), None);
        assert!(is_last(&modules, Position::new(1, 0)));
    }

    #[test]
    fn previous_rolls_back_onto_prior_module_last_lesson() {
        let modules = two_module_course();
        assert_eq!(
            previous(&modules, Position::new(1, 0)),
            Some(Position::new(0, 1))
        );
    }

    #[test]
    fn previous_is_noop_at_first_lesson() {
        let modules = two_module_course();
        assert_eq!(previous(&modules, Position::new(0, 0)), None);
        assert!(is_first(&modules, Position::new(0, 0)));
    }

    #[test]
    fn next_then_previous_round_trips_interior_positions() {
        let modules = vec![module("M0", 3), module("M1", 1), module("M2", 2)];
        for m in 0..modules.len() {
            for l in 0..modules[m].lessons.len() {
                let start = Position::new(m, l);
                if is_last(&modules, start) {
                    continue;
                }
                let forward = next(&modules, start).unwrap();
                assert_eq!(previous(&modules, forward), Some(start));
            }
        }
    }

    #[test]
    fn navigation_skips_lesson_less_modules() {
        let modules = vec![module("M0", 1), module("empty", 0), module("M2", 1)];
        assert_eq!(
            next(&modules, Position::new(0, 0)),
            Some(Position::new(2, 0))
        );
        assert_eq!(
            previous(&modules, Position::new(2, 0)),
            Some(Position::new(0, 0))
        );
        assert_eq!(first(&modules), Some(Position::new(0, 0)));
        assert_eq!(last(&modules), Some(Position::new(2, 0)));
    }

    #[test]
    fn empty_course_navigates_nowhere() {
        let modules: Vec<Module> = Vec::new();
        assert_eq!(first(&modules), None);
        assert_eq!(last(&modules), None);
        assert_eq!(next(&modules, Position::START), None);
        assert_eq!(previous(&modules, Position::START), None);
        assert!(!contains(&modules, Position::START));
        assert!(!is_first(&modules, Position::START));
        assert!(!is_last(&modules, Position::START));
    }

    #[test]
    fn contains_checks_both_bounds() {
        let modules = two_module_course();
        assert!(contains(&modules, Position::new(0, 1)));
        assert!(!contains(&modules, Position::new(0, 2)));
        assert!(!contains(&modules, Position::new(2, 0)));
    }
}
