use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use db::models::workout_routine::WorkoutRoutine;

/// Least-recently-used ordering: never-used routines come first (newest
/// created ahead), then ascending last-used.
fn least_recently_used<'a, I>(routines: I) -> Option<&'a WorkoutRoutine>
where
    I: Iterator<Item = &'a WorkoutRoutine>,
{
    let mut candidates: Vec<&WorkoutRoutine> = routines.collect();
    candidates.sort_by(|a, b| match (a.last_used, b.last_used) {
        (None, None) => b.created_at.cmp(&a.created_at),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_used), Some(b_used)) => a_used.cmp(&b_used),
    });
    candidates.first().copied()
}

/// Picks today's suggested routine. With no exercise logged yet the pick
/// is simply the least recently used routine; once something was done the
/// categories already trained today are excluded first.
pub fn suggest_routine<'a>(
    routines: &'a [WorkoutRoutine],
    has_exercised_today: bool,
    today: NaiveDate,
) -> Option<&'a WorkoutRoutine> {
    if routines.is_empty() {
        return None;
    }

    if !has_exercised_today {
        return least_recently_used(routines.iter());
    }

    let trained_today: HashSet<&str> = routines
        .iter()
        .filter(|routine| {
            routine
                .last_used
                .is_some_and(|used| used.date_naive() == today)
        })
        .map(|routine| routine.category.as_str())
        .collect();

    least_recently_used(
        routines
            .iter()
            .filter(|routine| !trained_today.contains(routine.category.as_str())),
    )
    .or_else(|| least_recently_used(routines.iter()))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use db::types::RoutineDifficulty;
    use uuid::Uuid;

    use super::*;

    fn routine(
        name: &str,
        category: &str,
        created_at: DateTime<Utc>,
        last_used: Option<DateTime<Utc>>,
    ) -> WorkoutRoutine {
        WorkoutRoutine {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            difficulty: RoutineDifficulty::Intermediate,
            exercises: Vec::new(),
            is_template: false,
            last_used,
            times_used: 0,
            created_at,
            updated_at: created_at,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_list_yields_no_suggestion() {
        assert!(suggest_routine(&[], false, at(2025, 6, 2).date_naive()).is_none());
    }

    #[test]
    fn never_used_routines_are_preferred_newest_first() {
        let routines = vec![
            routine("Old", "Upper Body", at(2025, 5, 1), None),
            routine("New", "Lower Body", at(2025, 5, 20), None),
            routine("Used", "Core", at(2025, 4, 1), Some(at(2025, 6, 1))),
        ];

        let pick = suggest_routine(&routines, false, at(2025, 6, 2).date_naive()).unwrap();
        assert_eq!(pick.name, "New");
    }

    #[test]
    fn least_recently_used_wins_when_all_used() {
        let routines = vec![
            routine("A", "Upper Body", at(2025, 5, 1), Some(at(2025, 6, 1))),
            routine("B", "Lower Body", at(2025, 5, 1), Some(at(2025, 5, 20))),
        ];

        let pick = suggest_routine(&routines, false, at(2025, 6, 2).date_naive()).unwrap();
        assert_eq!(pick.name, "B");
    }

    #[test]
    fn categories_trained_today_are_skipped() {
        let today = at(2025, 6, 2);
        let routines = vec![
            routine("Upper", "Upper Body", at(2025, 5, 1), Some(today)),
            routine("Lower", "Lower Body", at(2025, 5, 1), Some(at(2025, 5, 20))),
        ];

        let pick = suggest_routine(&routines, true, today.date_naive()).unwrap();
        assert_eq!(pick.name, "Lower");
    }

    #[test]
    fn falls_back_when_every_category_was_trained() {
        let today = at(2025, 6, 2);
        let earlier_today = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let routines = vec![
            routine("Upper", "Upper Body", at(2025, 5, 1), Some(earlier_today)),
            routine("Core", "Core", at(2025, 5, 1), Some(today)),
        ];

        let pick = suggest_routine(&routines, true, today.date_naive()).unwrap();
        assert_eq!(pick.name, "Upper");
    }
}
