use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use db::{models::chore::Chore, types::ChoreFrequency};

fn weekday_matches(chore: &Chore, today: NaiveDate) -> bool {
    // 0 = Sunday .. 6 = Saturday, matching the stored weekday fields.
    let weekday = today.weekday().num_days_from_sunday() as i32;
    if let Some(days) = &chore.days_of_week
        && !days.is_empty()
    {
        return days.contains(&weekday);
    }
    chore.day_of_week == Some(weekday)
}

/// Whether a recurring chore is scheduled for the given calendar day.
pub fn is_due_on(chore: &Chore, today: NaiveDate) -> bool {
    if chore.frequency == ChoreFrequency::Daily {
        return true;
    }

    if let Some(start) = chore.start_date
        && start > today
    {
        return false;
    }

    match chore.frequency {
        ChoreFrequency::Daily => true,
        ChoreFrequency::Weekly => weekday_matches(chore, today),
        ChoreFrequency::Biweekly => {
            if !weekday_matches(chore, today) {
                return false;
            }
            // Effective start: explicit start date, else creation date.
            let start = chore
                .start_date
                .unwrap_or_else(|| chore.created_at.date_naive());
            let weeks_since_start = (today - start).num_days().div_euclid(7);
            weeks_since_start % 2 == 0
        }
        // Day-of-month 29-31 is not adjusted for short months; such chores
        // simply never come due in months without that day.
        ChoreFrequency::Monthly => chore.day_of_month == Some(today.day() as i32),
    }
}

/// Whether a completed chore's completion flag has expired for its period
/// and should be cleared on fetch. History is never touched by this.
pub fn completion_expired(
    frequency: ChoreFrequency,
    last_completed: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    match frequency {
        ChoreFrequency::Daily => last_completed.date_naive() != now.date_naive(),
        ChoreFrequency::Weekly => now.signed_duration_since(last_completed) > Duration::days(7),
        ChoreFrequency::Biweekly => now.signed_duration_since(last_completed) > Duration::days(14),
        ChoreFrequency::Monthly => {
            last_completed.month() != now.month() || last_completed.year() != now.year()
        }
    }
}
