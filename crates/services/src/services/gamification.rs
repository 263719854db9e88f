use chrono::{DateTime, Datelike, Timelike, Utc};
use db::{
    models::user::{Badge, UserStats},
    types::{BadgeTier, ChoreFrequency},
};

/// Points awarded per completion, fixed by frequency when the chore is
/// created.
pub fn points_for_frequency(frequency: ChoreFrequency) -> i64 {
    match frequency {
        ChoreFrequency::Daily => 10,
        ChoreFrequency::Weekly => 25,
        ChoreFrequency::Biweekly => 35,
        ChoreFrequency::Monthly => 50,
    }
}

pub const LEVEL_THRESHOLDS: [i64; 12] = [
    0, 100, 250, 500, 1000, 2000, 3500, 5500, 8000, 12000, 18000, 25000,
];

pub const LEVEL_NAMES: [&str; 12] = [
    "Rookie",
    "Helper",
    "Contributor",
    "Achiever",
    "Star",
    "Champion",
    "Hero",
    "Legend",
    "Master",
    "Grand Master",
    "Elite",
    "Ultimate",
];

/// Highest threshold index not exceeding the point total. Levels are never
/// read back from storage without passing through this.
pub fn level_for_points(total_points: i64) -> i32 {
    let mut level = 0;
    for (index, threshold) in LEVEL_THRESHOLDS.iter().enumerate() {
        if total_points >= *threshold {
            level = index as i32;
        }
    }
    level
}

pub fn level_name(level: i32) -> &'static str {
    LEVEL_NAMES[(level.max(0) as usize).min(LEVEL_NAMES.len() - 1)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCriterion {
    CompletedAtLeast(i64),
    StreakAtLeast(i32),
    LevelAtLeast(i32),
    CompletedBeforeHour(u32),
    CompletedAtOrAfterHour(u32),
    TeamSizeAtLeast(i64),
}

impl BadgeCriterion {
    pub fn is_met(&self, stats: &UserStats, hour: u32, team_size: i64) -> bool {
        match *self {
            BadgeCriterion::CompletedAtLeast(count) => stats.total_completed >= count,
            BadgeCriterion::StreakAtLeast(days) => stats.current_streak >= days,
            BadgeCriterion::LevelAtLeast(level) => stats.level >= level,
            BadgeCriterion::CompletedBeforeHour(limit) => hour < limit,
            BadgeCriterion::CompletedAtOrAfterHour(limit) => hour >= limit,
            BadgeCriterion::TeamSizeAtLeast(size) => team_size >= size,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BadgeSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: BadgeTier,
    pub criterion: BadgeCriterion,
}

impl BadgeSpec {
    pub fn to_badge(&self, earned_at: DateTime<Utc>) -> Badge {
        Badge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            tier: self.tier,
            earned_at,
        }
    }
}

pub const BADGE_CATALOG: &[BadgeSpec] = &[
    BadgeSpec {
        id: "first_chore",
        name: "First Step",
        description: "Complete your first chore",
        icon: "🎯",
        tier: BadgeTier::Bronze,
        criterion: BadgeCriterion::CompletedAtLeast(1),
    },
    BadgeSpec {
        id: "streak_3",
        name: "On a Roll",
        description: "Maintain a 3-day streak",
        icon: "🔥",
        tier: BadgeTier::Bronze,
        criterion: BadgeCriterion::StreakAtLeast(3),
    },
    BadgeSpec {
        id: "streak_7",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "⚡",
        tier: BadgeTier::Silver,
        criterion: BadgeCriterion::StreakAtLeast(7),
    },
    BadgeSpec {
        id: "streak_30",
        name: "Monthly Master",
        description: "Maintain a 30-day streak",
        icon: "🏆",
        tier: BadgeTier::Gold,
        criterion: BadgeCriterion::StreakAtLeast(30),
    },
    BadgeSpec {
        id: "complete_10",
        name: "Getting Started",
        description: "Complete 10 chores",
        icon: "✨",
        tier: BadgeTier::Bronze,
        criterion: BadgeCriterion::CompletedAtLeast(10),
    },
    BadgeSpec {
        id: "complete_50",
        name: "Dedicated",
        description: "Complete 50 chores",
        icon: "💪",
        tier: BadgeTier::Silver,
        criterion: BadgeCriterion::CompletedAtLeast(50),
    },
    BadgeSpec {
        id: "complete_100",
        name: "Centurion",
        description: "Complete 100 chores",
        icon: "🌟",
        tier: BadgeTier::Gold,
        criterion: BadgeCriterion::CompletedAtLeast(100),
    },
    BadgeSpec {
        id: "complete_500",
        name: "Legend",
        description: "Complete 500 chores",
        icon: "👑",
        tier: BadgeTier::Platinum,
        criterion: BadgeCriterion::CompletedAtLeast(500),
    },
    BadgeSpec {
        id: "level_5",
        name: "Rising Star",
        description: "Reach level 5",
        icon: "⭐",
        tier: BadgeTier::Silver,
        criterion: BadgeCriterion::LevelAtLeast(5),
    },
    BadgeSpec {
        id: "level_10",
        name: "Top Performer",
        description: "Reach level 10",
        icon: "🚀",
        tier: BadgeTier::Gold,
        criterion: BadgeCriterion::LevelAtLeast(10),
    },
    BadgeSpec {
        id: "early_bird",
        name: "Early Bird",
        description: "Complete a chore before 8 AM",
        icon: "🌅",
        tier: BadgeTier::Bronze,
        criterion: BadgeCriterion::CompletedBeforeHour(8),
    },
    BadgeSpec {
        id: "night_owl",
        name: "Night Owl",
        description: "Complete a chore after 10 PM",
        icon: "🦉",
        tier: BadgeTier::Bronze,
        criterion: BadgeCriterion::CompletedAtOrAfterHour(22),
    },
    BadgeSpec {
        id: "team_player",
        name: "Team Player",
        description: "Be part of a team with 3+ members",
        icon: "🤝",
        tier: BadgeTier::Silver,
        criterion: BadgeCriterion::TeamSizeAtLeast(3),
    },
];

/// Anchor labels identifying the current ISO week and calendar month, used
/// to decide when the weekly/monthly accumulators go stale.
pub fn accumulator_anchors(now: DateTime<Utc>) -> (String, String) {
    let iso_week = now.iso_week();
    (
        format!("{}-W{:02}", iso_week.year(), iso_week.week()),
        format!("{}-{:02}", now.year(), now.month()),
    )
}

/// Zeroes any accumulator whose anchor no longer matches the current
/// week/month. Runs before every points mutation so deltas land in the
/// right bucket.
pub fn rollover_accumulators(stats: &mut UserStats, now: DateTime<Utc>) {
    let (weekly_anchor, monthly_anchor) = accumulator_anchors(now);
    if stats.weekly_anchor.as_deref() != Some(weekly_anchor.as_str()) {
        stats.weekly_points = 0;
        stats.weekly_anchor = Some(weekly_anchor);
    }
    if stats.monthly_anchor.as_deref() != Some(monthly_anchor.as_str()) {
        stats.monthly_points = 0;
        stats.monthly_anchor = Some(monthly_anchor);
    }
}

fn bump_streak(stats: &mut UserStats, now: DateTime<Utc>) {
    match stats.last_completed_date {
        Some(last) => {
            let diff_days = (now.date_naive() - last.date_naive()).num_days();
            if diff_days == 1 {
                stats.current_streak += 1;
            } else if diff_days > 1 {
                stats.current_streak = 1;
            }
            // Same-day completions keep the streak as-is.
        }
        None => stats.current_streak = 1,
    }
    stats.longest_streak = stats.longest_streak.max(stats.current_streak);
}

/// Applies a first-of-the-day completion to the stats and returns the
/// badges it newly unlocked. Idempotence is the caller's responsibility:
/// this must only run when a completion record was actually inserted.
pub fn apply_completion(
    stats: &mut UserStats,
    points: i64,
    now: DateTime<Utc>,
    team_size: i64,
) -> Vec<&'static BadgeSpec> {
    rollover_accumulators(stats, now);

    stats.total_points += points;
    stats.weekly_points += points;
    stats.monthly_points += points;
    stats.total_completed += 1;
    bump_streak(stats, now);
    stats.last_completed_date = Some(now);
    stats.level = level_for_points(stats.total_points);

    let hour = now.hour();
    let mut newly_earned = Vec::new();
    for spec in BADGE_CATALOG {
        let already_earned = stats.badges.iter().any(|badge| badge.id == spec.id);
        if already_earned {
            continue;
        }
        if spec.criterion.is_met(stats, hour, team_size) {
            stats.badges.push(spec.to_badge(now));
            newly_earned.push(spec);
        }
    }
    newly_earned
}

/// Reverses a same-day completion's point/count effects, flooring at zero.
/// The streak and earned badges are intentionally left untouched.
pub fn revert_completion(stats: &mut UserStats, points: i64, now: DateTime<Utc>) {
    rollover_accumulators(stats, now);

    stats.total_points = (stats.total_points - points).max(0);
    stats.weekly_points = (stats.weekly_points - points).max(0);
    stats.monthly_points = (stats.monthly_points - points).max(0);
    stats.total_completed = (stats.total_completed - 1).max(0);
    stats.level = level_for_points(stats.total_points);
}
