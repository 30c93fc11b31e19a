use anyhow::Result;
use sqlx::PgPool;

use crate::models::{AchievementCriteria, CriteriaKind};

struct SeedAchievement {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    kind: CriteriaKind,
    target: i64,
    points: i32,
}

/// Built-in achievement catalogue covering every criteria kind. Targets
/// climb so there is always a next achievement in reach.
const CATALOG: &[SeedAchievement] = &[
    SeedAchievement {
        name: "First Steps",
        description: "Complete your first workout",
        icon: "🏋️",
        kind: CriteriaKind::WorkoutCount,
        target: 1,
        points: 10,
    },
    SeedAchievement {
        name: "Regular",
        description: "Complete 10 workouts",
        icon: "💪",
        kind: CriteriaKind::WorkoutCount,
        target: 10,
        points: 25,
    },
    SeedAchievement {
        name: "Half Century",
        description: "Complete 50 workouts",
        icon: "🏆",
        kind: CriteriaKind::WorkoutCount,
        target: 50,
        points: 100,
    },
    SeedAchievement {
        name: "Three in a Row",
        description: "Work out 3 days in a row",
        icon: "🔥",
        kind: CriteriaKind::Streak,
        target: 3,
        points: 15,
    },
    SeedAchievement {
        name: "Unbroken Week",
        description: "Work out 7 days in a row",
        icon: "⚡",
        kind: CriteriaKind::Streak,
        target: 7,
        points: 40,
    },
    SeedAchievement {
        name: "Strong Week",
        description: "Complete 5 workouts within a week",
        icon: "📅",
        kind: CriteriaKind::WeeklyWorkouts,
        target: 5,
        points: 20,
    },
    SeedAchievement {
        name: "Relentless Month",
        description: "Complete 20 workouts within a month",
        icon: "🗓️",
        kind: CriteriaKind::MonthlyWorkouts,
        target: 20,
        points: 75,
    },
    SeedAchievement {
        name: "Record Breaker",
        description: "Set your first personal record",
        icon: "🥇",
        kind: CriteriaKind::PersonalRecords,
        target: 1,
        points: 15,
    },
    SeedAchievement {
        name: "Record Collector",
        description: "Set 10 personal records",
        icon: "📈",
        kind: CriteriaKind::PersonalRecords,
        target: 10,
        points: 50,
    },
    SeedAchievement {
        name: "Cardio Kickoff",
        description: "Complete 5 cardio workouts",
        icon: "🏃",
        kind: CriteriaKind::CardioWorkouts,
        target: 5,
        points: 20,
    },
    SeedAchievement {
        name: "Endurance Engine",
        description: "Complete 20 cardio workouts",
        icon: "🚴",
        kind: CriteriaKind::CardioWorkouts,
        target: 20,
        points: 60,
    },
];

pub struct CatalogSeeder {
    pool: PgPool,
}

impl CatalogSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seeds the built-in achievement catalogue. Existing rows are left
    /// untouched, so re-running is safe.
    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Seeding achievement catalogue...");

        let created = self.seed_achievements().await?;

        tracing::info!("Achievement catalogue seeded, {} new achievements", created);
        Ok(())
    }

    async fn seed_achievements(&self) -> Result<u64> {
        let mut created = 0;
        for seed in CATALOG {
            let criteria = AchievementCriteria {
                kind: seed.kind,
                target: seed.target,
            };

            let result = sqlx::query(
                r#"
                INSERT INTO achievements (name, description, icon, category, criteria, points)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(seed.name)
            .bind(seed.description)
            .bind(seed.icon)
            .bind(criteria.kind.category())
            .bind(criteria.to_value())
            .bind(seed.points)
            .execute(&self.pool)
            .await?;

            created += result.rows_affected();
        }
        Ok(created)
    }
}
