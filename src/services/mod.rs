// Business logic services

pub mod achievement_service;
pub mod evaluation_service;
pub mod personal_record_service;
pub mod statistics_service;

pub use achievement_service::AchievementService;
pub use evaluation_service::EvaluationService;
pub use personal_record_service::PersonalRecordService;
pub use statistics_service::{StatisticsReader, StatisticsService};
