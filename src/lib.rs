// Progress and achievement evaluation engine for fitness tracking
// applications: detects personal records from completed workout sessions
// and evaluates declarative achievement unlock rules against aggregate
// user statistics.

pub mod config;
pub mod models;
pub mod services;
pub mod storage;

pub use services::{
    AchievementService, EvaluationService, PersonalRecordService, StatisticsReader,
    StatisticsService,
};
