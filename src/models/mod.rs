// Data models for records, achievements, and evaluation results

pub mod achievement;
pub mod evaluation;
pub mod personal_record;
pub mod statistics;
pub mod workout;

pub use achievement::*;
pub use evaluation::*;
pub use personal_record::*;
pub use statistics::*;
pub use workout::*;
