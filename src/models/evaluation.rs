use serde::{Deserialize, Serialize};

use super::achievement::{Achievement, AchievementProgress};
use super::personal_record::PersonalRecordEvent;

/// Everything that came out of processing one completed session: new
/// personal records first, then achievements unlocked by the re-evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub records: Vec<PersonalRecordEvent>,
    pub unlocks: Vec<Achievement>,
}

/// Result of an on-demand refresh: any unlocks that were due, plus the full
/// progress list for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub unlocks: Vec<Achievement>,
    pub progress: Vec<AchievementProgress>,
}
