//! Recurrence tokens.
//!
//! A recurring event is marked by a bracketed token in its description, for
//! example `Weekly sync [weekly]`. Matching is literal and case-sensitive.

use chrono::TimeDelta;

/// A recurrence interval recognised in event descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recurrence {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// All tokens in resolution priority order.
    pub const PRIORITY: [Recurrence; 4] = [
        Recurrence::Hourly,
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
    ];

    /// Returns the bracketed token as it must appear in a description.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Hourly => "[hourly]",
            Self::Daily => "[daily]",
            Self::Weekly => "[weekly]",
            Self::Monthly => "[monthly]",
        }
    }

    /// Returns the offset between two occurrences, in milliseconds.
    ///
    /// A month is a fixed 30.4166 days.
    pub fn offset_millis(&self) -> i64 {
        match self {
            Self::Hourly => 3_600_000,
            Self::Daily => 86_400_000,
            Self::Weekly => 604_800_000,
            Self::Monthly => 2_628_000_000,
        }
    }

    /// Returns the offset between two occurrences.
    pub fn offset(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.offset_millis())
    }

    /// Finds the recurrence token in a description.
    ///
    /// When several tokens are present the first one in [`Recurrence::PRIORITY`]
    /// wins, regardless of where it appears in the text.
    pub fn resolve(description: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|recurrence| description.contains(recurrence.token()))
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token().trim_matches(|c| c == '[' || c == ']'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_token() {
        assert_eq!(Recurrence::resolve("Raid [hourly]"), Some(Recurrence::Hourly));
        assert_eq!(Recurrence::resolve("[daily] standup"), Some(Recurrence::Daily));
        assert_eq!(Recurrence::resolve("Game night [weekly]!"), Some(Recurrence::Weekly));
        assert_eq!(Recurrence::resolve("Book club\n[monthly]"), Some(Recurrence::Monthly));
    }

    #[test]
    fn fixed_offsets() {
        assert_eq!(Recurrence::Hourly.offset_millis(), 3_600_000);
        assert_eq!(Recurrence::Daily.offset_millis(), 86_400_000);
        assert_eq!(Recurrence::Weekly.offset_millis(), 604_800_000);
        assert_eq!(Recurrence::Monthly.offset_millis(), 2_628_000_000);
        assert_eq!(Recurrence::Weekly.offset(), TimeDelta::days(7));
    }

    #[test]
    fn no_token_is_no_match() {
        assert_eq!(Recurrence::resolve(""), None);
        assert_eq!(Recurrence::resolve("weekly catch-up"), None);
        assert_eq!(Recurrence::resolve("(daily)"), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(Recurrence::resolve("[Daily]"), None);
        assert_eq!(Recurrence::resolve("[WEEKLY]"), None);
    }

    #[test]
    fn priority_beats_position() {
        assert_eq!(
            Recurrence::resolve("[daily] and also [hourly]"),
            Some(Recurrence::Hourly)
        );
        assert_eq!(
            Recurrence::resolve("[monthly] [weekly]"),
            Some(Recurrence::Weekly)
        );
    }

    #[test]
    fn display_drops_brackets() {
        assert_eq!(Recurrence::Monthly.to_string(), "monthly");
    }
}
