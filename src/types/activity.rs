/// 活动标签列表（顺序即编码）
pub const ACTIVITY_LABELS: [&str; 7] = [
    "Other",
    "Walking",
    "Running",
    "Standing",
    "Sitting",
    "Upstairs",
    "Downstairs",
];

/// A selectable activity; the code is its position in [`ACTIVITY_LABELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Activity(usize);

impl Activity {
    pub fn from_code(code: usize) -> Option<Self> {
        (code < ACTIVITY_LABELS.len()).then_some(Self(code))
    }

    pub fn all() -> impl Iterator<Item = Activity> {
        (0..ACTIVITY_LABELS.len()).map(Activity)
    }

    pub fn code(&self) -> usize {
        self.0
    }

    pub fn label(&self) -> &'static str {
        ACTIVITY_LABELS[self.0]
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.label(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_list_order() {
        let labels: Vec<&str> = Activity::all().map(|a| a.label()).collect();
        assert_eq!(labels, ACTIVITY_LABELS);
        assert_eq!(Activity::from_code(2).map(|a| a.label()), Some("Running"));
        assert_eq!(Activity::default().label(), "Other");
    }

    #[test]
    fn rejects_out_of_range_code() {
        assert!(Activity::from_code(ACTIVITY_LABELS.len()).is_none());
    }
}
