use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of category filters offered by the filter buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Software,
    Agency,
}

impl CategoryFilter {
    pub const ALL: [CategoryFilter; 3] = [Self::All, Self::Software, Self::Agency];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Software => "software",
            Self::Agency => "agency",
        }
    }

    /// DOM id of the button that activates this filter.
    pub const fn control_id(self) -> &'static str {
        match self {
            Self::All => "filter-all",
            Self::Software => "filter-software",
            Self::Agency => "filter-agency",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "Të gjitha",
            Self::Software => "Software",
            Self::Agency => "Agjenci",
        }
    }

    /// Match against an already lower-cased category label.
    pub fn matches_lowercase(self, category_lower: &str) -> bool {
        match self {
            Self::All => true,
            Self::Software => category_lower.contains("software"),
            Self::Agency => category_lower.contains("agency") || category_lower.contains("digital"),
        }
    }

    pub fn matches(self, category: &str) -> bool {
        self == Self::All || self.matches_lowercase(&category.to_lowercase())
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryFilter;

    #[test]
    fn software_matches_case_insensitively() {
        assert!(CategoryFilter::Software.matches("Software House"));
        assert!(CategoryFilter::Software.matches("SOFTWARE"));
        assert!(!CategoryFilter::Software.matches("Digital Agency"));
    }

    #[test]
    fn agency_matches_agency_or_digital() {
        assert!(CategoryFilter::Agency.matches("Digital Agency"));
        assert!(CategoryFilter::Agency.matches("digital_agency"));
        assert!(CategoryFilter::Agency.matches("Marketing agency"));
        assert!(CategoryFilter::Agency.matches("Digital studio"));
        assert!(!CategoryFilter::Agency.matches("IT Consulting"));
    }

    #[test]
    fn all_matches_everything() {
        assert!(CategoryFilter::All.matches(""));
        assert!(CategoryFilter::All.matches("other"));
    }

    #[test]
    fn control_ids_follow_display_names() {
        for filter in CategoryFilter::ALL {
            assert_eq!(filter.control_id(), format!("filter-{filter}"));
        }
    }
}
