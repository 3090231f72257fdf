/// Fixed set of suitability categories. Source labels vary (the CSV carries
/// Spanish labels), so identity lives here and labels are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuitabilityCategory {
    NotSuitable,
    Low,
    Medium,
    High,
}

impl SuitabilityCategory {
    pub const ALL: [SuitabilityCategory; 4] = [
        SuitabilityCategory::NotSuitable,
        SuitabilityCategory::Low,
        SuitabilityCategory::Medium,
        SuitabilityCategory::High,
    ];

    /// Accepts the Spanish source labels and the English slugs, case-insensitively.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "no apta" | "no-apta" | "not-suitable" => Some(Self::NotSuitable),
            "aptitud baja" | "baja" | "low" => Some(Self::Low),
            "aptitud media" | "media" | "medium" => Some(Self::Medium),
            "aptitud alta" | "alta" | "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Stable filter value used in query strings and dropdown options.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::NotSuitable => "not-suitable",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Display label, matching the source data.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotSuitable => "No apta",
            Self::Low => "Aptitud baja",
            Self::Medium => "Aptitud media",
            Self::High => "Aptitud alta",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::NotSuitable => "#FF6B6B",
            Self::Low => "#FFD166",
            Self::Medium => "#06D6A0",
            Self::High => "#118AB2",
        }
    }
}

/// One municipality-category row of the canonical dataset.
#[derive(Debug, Clone)]
pub struct Record {
    /// Zero-padded to 5 characters.
    pub municipality_code: String,
    /// Zero-padded to 2 characters.
    pub department_code: String,
    pub municipality_name: String,
    pub category: SuitabilityCategory,
    /// Hectares; finite and non-negative.
    pub area_ha: f64,
}

/// A record joined with its approximate coordinate for the map view.
#[derive(Debug, Clone)]
pub struct MapRecord {
    pub record: Record,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryMetrics {
    pub municipality_count: usize,
    pub total_area_ha: f64,
    pub category_count: usize,
}

/// The dropdown selection driving each re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSelection {
    All,
    Category(SuitabilityCategory),
}

impl FilterSelection {
    pub fn matches(&self, category: SuitabilityCategory) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::Category(c) => *c == category,
        }
    }
}
