use serde::{Deserialize, Serialize};

/// Label reported when a class index has no entry in the table.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// The seven forest cover type groupings, by class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverType {
    SpruceFir,
    LodgepolePine,
    PonderosaPine,
    CottonwoodWillow,
    Aspen,
    DouglasFir,
    Krummholz,
}

impl CoverType {
    /// All cover types in class-index order.
    pub const ALL: [CoverType; 7] = [
        CoverType::SpruceFir,
        CoverType::LodgepolePine,
        CoverType::PonderosaPine,
        CoverType::CottonwoodWillow,
        CoverType::Aspen,
        CoverType::DouglasFir,
        CoverType::Krummholz,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> i64 {
        self as i64
    }

    pub fn name(self) -> &'static str {
        match self {
            CoverType::SpruceFir => "Spruce/Fir",
            CoverType::LodgepolePine => "Lodgepole Pine",
            CoverType::PonderosaPine => "Ponderosa Pine",
            CoverType::CottonwoodWillow => "Cottonwood/Willow",
            CoverType::Aspen => "Aspen",
            CoverType::DouglasFir => "Douglas-fir",
            CoverType::Krummholz => "Krummholz",
        }
    }
}

/// Human-readable name for a predicted class index. Total over `i64`.
pub fn cover_type_name(index: i64) -> &'static str {
    CoverType::from_index(index).map_or(UNKNOWN_LABEL, CoverType::name)
}
