use serde::{Deserialize, Serialize};

/// The closed set of income categories.
///
/// The serialized form is the Spanish label shown to operators and written to the persisted
/// snapshot. Parsing also accepts a short English key, e.g. `fines` or `space-rental`, which is
/// more convenient on the command line.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    #[serde(rename = "Multas", alias = "fines")]
    Fines,
    #[serde(rename = "Impresiones/Fotocopias", alias = "printing")]
    Printing,
    #[serde(rename = "Reposición de Carnets", alias = "card-replacement")]
    CardReplacement,
    #[serde(rename = "Alquiler de Espacios", alias = "space-rental")]
    SpaceRental,
    #[serde(rename = "Venta de Materiales", alias = "merchandise-sale")]
    MerchandiseSale,
    #[serde(rename = "Donaciones", alias = "donation")]
    Donation,
    #[serde(rename = "Otros", alias = "other")]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, in the order they are presented.
    pub const ALL: [Category; 7] = [
        Category::Fines,
        Category::Printing,
        Category::CardReplacement,
        Category::SpaceRental,
        Category::MerchandiseSale,
        Category::Donation,
        Category::Other,
    ];

    /// The position of this category in `Category::ALL`.
    pub fn index(self) -> usize {
        match self {
            Category::Fines => 0,
            Category::Printing => 1,
            Category::CardReplacement => 2,
            Category::SpaceRental => 3,
            Category::MerchandiseSale => 4,
            Category::Donation => 5,
            Category::Other => 6,
        }
    }

    /// The short English key accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Category::Fines => "fines",
            Category::Printing => "printing",
            Category::CardReplacement => "card-replacement",
            Category::SpaceRental => "space-rental",
            Category::MerchandiseSale => "merchandise-sale",
            Category::Donation => "donation",
            Category::Other => "other",
        }
    }

    /// The chart color for this category as a hex RGB string.
    pub fn color(self) -> &'static str {
        match self {
            Category::Fines => "#ef4444",
            Category::Printing => "#3b82f6",
            Category::CardReplacement => "#10b981",
            Category::SpaceRental => "#f59e0b",
            Category::MerchandiseSale => "#8b5cf6",
            Category::Donation => "#ec4899",
            Category::Other => "#64748b",
        }
    }
}
