use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MIN_LENGTH_WORDS: u32 = 80;
pub const MAX_LENGTH_WORDS: u32 = 240;
const LENGTH_STEP: u32 = 10;
pub const MAX_TEMPERATURE: f32 = 1.2;
pub const MAX_VARIANTS: u8 = 3;

const DEFAULT_FEATURES: &str =
    "south-facing garden, remodeled kitchen, off-street parking, near station";

/// Declares a closed set of form options that (de)serialize as their display label.
macro_rules! form_options {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|o| o.label()).collect()
            }
        }
    };
}

form_options!(PropertyType {
    FlatApartment => "Flat/Apartment",
    House => "House",
    Studio => "Studio",
    Bungalow => "Bungalow",
    Townhouse => "Townhouse",
    NewBuild => "New Build",
    Other => "Other",
});

form_options!(Tone {
    Professional => "Professional",
    Warm => "Warm",
    Luxury => "Luxury",
    Concise => "Concise",
    InvestorFocused => "Investor-Focused",
    FamilyFriendly => "Family-Friendly",
});

form_options!(Audience {
    GeneralBuyers => "General buyers",
    FirstTimeBuyers => "First-time buyers",
    Families => "Families",
    Investors => "Investors",
    Renters => "Renters",
});

form_options!(Spelling {
    Uk => "UK",
    Us => "US",
});

form_options!(ListingFormat {
    Paragraphs => "Paragraphs",
    SummaryAndParagraph => "Short summary + paragraph",
    HeadlineAndParagraph => "Headline + paragraph",
});

/// Property facts and style choices submitted from the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingRequest {
    pub address: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub property_type: PropertyType,
    /// Comma-separated free text.
    pub features: String,
    pub tone: Tone,
    pub audience: Audience,
    pub length_words: u32,
    pub spelling: Spelling,
    /// Comma-separated keywords that must appear.
    pub include_keywords: String,
    /// Comma-separated phrases to avoid.
    pub avoid_phrases: String,
    pub format: ListingFormat,
    pub add_title: bool,
    pub add_cta: bool,
    pub add_bullets: bool,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            address: String::new(),
            bedrooms: 2,
            bathrooms: 1,
            property_type: PropertyType::FlatApartment,
            features: DEFAULT_FEATURES.to_string(),
            tone: Tone::Professional,
            audience: Audience::GeneralBuyers,
            length_words: 150,
            spelling: Spelling::Uk,
            include_keywords: String::new(),
            avoid_phrases: String::new(),
            format: ListingFormat::Paragraphs,
            add_title: true,
            add_cta: true,
            add_bullets: false,
        }
    }
}

impl ListingRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.address.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter an address/location.".to_string(),
            ));
        }
        if !(MIN_LENGTH_WORDS..=MAX_LENGTH_WORDS).contains(&self.length_words)
            || self.length_words % LENGTH_STEP != 0
        {
            return Err(AppError::Validation(format!(
                "length_words must be a multiple of {LENGTH_STEP} between {MIN_LENGTH_WORDS} and {MAX_LENGTH_WORDS}"
            )));
        }
        Ok(())
    }
}

/// Model settings from the sidebar. `model: None` means the configured default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: Option<String>,
    pub temperature: f32,
    pub variants: u8,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            variants: 2,
        }
    }
}

impl GenerationSettings {
    /// Validates against the allowed models and returns the model to use.
    pub fn resolve_model<'a>(&'a self, models: &'a [String]) -> Result<&'a str, AppError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between 0.0 and {MAX_TEMPERATURE}"
            )));
        }
        if !(1..=MAX_VARIANTS).contains(&self.variants) {
            return Err(AppError::Validation(format!(
                "variants must be between 1 and {MAX_VARIANTS}"
            )));
        }
        match &self.model {
            None => models
                .first()
                .map(String::as_str)
                .ok_or_else(|| AppError::Misconfigured("no models configured".to_string())),
            Some(model) if models.iter().any(|m| m == model) => Ok(model.as_str()),
            Some(model) => Err(AppError::Validation(format!(
                "model '{model}' is not available"
            ))),
        }
    }
}
