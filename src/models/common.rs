use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    #[default]
    Fast,
    HighQuality,
}

impl ModelTier {
    pub fn model_id(&self) -> &'static str {
        match self {
            ModelTier::Fast => "gemini-2.5-flash-image",
            ModelTier::HighQuality => "gemini-3-pro-image-preview",
        }
    }

    /// Output size hint sent with the request; only the high quality tier takes one.
    pub fn image_size_hint(&self) -> Option<&'static str> {
        match self {
            ModelTier::Fast => None,
            ModelTier::HighQuality => Some("2K"),
        }
    }
}

impl FromStr for ModelTier {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "fast" | "flash" => Ok(ModelTier::Fast),
            "high_quality" | "high-quality" | "hq" | "pro" => Ok(ModelTier::HighQuality),
            other => Err(StudioError::ValidationError(format!(
                "Unknown model tier: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:5")]
    Social,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:2")]
    Classic,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 7] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Social,
        AspectRatio::Landscape,
        AspectRatio::Classic,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Social => "4:5",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Classic => "3:2",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Square (1:1)",
            AspectRatio::Portrait => "Portrait (3:4)",
            AspectRatio::Social => "Social (4:5)",
            AspectRatio::Landscape => "Landscape (4:3)",
            AspectRatio::Classic => "Classic (3:2)",
            AspectRatio::Tall => "Tall (9:16)",
            AspectRatio::Wide => "Wide (16:9)",
        }
    }

    /// Ratio actually sent to the service. 3:2 and 4:5 are not served
    /// natively and go out as their nearest supported neighbour.
    pub fn remap(self) -> AspectRatio {
        match self {
            AspectRatio::Classic => AspectRatio::Landscape,
            AspectRatio::Social => AspectRatio::Portrait,
            other => other,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == trimmed)
            .ok_or_else(|| {
                StudioError::ValidationError(format!("Unsupported aspect ratio: {}", trimmed))
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Realistic,
    Commercial,
    Editorial,
    Product,
    Cinematic,
    Digital,
}

impl StylePreset {
    pub const ALL: [StylePreset; 6] = [
        StylePreset::Realistic,
        StylePreset::Commercial,
        StylePreset::Editorial,
        StylePreset::Product,
        StylePreset::Cinematic,
        StylePreset::Digital,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            StylePreset::Realistic => "realistic",
            StylePreset::Commercial => "commercial",
            StylePreset::Editorial => "editorial",
            StylePreset::Product => "product",
            StylePreset::Cinematic => "cinematic",
            StylePreset::Digital => "digital",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StylePreset::Realistic => "Photorealistic",
            StylePreset::Commercial => "Commercial",
            StylePreset::Editorial => "Editorial",
            StylePreset::Product => "Product Shot",
            StylePreset::Cinematic => "Cinematic",
            StylePreset::Digital => "Digital Art",
        }
    }

    pub fn descriptor(&self) -> &'static str {
        match self {
            StylePreset::Realistic => "raw candid photo, shot on 35mm film, hyper-realistic, natural lighting, film grain, unpolished, highly detailed texture, skin pores, authentic",
            StylePreset::Commercial => "clean studio background, commercial lighting, advertising quality, sharp product focus, professional color grading",
            StylePreset::Editorial => "vogue aesthetic, dramatic studio lighting, fashion editorial style, high fashion, detailed skin, magazine quality",
            StylePreset::Product => "clean background, macro details, commercial product photography, depth of field, sharp focus",
            StylePreset::Cinematic => "movie scene, cinematic lighting, teal and orange color grading, depth of field, anamorphic lens, atmospheric",
            StylePreset::Digital => "concept art style, octane render, vibrant colors, highly detailed, digital painting",
        }
    }
}

impl FromStr for StylePreset {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        StylePreset::ALL
            .into_iter()
            .find(|preset| preset.id() == wanted)
            .ok_or_else(|| StudioError::ValidationError(format!("Unknown style preset: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }

    /// Whether the encoder exposes a quality parameter for this format.
    /// PNG is always written losslessly.
    pub fn supports_quality(&self) -> bool {
        matches!(self, OutputFormat::Jpeg | OutputFormat::Webp)
    }
}

impl FromStr for OutputFormat {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(StudioError::ValidationError(format!(
                "Unsupported output format: {}",
                other
            ))),
        }
    }
}
