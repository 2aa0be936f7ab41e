use serde::{Deserialize, Serialize};

use crate::ImageId;

/// Raw image content handed to a provider for analysis
///
/// Loaded from file storage by the `ImageSource` collaborator; providers
/// encode the bytes as their wire format requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    /// Identifier the analysis will be cached under
    pub id: ImageId,
    /// MIME type (e.g. "image/jpeg")
    pub mime_type: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

/// Provider-produced description of one image
///
/// Cached per image identifier; feeds story prompts as scene descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// Image this analysis describes
    pub image_id: ImageId,
    /// Scene description suitable for embedding in a story prompt
    pub description: String,
    /// Salient labels (objects, colors, mood)
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether the image is suitable for a children's story context
    pub child_friendly: bool,
}
