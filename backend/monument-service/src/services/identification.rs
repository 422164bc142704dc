//! Monument identification: prompt, model call, reply normalization.

use gemini_client::{GeminiClient, ModelInput};
use tracing::info;

use crate::error::Result;
use crate::models::MonumentIdentification;

const MONUMENT_NAME_PREFIX: &str = "Monument Name:";
const DESCRIPTION_PREFIX: &str = "Description:";

/// Prompt sent with every identification request. The reply format it
/// asks for is what [`parse_identification`] scans for.
pub const TOUR_GUIDE_PROMPT: &str = "\
You are an expert virtual tour guide. When shown an image of a monument, your task is to:
1. Recognize the monument from the image.
2. Return the name of the monument in the format: \"Monument Name: <name>\".
3. Provide a detailed description of the monument after the name in the format: \"Description: <detailed description>\".
Make sure to return the name and description in separate lines.";

/// Extract the structured record from the model's freeform reply.
///
/// Pure and total: scans line by line for the two fixed prefixes,
/// trimming whitespace around the captured remainder. A later matching
/// line overwrites an earlier one; a prefix with no matching line leaves
/// its field empty.
pub fn parse_identification(raw: &str) -> MonumentIdentification {
    let mut result = MonumentIdentification::default();

    for line in raw.split('\n') {
        if let Some(rest) = line.strip_prefix(MONUMENT_NAME_PREFIX) {
            result.monument_name = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(DESCRIPTION_PREFIX) {
            result.description = rest.trim().to_string();
        }
    }

    result
}

/// Sends identification requests to the generative model and normalizes
/// the replies.
#[derive(Clone)]
pub struct IdentificationService {
    model: GeminiClient,
}

impl IdentificationService {
    pub fn new(model: GeminiClient) -> Self {
        Self { model }
    }

    pub async fn identify(&self, input: &ModelInput) -> Result<MonumentIdentification> {
        let reply = self.model.generate(TOUR_GUIDE_PROMPT, input).await?;
        let identification = parse_identification(&reply);
        info!(monument = %identification.monument_name, "identification parsed");
        Ok(identification)
    }
}
