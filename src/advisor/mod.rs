use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::job::VehicleType;

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// What the external collaborator returns for an item: a vehicle to send,
/// rough weight, a 1-10 difficulty, prose reasoning, and a fair payout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub vehicle_type: VehicleType,
    pub estimated_weight_lb: f64,
    pub difficulty_score: u8,
    pub reasoning: String,
    pub suggested_price: f64,
}

/// Fallback when no credentials are configured.
pub fn fallback_unconfigured() -> Suggestion {
    Suggestion {
        vehicle_type: VehicleType::Pickup,
        estimated_weight_lb: 150.0,
        difficulty_score: 5,
        reasoning: "No analysis credentials configured. Defaulting to a pickup truck.".to_string(),
        suggested_price: 45.0,
    }
}

/// Fallback when the collaborator was reachable in principle but the call
/// failed.
pub fn fallback_unavailable() -> Suggestion {
    Suggestion {
        vehicle_type: VehicleType::Pickup,
        estimated_weight_lb: 0.0,
        difficulty_score: 5,
        reasoning: "Item analysis is unavailable. Estimate vehicle and price manually.".to_string(),
        suggested_price: 50.0,
    }
}

pub struct Advisor {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl Advisor {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Never fails: missing credentials or an unreachable collaborator
    /// degrade to a deterministic fallback so the request flow cannot
    /// block on analysis availability.
    pub async fn analyze(
        &self,
        image_base64: Option<&str>,
        description: &str,
        distance_miles: f64,
    ) -> Suggestion {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("no analysis credentials; returning fallback suggestion");
            return fallback_unconfigured();
        };

        match self
            .request(api_key, image_base64, description, distance_miles)
            .await
        {
            Ok(suggestion) => suggestion,
            Err(err) => {
                warn!(error = %err, "item analysis failed; returning fallback");
                fallback_unavailable()
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        image_base64: Option<&str>,
        description: &str,
        distance_miles: f64,
    ) -> Result<Suggestion, AppError> {
        let mut parts = Vec::new();

        if let Some(image) = image_base64 {
            // Accepts either a bare payload or a data: URL.
            let data = image.rsplit(',').next().unwrap_or(image);
            parts.push(json!({
                "inline_data": { "mime_type": "image/jpeg", "data": data }
            }));
        }
        parts.push(json!({ "text": prompt(description, distance_miles) }));

        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "vehicle_type": {
                            "type": "STRING",
                            "enum": ["Sedan", "Suv", "Pickup", "BoxTruck", "CargoVan"]
                        },
                        "estimated_weight_lb": { "type": "NUMBER" },
                        "difficulty_score": {
                            "type": "INTEGER",
                            "description": "1 is easy (a lamp), 10 is hard (a piano)"
                        },
                        "reasoning": {
                            "type": "STRING",
                            "description": "Vehicle choice plus any packing or handling cautions."
                        },
                        "suggested_price": { "type": "NUMBER", "description": "In USD" }
                    },
                    "required": [
                        "vehicle_type",
                        "estimated_weight_lb",
                        "difficulty_score",
                        "reasoning",
                        "suggested_price"
                    ]
                }
            }
        });

        let url = format!("{GEMINI_ENDPOINT}/{GEMINI_MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::Unavailable(format!("analysis request failed: {err}")))?
            .error_for_status()
            .map_err(|err| AppError::Unavailable(format!("analysis request rejected: {err}")))?;

        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|err| AppError::Unavailable(format!("analysis response unreadable: {err}")))?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| AppError::Unavailable("empty analysis response".to_string()))?;

        serde_json::from_str(&text)
            .map_err(|err| AppError::Unavailable(format!("malformed analysis response: {err}")))
    }
}

fn prompt(description: &str, distance_miles: f64) -> String {
    format!(
        "You are a logistics expert for a peer-to-peer delivery app. \
         A user needs a free item picked up. \
         Description: {description}. Distance: {distance_miles} miles. \
         Analyze the item (and image if provided) to determine the best vehicle, \
         weight, difficulty, and a fair price for a driver. Consider fragility, \
         packing requirements (blankets, tie-downs, bubble wrap), and whether \
         two people are needed to lift, and factor those into the difficulty \
         and price. In the reasoning field, explain the vehicle choice and list \
         any necessary packing materials or handling cautions."
    )
}

#[derive(Deserialize)]
struct GenerateReply {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}
