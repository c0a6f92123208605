//! Gemini provider
//!
//! Talks to the Gemini generateContent API and converts its free-form JSON
//! answers into domain types. Upstream trouble is absorbed here:
//!
//! - 429 responses carry a retry hint; the provider sleeps that long and
//!   retries, at most twice, through an injectable [`Delay`]
//! - other generation failures retry immediately, up to the same attempt cap
//! - a response that generates fine but does not parse is NOT retried; the
//!   provider answers from the local fallback instead
//!
//! The HTTP transport sits behind [`TextGenerator`] so tests can script
//! responses without a network.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use extvet_common::models::{Category, Extension, Verdict};

use super::{fallback, parse, prompts};
use super::{overlapping_approved, AiProvider, AnalyzedItem, ProviderError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-1.5-flash";
const USER_AGENT: &str = "extvet/0.1.0";

const MODEL_TEMPERATURE: f64 = 0.7;
const MODEL_MAX_OUTPUT_TOKENS: u32 = 1500;

/// Total generation attempts per operation (1 initial + 2 retries)
const MAX_ATTEMPTS: u32 = 3;
/// Backoff when a 429 carries no usable retry hint
const DEFAULT_RETRY_SECS: u64 = 30;
/// Upper bound on comparable extensions returned per call
const MAX_COMPARABLES: usize = 5;

/// Text generation errors
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited, retry after {0:?}")]
    RateLimited(Duration),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Prompt-in, text-out seam over the generative model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Sleep seam so retry backoff is observable in tests
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production delay backed by tokio's timer
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// HTTP client for the Gemini generateContent endpoint
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GenerateError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        // Key travels in the query string; keep the URL out of logs
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, GEMINI_MODEL, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: MODEL_TEMPERATURE,
                max_output_tokens: MODEL_MAX_OUTPUT_TOKENS,
            },
        };

        tracing::debug!(
            model = GEMINI_MODEL,
            prompt_len = prompt.len(),
            "Querying Gemini API"
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::RateLimited(retry_delay_from(&body)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api(status.as_u16(), body));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(text)
    }
}

/// Retry hint from a 429 body. Looks for the RetryInfo detail's retryDelay
/// (e.g. "14s"); defaults to 30 seconds when absent or unreadable.
fn retry_delay_from(body: &str) -> Duration {
    let hinted = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")?
                .get("details")?
                .as_array()?
                .iter()
                .find_map(|detail| {
                    let type_tag = detail.get("@type")?.as_str()?;
                    if !type_tag.contains("RetryInfo") {
                        return None;
                    }
                    parse::digits_only(detail.get("retryDelay")?.as_str()?)
                })
        });

    Duration::from_secs(hinted.unwrap_or(DEFAULT_RETRY_SECS))
}

/// The Gemini-backed [`AiProvider`].
///
/// Holds its own RNG for bounded default substitution so tests can seed it.
pub struct GeminiProvider {
    generator: Box<dyn TextGenerator>,
    delay: Box<dyn Delay>,
    rng: Mutex<StdRng>,
}

impl GeminiProvider {
    pub fn new(api_key: &str) -> Result<Self, ProviderError> {
        let client = GeminiClient::new(api_key.to_string()).map_err(|e| ProviderError::Init {
            provider: "gemini",
            message: e.to_string(),
        })?;

        Ok(Self::from_parts(
            Box::new(client),
            Box::new(TokioDelay),
            StdRng::from_entropy(),
        ))
    }

    /// Assemble from explicit parts. Tests use this to script generation
    /// and pin the RNG seed.
    pub fn from_parts(
        generator: Box<dyn TextGenerator>,
        delay: Box<dyn Delay>,
        rng: StdRng,
    ) -> Self {
        Self {
            generator,
            delay,
            rng: Mutex::new(rng),
        }
    }

    // Never held across an await
    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.generator.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            if attempt >= MAX_ATTEMPTS {
                tracing::warn!(attempt, error = %err, "Generation attempts exhausted");
                return Err(err);
            }

            match &err {
                GenerateError::RateLimited(retry_after) => {
                    tracing::warn!(
                        attempt,
                        delay_secs = retry_after.as_secs(),
                        "Gemini API rate limited, backing off before retry"
                    );
                    self.delay.sleep(*retry_after).await;
                }
                other => {
                    tracing::warn!(attempt, error = %other, "Generation failed, retrying");
                }
            }
        }
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze(
        &self,
        extension_id: &str,
        extension_name: &str,
    ) -> Result<AnalyzedItem, ProviderError> {
        let prompt = prompts::analysis_prompt(extension_id, extension_name);

        match self.generate_with_retry(&prompt).await {
            Ok(text) => {
                let parsed = {
                    let mut rng = self.lock_rng();
                    parse_analysis(&text, extension_id, extension_name, &mut *rng)
                };
                match parsed {
                    Some(item) => Ok(item),
                    None => {
                        tracing::warn!(
                            extension = %extension_name,
                            "Unparseable analysis response, using local fallback"
                        );
                        Ok(self.fallback_analysis(extension_id, extension_name))
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    extension = %extension_name,
                    error = %err,
                    "Analysis generation failed, using local fallback"
                );
                Ok(self.fallback_analysis(extension_id, extension_name))
            }
        }
    }

    async fn find_comparable(
        &self,
        extension: &Extension,
    ) -> Result<Vec<Extension>, ProviderError> {
        let prompt = prompts::similar_prompt(extension);

        match self.generate_with_retry(&prompt).await {
            Ok(text) => {
                let parsed = {
                    let mut rng = self.lock_rng();
                    parse_similar(&text, extension, &mut *rng)
                };
                match parsed {
                    Some(items) if !items.is_empty() => Ok(items),
                    _ => {
                        tracing::warn!(
                            extension = %extension.name,
                            "Unusable similar-extensions response, using canned comparables"
                        );
                        Ok(fallback::fallback_comparables(extension))
                    }
                }
            }
            Err(err) => {
                tracing::warn!(
                    extension = %extension.name,
                    error = %err,
                    "Similar-extensions generation failed, using canned comparables"
                );
                Ok(fallback::fallback_comparables(extension))
            }
        }
    }

    async fn recommend(
        &self,
        extension: &Extension,
        approved: &[Extension],
    ) -> Result<Verdict, ProviderError> {
        let overlapping = overlapping_approved(extension, approved);
        let prompt = prompts::recommendation_prompt(extension, &overlapping);

        match self.generate_with_retry(&prompt).await {
            Ok(text) => match parse_verdict(&text, &overlapping) {
                Some(verdict) => Ok(verdict),
                None => {
                    tracing::warn!(
                        extension = %extension.name,
                        "Unparseable recommendation response, using threshold fallback"
                    );
                    Ok(fallback::fallback_verdict(extension, &overlapping))
                }
            },
            Err(err) => {
                tracing::warn!(
                    extension = %extension.name,
                    error = %err,
                    "Recommendation generation failed, using threshold fallback"
                );
                Ok(fallback::fallback_verdict(extension, &overlapping))
            }
        }
    }
}

impl GeminiProvider {
    fn fallback_analysis(&self, extension_id: &str, extension_name: &str) -> AnalyzedItem {
        let mut rng = self.lock_rng();
        AnalyzedItem::from_fallback(fallback::fallback_profile(
            extension_id,
            extension_name,
            &mut *rng,
        ))
    }
}

/// Parse an analysis response into a profile. `None` means the response is
/// not usable at all; individual bad numeric fields are substituted with
/// bounded defaults and recorded instead.
fn parse_analysis(
    text: &str,
    extension_id: &str,
    extension_name: &str,
    rng: &mut impl Rng,
) -> Option<AnalyzedItem> {
    let value: Value = serde_json::from_str(parse::strip_code_fences(text)).ok()?;
    let object = value.as_object()?;

    let mut defaulted: Vec<&'static str> = Vec::new();

    let rating = match parse::coerce_f64(object.get("rating")) {
        Some(rating) => rating.clamp(1.0, 5.0),
        None => {
            defaulted.push("rating");
            fallback::default_rating(rng)
        }
    };

    let users = match parse::coerce_u64(object.get("users")) {
        Some(users) => users,
        None => {
            defaulted.push("users");
            fallback::default_users(rng)
        }
    };

    let category = object
        .get("category")
        .and_then(Value::as_str)
        .map(Category::from_label)
        .unwrap_or_else(|| fallback::predict_category(extension_name));

    let extension = Extension {
        // Identity is the caller's; the model only fills in the profile
        id: extension_id.to_string(),
        name: extension_name.to_string(),
        category,
        rating,
        description: str_or(
            object,
            "description",
            format!("Chrome extension: {}", extension_name),
        ),
        functionality: str_or(
            object,
            "functionality",
            format!("Core functionality of {}", extension_name),
        ),
        use_case: str_or(
            object,
            "useCase",
            fallback::predict_use_case(extension_name).to_string(),
        ),
        users,
        last_updated: str_or(object, "lastUpdated", fallback::today_stamp()),
    };

    Some(AnalyzedItem::from_model(extension, defaulted))
}

/// Parse a similar-extensions response. Accepts a bare array or an object
/// with an "alternatives" array; skips entries that are not objects.
fn parse_similar(text: &str, requested: &Extension, rng: &mut impl Rng) -> Option<Vec<Extension>> {
    let value: Value = serde_json::from_str(parse::strip_code_fences(text)).ok()?;
    let items = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map.get("alternatives")?.as_array()?.as_slice(),
        _ => return None,
    };

    let mut out = Vec::with_capacity(items.len().min(MAX_COMPARABLES));
    for (idx, item) in items.iter().take(MAX_COMPARABLES).enumerate() {
        let object = match item.as_object() {
            Some(object) => object,
            None => continue,
        };

        let rating = parse::coerce_f64(object.get("rating"))
            .map(|rating| rating.clamp(1.0, 5.0))
            .unwrap_or_else(|| fallback::default_rating(rng));
        let users =
            parse::coerce_u64(object.get("users")).unwrap_or_else(|| fallback::default_users(rng));

        out.push(Extension {
            id: Uuid::new_v4().to_string(),
            name: str_or(object, "name", format!("Similar Extension {}", idx + 1)),
            category: object
                .get("category")
                .and_then(Value::as_str)
                .map(Category::from_label)
                .unwrap_or(requested.category),
            rating,
            description: str_or(object, "description", "Similar extension".to_string()),
            functionality: str_or(object, "functionality", requested.functionality.clone()),
            use_case: str_or(object, "useCase", requested.use_case.clone()),
            users,
            last_updated: str_or(object, "lastUpdated", fallback::today_stamp()),
        });
    }

    Some(out)
}

/// Parse a recommendation response. Suggested alternatives always come from
/// the locally computed overlap, never from model text, and only accompany a
/// denial.
fn parse_verdict(text: &str, overlapping: &[Extension]) -> Option<Verdict> {
    let value: Value = serde_json::from_str(parse::strip_code_fences(text)).ok()?;
    let object = value.as_object()?;

    let approved = parse::coerce_bool(object.get("isApproved")).unwrap_or(false);
    let reason = str_or(object, "reason", "AI analysis completed".to_string());
    let security_concerns = object.get("securityConcerns").and_then(concerns_text);

    let alternatives = if approved {
        Vec::new()
    } else {
        overlapping.iter().take(3).cloned().collect()
    };

    Some(Verdict {
        approved,
        reason,
        security_concerns,
        alternatives,
    })
}

fn str_or(object: &serde_json::Map<String, Value>, key: &str, default: String) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or(default)
}

fn concerns_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}
