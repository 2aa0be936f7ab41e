//! Mock Google Generative Language API backend
//!
//! Speaks just enough of the `generateContent` wire format to exercise the
//! provider end to end with canned story and analysis responses

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Canned story text; first line becomes the title
pub const STORY_TEXT: &str = "Title: The Moonlit Meadow\n\nFern the fox could not sleep, so she padded out to count the stars.\nThe meadow grass whispered hello, and the moon walked her home to bed.";

/// How the mock answers `generateContent` calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Canned story or analysis response
    Ok,
    /// 429 with a Retry-After header
    RateLimited,
    /// 400 with a structured error body
    InvalidArgument,
    /// 500 with a structured error body
    Failing,
    /// 200 whose prompt feedback reports a safety block
    SafetyBlocked,
    /// Accept the request and never answer
    Hang,
}

/// Mock Gemini backend that returns predictable responses
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    behavior: Behavior,
    story_count: AtomicU32,
    analysis_count: AtomicU32,
    models_count: AtomicU32,
    /// Prompt text of every story request received
    prompts: Mutex<Vec<String>>,
}

impl MockGemini {
    /// Start the mock server with canned success responses
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Behavior::Ok).await
    }

    /// Start a mock server with the given behavior
    pub async fn start_with(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            story_count: AtomicU32::new(0),
            analysis_count: AtomicU32::new(0),
            models_count: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1beta/models/{model}", routing::post(handle_generate))
            .route("/v1beta/models", routing::get(handle_models))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Number of story generation requests received
    pub fn story_count(&self) -> u32 {
        self.state.story_count.load(Ordering::SeqCst)
    }

    /// Number of image analysis requests received
    pub fn analysis_count(&self) -> u32 {
        self.state.analysis_count.load(Ordering::SeqCst)
    }

    /// Number of model list requests received
    pub fn models_count(&self) -> u32 {
        self.state.models_count.load(Ordering::SeqCst)
    }

    /// Prompt text of every story request received so far
    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }

    /// Stop the server, leaving the port unreachable
    pub fn stop(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generate(
    State(state): State<Arc<MockState>>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let image_count = request
        .contents
        .iter()
        .flat_map(|content| content.parts.iter())
        .filter(|part| matches!(part, Part::InlineData(_)))
        .count();

    if image_count > 0 {
        state.analysis_count.fetch_add(1, Ordering::SeqCst);
    } else {
        state.story_count.fetch_add(1, Ordering::SeqCst);
        let prompt = request
            .contents
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineData(_) => None,
            })
            .collect();
        state.prompts.lock().unwrap().push(prompt);
    }

    match state.behavior {
        Behavior::Ok if image_count > 0 => Json(analysis_response(image_count)).into_response(),
        Behavior::Ok => Json(story_response()).into_response(),
        Behavior::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "7")],
            Json(error_body(429, "quota exhausted", "RESOURCE_EXHAUSTED")),
        )
            .into_response(),
        Behavior::InvalidArgument => (
            StatusCode::BAD_REQUEST,
            Json(error_body(400, "contents must not be empty", "INVALID_ARGUMENT")),
        )
            .into_response(),
        Behavior::Failing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_body(500, "internal error", "INTERNAL")),
        )
            .into_response(),
        Behavior::SafetyBlocked => Json(blocked_response()).into_response(),
        Behavior::Hang => std::future::pending().await,
    }
}

async fn handle_models(State(state): State<Arc<MockState>>) -> Response {
    state.models_count.fetch_add(1, Ordering::SeqCst);

    match state.behavior {
        Behavior::Failing => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_body(500, "internal error", "INTERNAL")),
        )
            .into_response(),
        Behavior::Hang => std::future::pending().await,
        _ => Json(ModelList {
            models: vec![
                Model {
                    name: "models/gemini-1.5-flash".to_owned(),
                },
                Model {
                    name: "models/gemini-1.5-pro".to_owned(),
                },
            ],
        })
        .into_response(),
    }
}

fn story_response() -> GenerateResponse {
    GenerateResponse {
        candidates: vec![Candidate {
            content: ResponseContent {
                role: "model".to_owned(),
                parts: vec![ResponsePart {
                    text: STORY_TEXT.to_owned(),
                }],
            },
            finish_reason: "STOP".to_owned(),
            safety_ratings: negligible_ratings(),
        }],
        prompt_feedback: None,
        usage_metadata: Some(UsageMetadata {
            prompt_token_count: 50,
            candidates_token_count: 120,
            total_token_count: 170,
        }),
    }
}

/// One analysis object per image, fenced the way the live model answers
fn analysis_response(image_count: usize) -> GenerateResponse {
    let analyses: Vec<serde_json::Value> = (1..=image_count)
        .map(|n| {
            serde_json::json!({
                "description": format!("a crayon drawing of a sailboat on a sunny sea (picture {n})"),
                "tags": ["sailboat", "sea"],
                "child_friendly": true,
            })
        })
        .collect();
    let body = serde_json::to_string(&analyses).unwrap();

    GenerateResponse {
        candidates: vec![Candidate {
            content: ResponseContent {
                role: "model".to_owned(),
                parts: vec![ResponsePart {
                    text: format!("```json\n{body}\n```"),
                }],
            },
            finish_reason: "STOP".to_owned(),
            safety_ratings: negligible_ratings(),
        }],
        prompt_feedback: None,
        usage_metadata: Some(UsageMetadata {
            prompt_token_count: 260,
            candidates_token_count: 48,
            total_token_count: 308,
        }),
    }
}

fn blocked_response() -> GenerateResponse {
    GenerateResponse {
        candidates: Vec::new(),
        prompt_feedback: Some(PromptFeedback {
            block_reason: "SAFETY".to_owned(),
            safety_ratings: vec![SafetyRating {
                category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_owned(),
                probability: "HIGH".to_owned(),
            }],
        }),
        usage_metadata: None,
    }
}

fn negligible_ratings() -> Vec<SafetyRating> {
    vec![
        SafetyRating {
            category: "HARM_CATEGORY_HARASSMENT".to_owned(),
            probability: "NEGLIGIBLE".to_owned(),
        },
        SafetyRating {
            category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_owned(),
            probability: "NEGLIGIBLE".to_owned(),
        },
    ]
}

fn error_body(code: u32, message: &str, status: &str) -> ErrorBody {
    ErrorBody {
        error: ErrorDetail {
            code,
            message: message.to_owned(),
            status: status.to_owned(),
        },
    }
}

// -- Wire types matching the Generative Language API format --

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    InlineData(serde_json::Value),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: ResponseContent,
    finish_reason: String,
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Serialize)]
struct ResponseContent {
    role: String,
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Serialize)]
struct ResponsePart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: String,
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Serialize)]
struct SafetyRating {
    category: String,
    probability: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: u32,
    candidates_token_count: u32,
    total_token_count: u32,
}

#[derive(Debug, Serialize)]
struct ModelList {
    models: Vec<Model>,
}

#[derive(Debug, Serialize)]
struct Model {
    name: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: u32,
    message: String,
    status: String,
}
