//! Client for the Google Generative Language API.
//!
//! Two single-prompt operations: structural image analysis and poem
//! generation. Both send one multimodal request and extract the first
//! candidate's text; neither is retried.

use serde::{Deserialize, Serialize};

use crate::error::{PoetError, PoetResult};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Structured description of an uploaded photo, phrased in the requested
/// language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub objects: Vec<String>,
    pub themes: Vec<String>,
    pub mood: String,
}

impl ImageAnalysis {
    /// One-line summary quoted verbatim in the poem prompt.
    pub fn summary(&self) -> String {
        let join = |items: &[String]| {
            if items.is_empty() {
                "none".to_owned()
            } else {
                items.join(", ")
            }
        };
        let mood = if self.mood.is_empty() {
            "neutral"
        } else {
            &self.mood
        };
        format!(
            "Objects: {}. Themes: {}. Mood: {}.",
            join(&self.objects),
            join(&self.themes),
            mood
        )
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }

    /// Describes the image: key objects, themes and overall mood, all in
    /// `language`.
    pub async fn analyze_image(
        &self,
        image_b64: &str,
        language: &str,
    ) -> PoetResult<ImageAnalysis> {
        let prompt = format!(
            "You are an AI expert in image analysis. Analyze the provided image: \
             identify key objects, themes, and the overall mood.\n\
             Return ONLY a JSON object (no markdown, no explanations):\n\
             {{\"objects\": [\"...\"], \"themes\": [\"...\"], \"mood\": \"...\"}}\n\
             IMPORTANT: every object, every theme and the mood description MUST \
             be written in {language}."
        );
        let text = self.generate(prompt, image_b64).await?;
        parse_analysis(&text)
    }

    /// Writes a poem in the given style and language, grounded in the image
    /// and the analysis summary.
    pub async fn generate_poem(
        &self,
        image_b64: &str,
        style: &str,
        language: &str,
        analysis_summary: &str,
    ) -> PoetResult<String> {
        let prompt = format!(
            "You are a talented poet. Write a poem in the {style} style, \
             inspired by the provided image.\n\
             What the image shows: {analysis_summary}\n\
             IMPORTANT: the poem MUST be written in {language}.\n\
             Return ONLY the poem text with explicit line breaks. No title, \
             no commentary."
        );
        let poem = self.generate(prompt, image_b64).await?;
        Ok(poem.trim().to_owned())
    }

    async fn generate(&self, prompt: String, image_b64: &str) -> PoetResult<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/jpeg".to_owned(),
                            data: image_b64.to_owned(),
                        },
                    },
                ],
            }],
        };

        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        tracing::debug!(model = %self.model, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PoetError::upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PoetError::upstream(format!(
                "model service returned {status}: {body}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| PoetError::upstream(format!("unreadable model response: {e}")))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| PoetError::upstream("model returned no candidates"))?;

        Ok(text.to_owned())
    }
}

/// Parses the analysis reply, tolerating the markdown fences some models
/// wrap JSON in.
fn parse_analysis(text: &str) -> PoetResult<ImageAnalysis> {
    let clean = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(clean)
        .map_err(|e| PoetError::upstream(format!("unparseable analysis: {e}; reply was: {clean}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_analysis() {
        let analysis =
            parse_analysis(r#"{"objects":["tree"],"themes":["solitude"],"mood":"calm"}"#).unwrap();
        assert_eq!(analysis.objects, vec!["tree"]);
        assert_eq!(analysis.themes, vec!["solitude"]);
        assert_eq!(analysis.mood, "calm");
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = "```json\n{\"objects\":[],\"themes\":[],\"mood\":\"quiet\"}\n```";
        let analysis = parse_analysis(fenced).unwrap();
        assert_eq!(analysis.mood, "quiet");
    }

    #[test]
    fn rejects_prose_reply_as_upstream_failure() {
        let err = parse_analysis("I see a tree in the image.").unwrap_err();
        assert!(matches!(err, PoetError::Upstream(_)));
    }

    #[test]
    fn summary_matches_display_format() {
        let analysis = ImageAnalysis {
            objects: vec!["tree".into(), "field".into()],
            themes: vec!["solitude".into()],
            mood: "melancholy".into(),
        };
        assert_eq!(
            analysis.summary(),
            "Objects: tree, field. Themes: solitude. Mood: melancholy."
        );
    }

    #[test]
    fn summary_fills_empty_fields() {
        let analysis = ImageAnalysis {
            objects: vec![],
            themes: vec![],
            mood: String::new(),
        };
        assert_eq!(analysis.summary(), "Objects: none. Themes: none. Mood: neutral.");
    }
}
