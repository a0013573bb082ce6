//! Live adapters that call the provider HTTP APIs.

pub mod gemini;
pub mod openrouter;

use reqwest::StatusCode;

use crate::error::{GenerationError, Operation};
use crate::error_message::extract_error_message;
use crate::model::ModelDescriptor;
use crate::ports::{BriefRequest, GeneratedBrief, ReferenceImage};
use crate::prompt::strip_code_fence;

/// Fail before any network call when a required credential is absent.
pub(crate) fn ensure_credential<'a>(
    model: &ModelDescriptor,
    credential: Option<&'a str>,
) -> Result<Option<&'a str>, GenerationError> {
    let credential = credential.filter(|c| !c.trim().is_empty());
    if credential.is_none() && model.requires_credential() {
        return Err(GenerationError::MissingCredential {
            model: model.id.to_string(),
            family: model.family.display_name().to_string(),
            env_var: model.family.env_var().to_string(),
        });
    }
    Ok(credential)
}

/// The reference image to send, if the model can take it.
///
/// Images offered to text-only models are dropped with a warning; the
/// request still goes ahead.
pub(crate) fn usable_reference_image(request: &BriefRequest) -> Option<&ReferenceImage> {
    let image = request.reference_image.as_ref()?;
    if request.model.accepts_image_input {
        Some(image)
    } else {
        tracing::warn!(
            model = request.model.id,
            "reference image ignored: model does not accept image input"
        );
        None
    }
}

/// Turn a non-success response into a transport error.
pub(crate) fn api_error(operation: Operation, status: StatusCode, body: &str) -> GenerationError {
    let message = extract_error_message(body);
    tracing::error!(%operation, status = status.as_u16(), "provider returned an error");
    GenerationError::Api { operation, status: status.as_u16(), message }
}

/// Parse the model's textual completion into a brief.
pub(crate) fn parse_brief_content(content: Option<&str>) -> Result<GeneratedBrief, GenerationError> {
    let invalid =
        |diagnostic: String| GenerationError::InvalidFormat { operation: Operation::Brief, diagnostic };

    let content = content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| invalid("API response is missing the message content.".to_string()))?;

    let brief: GeneratedBrief =
        serde_json::from_str(strip_code_fence(content)).map_err(|e| invalid(e.to_string()))?;

    if brief.narrative_prompt.trim().is_empty() {
        return Err(invalid("The brief has an empty prompt.".to_string()));
    }
    Ok(brief)
}

/// Parse a success body as JSON, mapping failures to a format error.
pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(
    operation: Operation,
    body: &str,
) -> Result<T, GenerationError> {
    serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidFormat { operation, diagnostic: e.to_string() })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{default_text_model, find_image_model};

    #[test]
    fn credential_not_needed_for_free_models() {
        assert_eq!(ensure_credential(default_text_model(), None).unwrap(), None);
    }

    #[test]
    fn credential_required_for_paid_models() {
        let model = find_image_model("openai/dall-e-3").unwrap();
        let err = ensure_credential(model, Some("   ")).unwrap_err();
        assert!(matches!(err, GenerationError::MissingCredential { .. }));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
        assert_eq!(ensure_credential(model, Some("sk-1")).unwrap(), Some("sk-1"));
    }

    #[test]
    fn api_error_uses_extraction() {
        let err = api_error(
            Operation::Thumbnail,
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Rate limited","code":429}}"#,
        );
        assert_eq!(
            err.to_string(),
            "Failed to generate thumbnail. Status: 429: Rate limited (Code: 429)"
        );
    }

    #[test]
    fn parse_brief_with_fences() {
        let content = "```json\n{\"model\":\"sora-2-pro\",\"duration\":8,\"aspect_ratio\":\"16:9\",\
\"prompt\":\"Hook\",\"sound\":\"Bass\",\"style\":\"Neon\",\"twist\":\"Raccoons\"}\n```";
        let brief = parse_brief_content(Some(content)).unwrap();
        assert_eq!(brief.narrative_prompt, "Hook");
        assert!((brief.duration_seconds - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_brief_missing_content() {
        let err = parse_brief_content(None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The AI model returned an invalid format. API response is missing the message content."
        );
    }

    #[test]
    fn parse_brief_not_json() {
        let err = parse_brief_content(Some("Sure! Here is your prompt")).unwrap_err();
        assert!(err.to_string().starts_with("The AI model returned an invalid format. "));
    }

    #[test]
    fn parse_brief_empty_prompt() {
        let content = r#"{"model":"m","duration":8,"aspect_ratio":"1:1","prompt":" ","sound":"s","style":"s","twist":"t"}"#;
        assert!(matches!(
            parse_brief_content(Some(content)),
            Err(GenerationError::InvalidFormat { .. })
        ));
    }
}
