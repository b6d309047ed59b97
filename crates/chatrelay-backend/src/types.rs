use serde::{Deserialize, Serialize};

/// Body sent to the generation backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub user_id: String,
    pub session_id: String,
    /// True when the prompt is the first turn of the session
    pub new: bool,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            new: false,
        }
    }

    pub fn first_turn(mut self, new: bool) -> Self {
        self.new = new;
        self
    }
}

/// Reply from the generation backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReply {
    pub response: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Names to resolve through the resource-lookup service
    #[serde(default, alias = "replacement_parts", skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,

    /// Free-form qualifier for the references (e.g. a vehicle model)
    #[serde(default, alias = "car_model", skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerationReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Suggested title, ignoring blank suggestions
    pub fn suggested_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn reference_names(&self) -> &[String] {
        self.references.as_deref().unwrap_or(&[])
    }
}

/// Body sent to the resource-lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub names: Vec<String>,
    pub context: Option<String>,
}

/// One lookup result; `url` is null when the name could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A resolved reference returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLink {
    pub name: String,
    pub url: String,
}

impl LookupEntry {
    pub fn resolved(self) -> Option<ResourceLink> {
        let name = self.name;
        self.url.map(|url| ResourceLink { name, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generation_request_wire_format() {
        let request = GenerationRequest::new("hi", "u1", "s1").first_turn(true);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({ "prompt": "hi", "userId": "u1", "sessionId": "s1", "new": true })
        );
    }

    #[test]
    fn test_reply_accepts_legacy_field_names() {
        let reply: GenerationReply = serde_json::from_value(json!({
            "response": "Check the pads",
            "title": "Brakes",
            "replacement_parts": ["Brake pad"],
            "car_model": "Civic 2012"
        }))
        .unwrap();

        assert_eq!(reply.reference_names(), ["Brake pad".to_string()]);
        assert_eq!(reply.context.as_deref(), Some("Civic 2012"));
        assert_eq!(reply.suggested_title(), Some("Brakes"));
    }

    #[test]
    fn test_reply_optional_fields() {
        let reply: GenerationReply = serde_json::from_value(json!({
            "response": "ok",
            "title": "   ",
            "references": null
        }))
        .unwrap();

        assert!(reply.reference_names().is_empty());
        assert_eq!(reply.suggested_title(), None);
    }

    #[test]
    fn test_reply_without_response_is_rejected() {
        let parsed = serde_json::from_value::<GenerationReply>(json!({ "title": "x" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_lookup_entry_resolution() {
        let resolved = LookupEntry { name: "Pad".into(), url: Some("https://p/1".into()) }.resolved();
        assert_eq!(resolved, Some(ResourceLink { name: "Pad".into(), url: "https://p/1".into() }));

        assert_eq!(LookupEntry { name: "Rotor".into(), url: None }.resolved(), None);
    }
}
