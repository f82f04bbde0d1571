use serde::Serialize;
use thiserror::Error;

use crate::consultation::{ConsultationRequest, IncompleteInput};
use crate::llm::attachment::jpeg_data_url;
use crate::llm::message::{ChatMessage, ContentPart};

/// Instructions sent as the system message of every consultation.
pub const SYSTEM_PROMPT: &str = "You are now a helpful medical assistant designed to aid users in \
identifying medical issues and suggesting steps to manage them. Your role is to analyze user \
inputs about their health concerns and offer informative, supportive advice. When responding, \
follow this structured input and output format: \
Input Format for Users: \
1. Symptoms: Users should describe their symptoms clearly and thoroughly. \
2. Duration: Users need to specify how long they have been experiencing these symptoms. \
3. Additional Information: This includes any relevant personal health history, recent exposures, \
changes in lifestyle, current medications, and any other context that might affect their condition. \
4. Image (if applicable): If there’s a visible manifestation of their issue (like a rash or \
swelling), users can upload an image to provide visual context. \
Your Response Should Include: \
1. Identification of the Issue (if possible from the description): Based on the symptoms and \
duration, suggest possible medical issues. \
2. Severity and Urgency: Assess and communicate the potential severity of the symptoms and the \
urgency with which medical attention might be needed. \
3. Duration the Symptoms May Last: Provide an estimate on how long the symptoms might persist, \
based on the identified issue or similar conditions. \
4. Self-Care Recommendations: Suggest actionable steps the user can take at home to ease symptoms \
or facilitate recovery. This could include lifestyle adjustments, over-the-counter medications, \
or simple home remedies. \
5. Guidance on Daily Activities: Advise whether the symptoms are severe enough that the user should \
consider taking time off from work or school. \
6. When to See a Doctor: Clearly state if and when it would be advisable to seek professional \
medical evaluation, particularly if symptoms are severe, worsening, or persist longer than typical \
for the suspected issue. \
7. Reminder of Limitations: Remind users that the advice provided is based on the information they \
submitted and is not professional medical advice. Users should seek direct medical evaluation for \
a definitive diagnosis and treatment, especially for serious or life-threatening conditions. \
Additional Guidelines for Your Responses: \
- Empathy and Support: Always communicate in a tone that is empathetic and supportive, recognizing \
the concerns and anxieties that health issues can provoke. \
- Privacy and Sensitivity: Ensure that responses respect user privacy and handle sensitive health \
information with care. \
- Encourage Professional Help: Consistently encourage users to seek professional medical advice \
for a definitive diagnosis and treatment, especially if the situation could potentially be serious.";

/// Text part that accompanies an attached image.
pub const IMAGE_INSTRUCTION: &str = "Please analyze the following image for further information.";

/// Whether the target model accepts image content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    TextOnly,
    Multimodal,
}

const MULTIMODAL_FAMILIES: [&str; 9] = [
    "gpt-4o",
    "chatgpt-4o",
    "gpt-4.1",
    "gpt-4.5",
    "gpt-4-turbo",
    "gpt-5",
    "o1",
    "o3",
    "o4",
];

const TEXT_ONLY_MODELS: [&str; 4] = ["o1-mini", "o1-preview", "o3-mini", "gpt-4-turbo-preview"];

impl ModelCapability {
    /// Guesses the capability from a model id such as `gpt-4o-mini`.
    pub fn infer(model: &str) -> Self {
        let name = model.rsplit('/').next().unwrap_or(model).to_ascii_lowercase();
        if TEXT_ONLY_MODELS
            .iter()
            .any(|text_only| name.starts_with(text_only))
        {
            return Self::TextOnly;
        }
        let multimodal = name.contains("vision")
            || MULTIMODAL_FAMILIES.iter().any(|family| {
                name.strip_prefix(family)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
            });
        if multimodal {
            Self::Multimodal
        } else {
            Self::TextOnly
        }
    }

    pub fn from_flag(vision: bool) -> Self {
        if vision { Self::Multimodal } else { Self::TextOnly }
    }

    pub fn accepts_images(self) -> bool {
        self == Self::Multimodal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteInput),
    #[error(
        "Model '{model}' does not accept images. Drop the image, pick a multimodal model, or set vision = true."
    )]
    ImageUnsupported { model: String },
}

/// The user-facing question for one consultation.
pub fn user_prompt(request: &ConsultationRequest) -> String {
    let mut prompt = format!(
        "Analyze the following symptoms: {} for {}. Additional info: {}.",
        request.symptoms, request.duration, request.additional_info
    );
    if let Some(severity) = request.severity {
        prompt.push_str(&format!(" Severity: {}.", severity.label()));
    }
    prompt
}

/// Assembles the chat messages for a consultation.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    capability: ModelCapability,
    system_prompt: String,
}

impl RequestBuilder {
    /// Builder for `model`, with its capability inferred from the id.
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            capability: ModelCapability::infer(&model),
            model,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_capability(mut self, capability: ModelCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn capability(&self) -> ModelCapability {
        self.capability
    }

    /// Validates `request` and returns the system and user messages,
    /// followed by an image message when a picture is attached.
    pub fn messages(&self, request: &ConsultationRequest) -> Result<Vec<ChatMessage>, BuildError> {
        request.validate()?;

        let mut messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(user_prompt(request)),
        ];

        if let Some(jpeg) = &request.image {
            if !self.capability.accepts_images() {
                return Err(BuildError::ImageUnsupported {
                    model: self.model.clone(),
                });
            }
            messages.push(ChatMessage::user_parts(vec![
                ContentPart::text(IMAGE_INSTRUCTION),
                ContentPart::image_url(jpeg_data_url(jpeg)),
            ]));
        }

        Ok(messages)
    }
}
