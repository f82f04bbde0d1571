/// Symptom analysis: form, prompt, completion call and rendering.
pub mod analyze;
/// Config file inspection.
pub mod config;
