use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

use crate::config::{self, OutputMode, ProfileConfig, non_empty_env};
use crate::consultation::{ConsultationRequest, Severity};
use crate::error::AdvisorError;
use crate::form::{Form, FormDraft};
use crate::llm::DEFAULT_BASE_URL;
use crate::llm::attachment;
use crate::llm::openai::{
    ChatCompletionRequest, CompletionClient, CompletionOptions, DEFAULT_MODEL, Usage,
};
use crate::llm::prompt::{ModelCapability, RequestBuilder};
use crate::llm::speech::{DEFAULT_TTS_MODEL, DEFAULT_VOICE, SpeechClient, SpeechRequest};
use crate::logging::{self, Verbosity};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const EMERGENCY_NOTICE: &str = "In case of an emergency, please contact your local medical facility or call your country's emergency number.";

pub const DISCLAIMER: &str = "As a reminder, this is not professional medical advice. If you are unsure, it is always best to visit a doctor.";

pub const VERSION_LINE: &str = concat!(
    "symptom-advisor ",
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("ADVISOR_GIT_SHA"),
    ", built: ",
    env!("ADVISOR_BUILD_TS"),
    ")"
);

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[arg(long, help = "Describe your symptoms")]
    symptoms: Option<String>,
    #[arg(long, help = "Severity from 1 (very mild) to 8 (extremely severe), or its label")]
    severity: Option<Severity>,
    #[arg(long, help = "How long the symptoms have lasted")]
    duration: Option<String>,
    #[arg(
        long = "info",
        visible_alias = "additional-info",
        help = "History, medications, exposures and other context"
    )]
    info: Option<String>,
    #[arg(long, value_name = "PATH", help = "Optional JPEG or PNG picture of the issue")]
    image: Option<PathBuf>,
    #[arg(short, long, help = "Ask for missing fields on the terminal")]
    interactive: bool,
    #[arg(long, help = "Profile name from the config file")]
    profile: Option<String>,
    #[arg(long, help = "Model id [env: ADVISOR_MODEL] [default: gpt-4o]")]
    model: Option<String>,
    #[arg(long, help = "Sampling temperature [env: ADVISOR_TEMPERATURE] [default: 0.7]")]
    temperature: Option<f64>,
    #[arg(long, help = "Completion token limit [env: ADVISOR_MAX_TOKENS] [default: 1000]")]
    max_tokens: Option<u32>,
    #[arg(long, help = "Per-request timeout in seconds [env: ADVISOR_TIMEOUT]")]
    timeout: Option<u64>,
    #[arg(long, value_name = "BOOL", help = "Force whether the model accepts images")]
    vision: Option<bool>,
    #[arg(long, value_enum, help = "Output format")]
    output: Option<OutputMode>,
    #[arg(long, help = "Shortcut for --output json")]
    json: bool,
    #[arg(long, value_name = "PATH", help = "Also write the output to a file")]
    save: Option<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Read the advice aloud into an MP3 file")]
    speak: Option<PathBuf>,
    #[arg(long, help = "Voice used with --speak [default: alloy]")]
    voice: Option<String>,
    #[arg(long, help = "Print the request instead of sending it")]
    dry_run: bool,
    #[arg(long, help = "Print token usage and latency on stderr")]
    show_usage: bool,
    #[arg(short, long, help = "Log request details on stderr")]
    verbose: bool,
    #[arg(short, long, help = "Only print the output and fatal errors")]
    quiet: bool,
    #[arg(long, help = "Print version and build metadata")]
    version: bool,
}

/// Effective settings after merging flags, environment, profile and defaults.
#[derive(Debug, Clone)]
struct Settings {
    model: String,
    system_prompt: Option<String>,
    options: CompletionOptions,
    output: OutputMode,
    base_url: String,
    capability: ModelCapability,
    tts_model: String,
    voice: String,
    show_usage: bool,
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, AdvisorError> {
    match non_empty_env(key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AdvisorError::Config(format!("Invalid {key} '{raw}'."))),
        None => Ok(None),
    }
}

fn resolve_settings(args: &AnalyzeArgs) -> Result<Settings, AdvisorError> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };

    let model = args
        .model
        .clone()
        .or_else(|| non_empty_env("ADVISOR_MODEL"))
        .or(profile.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let defaults = CompletionOptions::default();
    let options = CompletionOptions {
        temperature: args
            .temperature
            .or(env_value("ADVISOR_TEMPERATURE")?)
            .or(profile.temperature)
            .unwrap_or(defaults.temperature),
        max_tokens: args
            .max_tokens
            .or(env_value("ADVISOR_MAX_TOKENS")?)
            .or(profile.max_tokens)
            .unwrap_or(defaults.max_tokens),
        timeout_secs: args
            .timeout
            .or(env_value("ADVISOR_TIMEOUT")?)
            .or(profile.timeout),
    };

    let profile_output = profile.output.as_deref().and_then(OutputMode::parse);
    let output = if args.json {
        OutputMode::Json
    } else {
        args.output.or(profile_output).unwrap_or(OutputMode::Text)
    };

    let capability = args
        .vision
        .or(profile.vision)
        .map(ModelCapability::from_flag)
        .unwrap_or_else(|| ModelCapability::infer(&model));

    Ok(Settings {
        capability,
        system_prompt: profile.system,
        options,
        output,
        base_url: non_empty_env("ADVISOR_BASE_URL")
            .or(profile.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        tts_model: profile
            .tts_model
            .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
        voice: args
            .voice
            .clone()
            .or(profile.voice)
            .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        show_usage: args.show_usage || profile.show_usage.unwrap_or(false),
        model,
    })
}

fn collect_form(args: &AnalyzeArgs) -> Result<FormDraft, AdvisorError> {
    let draft = FormDraft {
        symptoms: args.symptoms.clone().unwrap_or_default(),
        severity: args.severity,
        duration: args.duration.clone().unwrap_or_default(),
        additional_info: args.info.clone().unwrap_or_default(),
        image_path: args.image.clone(),
    };
    if !args.interactive {
        return Ok(draft);
    }

    let stdin = io::stdin();
    Form::new(stdin.lock(), io::stderr())
        .fill(draft)
        .map_err(|err| AdvisorError::io("Failed to read form input", err))
}

/// Validates the text fields, then loads and normalizes the image.
fn load_consultation(draft: FormDraft) -> Result<ConsultationRequest, AdvisorError> {
    let mut request =
        ConsultationRequest::new(draft.symptoms, draft.duration, draft.additional_info);
    request.severity = draft.severity;
    request.validate()?;

    if let Some(path) = draft.image_path {
        let raw = fs::read(&path).map_err(|source| AdvisorError::ReadImage {
            path: path.clone(),
            source,
        })?;
        let jpeg = attachment::to_jpeg(&raw)
            .map_err(|source| AdvisorError::Image { path: path.clone(), source })?;
        tracing::debug!(
            path = %path.display(),
            bytes = raw.len(),
            jpeg_bytes = jpeg.len(),
            "image attached"
        );
        request.image = Some(jpeg);
    }
    Ok(request)
}

#[derive(Debug, Serialize)]
struct Advice<'a> {
    model: &'a str,
    advice: &'a str,
    severity: Option<&'static str>,
    urgent_care_warning: Option<&'static str>,
    usage: Option<Usage>,
    speech_file: Option<&'a Path>,
    disclaimer: &'static str,
}

fn render_text(advice: &Advice<'_>, styled: bool) -> String {
    let heading = |title: &str| {
        if styled {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    };

    let mut out = String::new();
    if let Some(warning) = advice.urgent_care_warning {
        if styled {
            out.push_str(&warning.red().bold().to_string());
        } else {
            out.push_str(warning);
        }
        out.push_str("\n\n");
    }
    out.push_str(&heading("Health Advice"));
    out.push('\n');
    out.push_str(advice.advice);
    out.push('\n');
    if let Some(path) = advice.speech_file {
        out.push_str(&format!("\nSpeech saved to {}\n", path.display()));
    }
    out.push('\n');
    out.push_str(&heading("Emergency Contacts"));
    out.push('\n');
    out.push_str(EMERGENCY_NOTICE);
    out.push_str("\n\n");
    out.push_str(advice.disclaimer);
    out
}

/// Output for stdout and for the `--save` file. Only stdout is ever styled.
struct Rendered {
    shown: String,
    saved: String,
}

impl Rendered {
    fn plain(text: String) -> Self {
        Self {
            saved: text.clone(),
            shown: text,
        }
    }
}

fn render(advice: &Advice<'_>, output: OutputMode, styled: bool) -> Result<Rendered, AdvisorError> {
    match output {
        OutputMode::Text => Ok(Rendered {
            shown: render_text(advice, styled),
            saved: render_text(advice, false),
        }),
        OutputMode::Json => to_json(advice).map(Rendered::plain),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AdvisorError> {
    Ok(serde_json::to_string(value)?)
}

/// Prints the output and, when asked, overwrites `save` with its plain form.
fn emit(rendered: &Rendered, save: Option<&Path>) -> Result<(), AdvisorError> {
    println!("{}", rendered.shown);
    if let Some(path) = save {
        write_file(path, format!("{}\n", rendered.saved).as_bytes())?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), AdvisorError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            AdvisorError::io(
                format!("Failed to create output directory '{}'", parent.display()),
                err,
            )
        })?;
    }
    fs::write(path, contents)
        .map_err(|err| AdvisorError::io(format!("Failed to write '{}'", path.display()), err))
}

fn usage_line(usage: Option<&Usage>, latency_ms: u64) -> String {
    let field = |value: Option<u32>| value.map_or_else(|| "?".to_string(), |v| v.to_string());
    match usage {
        Some(usage) => format!(
            "usage: prompt_tokens={} completion_tokens={} total_tokens={} latency_ms={latency_ms}",
            field(usage.prompt_tokens),
            field(usage.completion_tokens),
            field(usage.total_tokens),
        ),
        None => format!("usage: unavailable latency_ms={latency_ms}"),
    }
}

pub async fn run(args: AnalyzeArgs) -> Result<(), AdvisorError> {
    if args.version {
        println!("{VERSION_LINE}");
        return Ok(());
    }

    logging::init(Verbosity::from_flags(args.verbose, args.quiet));

    let settings = resolve_settings(&args)?;
    let request = load_consultation(collect_form(&args)?)?;

    let mut builder =
        RequestBuilder::new(settings.model.as_str()).with_capability(settings.capability);
    if let Some(system) = &settings.system_prompt {
        builder = builder.with_system_prompt(system.as_str());
    }
    let messages = builder.messages(&request)?;
    let payload = ChatCompletionRequest::new(settings.model.as_str(), messages, &settings.options);

    tracing::debug!(
        model = %settings.model,
        capability = ?settings.capability,
        messages = payload.messages.len(),
        image = request.image.is_some(),
        api_key_present = non_empty_env(API_KEY_ENV).is_some(),
        "consultation ready"
    );

    if args.dry_run {
        let report = json!({
            "dry_run": true,
            "model": settings.model,
            "capability": settings.capability,
            "base_url": settings.base_url,
            "output": settings.output,
            "severity": request.severity.map(Severity::label),
            "urgent_care_warning": request.care_warning(),
            "messages": payload.messages,
            "request": {
                "temperature": settings.options.temperature,
                "max_tokens": settings.options.max_tokens,
                "timeout_secs": settings.options.timeout_secs,
            },
            "speech": args.speak.as_ref().map(|path| json!({
                "model": settings.tts_model,
                "voice": settings.voice,
                "file": path,
            })),
        });
        emit(&Rendered::plain(to_json(&report)?), args.save.as_deref())?;
        if settings.show_usage && !args.quiet {
            eprintln!("{} (dry-run)", usage_line(None, 0));
        }
        return Ok(());
    }

    let api_key = non_empty_env(API_KEY_ENV).ok_or(AdvisorError::MissingApiKey)?;

    let started = Instant::now();
    let completion = CompletionClient::new(api_key.as_str())
        .with_base_url(settings.base_url.as_str())
        .complete(&payload, settings.options.timeout_secs)
        .await?;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::debug!(latency_ms, chars = completion.content.len(), "advice received");

    // The advice is printed even when speech fails; the failure is returned afterwards.
    let mut speech_file = None;
    let mut speech_error = None;
    if let Some(path) = &args.speak {
        match speak(&settings, &api_key, &completion.content, path).await {
            Ok(()) => speech_file = Some(path.as_path()),
            Err(err) => speech_error = Some(err),
        }
    }

    let advice = Advice {
        model: &settings.model,
        advice: &completion.content,
        severity: request.severity.map(Severity::label),
        urgent_care_warning: request.care_warning(),
        usage: completion.usage,
        speech_file,
        disclaimer: DISCLAIMER,
    };
    let rendered = render(&advice, settings.output, io::stdout().is_terminal())?;
    emit(&rendered, args.save.as_deref())?;

    if settings.show_usage && !args.quiet {
        eprintln!("{}", usage_line(completion.usage.as_ref(), latency_ms));
    }
    match speech_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Reads `text` aloud through the speech endpoint and writes the MP3 to `path`.
async fn speak(
    settings: &Settings,
    api_key: &str,
    text: &str,
    path: &Path,
) -> Result<(), AdvisorError> {
    let speech = SpeechRequest::mp3(settings.tts_model.as_str(), settings.voice.as_str(), text);
    let audio = SpeechClient::new(api_key)
        .with_base_url(settings.base_url.as_str())
        .synthesize(&speech, settings.options.timeout_secs)
        .await?;
    write_file(path, &audio)?;
    tracing::debug!(path = %path.display(), bytes = audio.len(), "speech written");
    Ok(())
}
