use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Warning shown whenever the most severe level is selected.
pub const IMMEDIATE_CARE_WARNING: &str = "We recommend that you see a doctor immediately.";

/// Ordinal severity scale offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    VeryMild,
    Mild,
    MildModerate,
    Moderate,
    ModerateSevere,
    Severe,
    VerySevere,
    ExtremelySevere,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Self::VeryMild,
        Self::Mild,
        Self::MildModerate,
        Self::Moderate,
        Self::ModerateSevere,
        Self::Severe,
        Self::VerySevere,
        Self::ExtremelySevere,
    ];

    /// 1-based position on the scale.
    pub fn level(self) -> u8 {
        match self {
            Self::VeryMild => 1,
            Self::Mild => 2,
            Self::MildModerate => 3,
            Self::Moderate => 4,
            Self::ModerateSevere => 5,
            Self::Severe => 6,
            Self::VerySevere => 7,
            Self::ExtremelySevere => 8,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(usize::from(level).checked_sub(1)?).copied()
    }

    /// Display label, e.g. `8. Extremely Severe`.
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryMild => "1. Very Mild",
            Self::Mild => "2. Mild",
            Self::MildModerate => "3. Mild-Moderate",
            Self::Moderate => "4. Moderate",
            Self::ModerateSevere => "5. Moderate-Severe",
            Self::Severe => "6. Severe",
            Self::VerySevere => "7. Very Severe",
            Self::ExtremelySevere => "8. Extremely Severe",
        }
    }

    fn words(self) -> &'static str {
        self.label().split_once(". ").map_or("", |(_, words)| words)
    }

    pub fn requires_immediate_care(self) -> bool {
        self == Self::ExtremelySevere
    }

    pub fn care_warning(self) -> Option<&'static str> {
        self.requires_immediate_care().then_some(IMMEDIATE_CARE_WARNING)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            ' ' | '-' | '_' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(level) = trimmed.parse::<u8>() {
            return Self::from_level(level)
                .ok_or_else(|| format!("Severity level must be between 1 and 8, got {level}."));
        }

        let wanted = normalize(trimmed);
        Self::ALL
            .into_iter()
            .find(|severity| {
                wanted == normalize(severity.label()) || wanted == normalize(severity.words())
            })
            .ok_or_else(|| {
                format!(
                    "Invalid severity '{trimmed}'. Use a level from 1 to 8 or a label such as '{}'.",
                    Self::ExtremelySevere.label()
                )
            })
    }
}

/// Required form fields, in display order.
pub const REQUIRED_FIELDS: [&str; 3] = ["symptoms", "duration", "additional info"];

/// A required form field was left empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill out all fields (missing: {}).", .missing.join(", "))]
pub struct IncompleteInput {
    pub missing: Vec<&'static str>,
}

/// One submission of the symptom form.
#[derive(Debug, Clone, Default)]
pub struct ConsultationRequest {
    pub symptoms: String,
    pub duration: String,
    pub additional_info: String,
    pub severity: Option<Severity>,
    /// JPEG bytes of the attached picture.
    pub image: Option<Vec<u8>>,
}

impl ConsultationRequest {
    pub fn new(
        symptoms: impl Into<String>,
        duration: impl Into<String>,
        additional_info: impl Into<String>,
    ) -> Self {
        Self {
            symptoms: symptoms.into(),
            duration: duration.into(),
            additional_info: additional_info.into(),
            severity: None,
            image: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_image(mut self, jpeg: Vec<u8>) -> Self {
        self.image = Some(jpeg);
        self
    }

    /// Names of the required fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [&self.symptoms, &self.duration, &self.additional_info]
            .into_iter()
            .zip(REQUIRED_FIELDS)
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, name)| name)
            .collect()
    }

    pub fn validate(&self) -> Result<(), IncompleteInput> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(IncompleteInput { missing })
        }
    }

    pub fn care_warning(&self) -> Option<&'static str> {
        self.severity.and_then(Severity::care_warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_levels_labels_and_words() {
        assert_eq!("8".parse::<Severity>(), Ok(Severity::ExtremelySevere));
        assert_eq!(
            "8. Extremely Severe".parse::<Severity>(),
            Ok(Severity::ExtremelySevere)
        );
        assert_eq!("mild-moderate".parse::<Severity>(), Ok(Severity::MildModerate));
        assert_eq!("Very_Mild".parse::<Severity>(), Ok(Severity::VeryMild));
        assert!("0".parse::<Severity>().is_err());
        assert!("9".parse::<Severity>().is_err());
        assert!("terrible".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_levels_round_trip_through_labels() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_level(severity.level()), Some(severity));
            assert_eq!(severity.label().parse::<Severity>(), Ok(severity));
        }
    }

    #[test]
    fn only_extremely_severe_triggers_warning() {
        for severity in Severity::ALL {
            let expected =
                (severity == Severity::ExtremelySevere).then_some(IMMEDIATE_CARE_WARNING);
            assert_eq!(severity.care_warning(), expected);
        }
        let request =
            ConsultationRequest::new("pain", "1 day", "none")
                .with_severity(Severity::ExtremelySevere);
        assert_eq!(request.care_warning(), Some(IMMEDIATE_CARE_WARNING));
        assert_eq!(ConsultationRequest::new("a", "b", "c").care_warning(), None);
    }

    #[test]
    fn validation_lists_every_blank_field() {
        let request = ConsultationRequest::new("cough", "  ", "");
        let err = request.validate().expect_err("blank fields must be rejected");
        assert_eq!(err.missing, vec!["duration", "additional info"]);
        assert_eq!(
            err.to_string(),
            "Please fill out all fields (missing: duration, additional info)."
        );
        assert!(ConsultationRequest::new("a", "b", "c").validate().is_ok());
    }
}
