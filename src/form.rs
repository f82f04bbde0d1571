//! Interactive entry of the consultation form on a terminal.
//!
//! Only the fields left blank on the command line are asked for. Reaching the
//! end of input leaves the remaining fields blank, so the usual validation
//! still decides whether the consultation can be submitted.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::consultation::Severity;

/// Form values as typed, before the image is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
    pub symptoms: String,
    pub severity: Option<Severity>,
    pub duration: String,
    pub additional_info: String,
    pub image_path: Option<PathBuf>,
}

pub struct Form<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Form<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks for every blank field of `draft`, in form order.
    pub fn fill(&mut self, mut draft: FormDraft) -> io::Result<FormDraft> {
        if draft.symptoms.trim().is_empty() {
            draft.symptoms = self.ask("Symptoms: ")?.unwrap_or_default();
        }
        if draft.severity.is_none() {
            draft.severity = self.ask_severity()?;
        }
        if let Some(warning) = draft.severity.and_then(Severity::care_warning) {
            writeln!(self.output, "{warning}")?;
        }
        if draft.duration.trim().is_empty() {
            draft.duration = self.ask("Duration: ")?.unwrap_or_default();
        }
        if draft.additional_info.trim().is_empty() {
            draft.additional_info = self.ask("Additional information: ")?.unwrap_or_default();
        }
        if draft.image_path.is_none() {
            draft.image_path = self
                .ask("Image path (optional, blank to skip): ")?
                .filter(|path| !path.is_empty())
                .map(PathBuf::from);
        }
        Ok(draft)
    }

    fn ask_severity(&mut self) -> io::Result<Option<Severity>> {
        writeln!(self.output, "How severe are your symptoms?")?;
        for severity in Severity::ALL {
            writeln!(self.output, "  {severity}")?;
        }
        loop {
            let Some(answer) = self.ask("Severity (1-8, blank to skip): ")? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<Severity>() {
                Ok(severity) => return Ok(Some(severity)),
                Err(message) => writeln!(self.output, "{message}")?,
            }
        }
    }

    /// Prints `label` and reads one trimmed line; `None` at end of input.
    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::IMMEDIATE_CARE_WARNING;
    use std::io::Cursor;

    fn fill(input: &str, draft: FormDraft) -> (FormDraft, String) {
        let mut output = Vec::new();
        let filled = Form::new(Cursor::new(input.as_bytes()), &mut output)
            .fill(draft)
            .unwrap();
        (filled, String::from_utf8(output).unwrap())
    }

    #[test]
    fn asks_every_field_in_order() {
        let (draft, transcript) = fill(
            "headache\n4\n3 days\nno meds\nrash.png\n",
            FormDraft::default(),
        );

        assert_eq!(draft.symptoms, "headache");
        assert_eq!(draft.severity, Some(Severity::Moderate));
        assert_eq!(draft.duration, "3 days");
        assert_eq!(draft.additional_info, "no meds");
        assert_eq!(draft.image_path, Some(PathBuf::from("rash.png")));
        assert!(transcript.contains("8. Extremely Severe"));
        assert!(!transcript.contains(IMMEDIATE_CARE_WARNING));
    }

    #[test]
    fn prefilled_fields_are_not_asked_again() {
        let draft = FormDraft {
            symptoms: "cough".to_string(),
            severity: Some(Severity::Mild),
            duration: "1 week".to_string(),
            ..FormDraft::default()
        };
        let (draft, transcript) = fill("smoker\n\n", draft);

        assert_eq!(draft.symptoms, "cough");
        assert_eq!(draft.additional_info, "smoker");
        assert_eq!(draft.image_path, None);
        assert!(!transcript.contains("Symptoms:"));
        assert!(!transcript.contains("How severe"));
    }

    #[test]
    fn invalid_severity_is_asked_again_and_warning_shown() {
        let (draft, transcript) = fill(
            "chest pain\n11\nextremely severe\n1 hour\nnone\n\n",
            FormDraft::default(),
        );

        assert_eq!(draft.severity, Some(Severity::ExtremelySevere));
        assert!(transcript.contains("between 1 and 8"));
        assert!(transcript.contains(IMMEDIATE_CARE_WARNING));
    }

    #[test]
    fn end_of_input_leaves_fields_blank() {
        let (draft, _) = fill("fever\n", FormDraft::default());

        assert_eq!(draft.symptoms, "fever");
        assert_eq!(draft.severity, None);
        assert!(draft.duration.is_empty());
        assert!(draft.additional_info.is_empty());
    }
}
