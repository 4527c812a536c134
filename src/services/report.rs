use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Canonical biomarker status, classified from the model's free-form wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BiomarkerStatus {
    Normal,
    Low,
    High,
    Warning,
    Unknown,
}

/// Colour class used by the renderer for a status cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityColor {
    Normal,
    Warning,
    Danger,
}

/// Markers checked in priority order. Explicit low/high outrank the
/// generic warning markers.
const STATUS_MARKERS: &[(&str, BiomarkerStatus)] = &[
    ("low", BiomarkerStatus::Low),
    ("high", BiomarkerStatus::High),
    ("warning", BiomarkerStatus::Warning),
    ("slight", BiomarkerStatus::Warning),
    ("\u{26A0}", BiomarkerStatus::Warning), // ⚠
];

impl BiomarkerStatus {
    /// Classify free-form status text. First marker found wins; no marker
    /// means `Normal`, blank text means `Unknown`.
    pub fn classify(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return BiomarkerStatus::Unknown;
        }

        STATUS_MARKERS
            .iter()
            .find(|(marker, _)| lowered.contains(marker))
            .map(|(_, status)| *status)
            .unwrap_or(BiomarkerStatus::Normal)
    }

    pub fn severity(self) -> SeverityColor {
        match self {
            BiomarkerStatus::Low | BiomarkerStatus::High => SeverityColor::Danger,
            BiomarkerStatus::Warning => SeverityColor::Warning,
            BiomarkerStatus::Normal | BiomarkerStatus::Unknown => SeverityColor::Normal,
        }
    }

    /// Coarse marker position on the visual scale (0-100). Not interpolated
    /// against the reference range, which is free text.
    pub fn scale_percent(self) -> u8 {
        match self {
            BiomarkerStatus::Low => 20,
            BiomarkerStatus::High => 80,
            _ => 50,
        }
    }
}

/// One validated row of the biomarker table.
///
/// Severity and scale position are never stored; they are recomputed from
/// `status` whenever the entry is read or serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomarkerEntry {
    pub(crate) parameter: String,
    pub(crate) result: String,
    pub(crate) range: String,
    pub(crate) status: BiomarkerStatus,
    pub(crate) status_label: String,
    pub(crate) description: &'static str,
}

impl BiomarkerEntry {
    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn range(&self) -> &str {
        &self.range
    }

    pub fn status(&self) -> BiomarkerStatus {
        self.status
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn severity_color(&self) -> SeverityColor {
        self.status.severity()
    }

    pub fn scale_percent(&self) -> u8 {
        self.status.scale_percent()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BiomarkerRow<'a> {
    parameter: &'a str,
    result: &'a str,
    range: &'a str,
    status: BiomarkerStatus,
    status_label: &'a str,
    severity_color: SeverityColor,
    scale_percent: u8,
    description: &'a str,
}

impl Serialize for BiomarkerEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BiomarkerRow {
            parameter: &self.parameter,
            result: &self.result,
            range: &self.range,
            status: self.status,
            status_label: &self.status_label,
            severity_color: self.severity_color(),
            scale_percent: self.scale_percent(),
            description: self.description,
        }
        .serialize(serializer)
    }
}

/// Validated analysis of one report. Only the normalizer builds these, and
/// only after every required field passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub(crate) biomarkers: Vec<BiomarkerEntry>,
    pub(crate) summary_primary: String,
    pub(crate) summary_translated: String,
    pub(crate) actionable_steps: Vec<String>,
    pub(crate) nutrition_plan: Vec<String>,
    pub(crate) risk: Option<String>,
    pub(crate) generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn biomarkers(&self) -> &[BiomarkerEntry] {
        &self.biomarkers
    }

    pub fn summary_primary(&self) -> &str {
        &self.summary_primary
    }

    pub fn summary_translated(&self) -> &str {
        &self.summary_translated
    }

    pub fn actionable_steps(&self) -> &[String] {
        &self.actionable_steps
    }

    pub fn nutrition_plan(&self) -> &[String] {
        &self.nutrition_plan
    }

    pub fn risk(&self) -> Option<&str> {
        self.risk.as_deref()
    }

    pub fn has_risk_alert(&self) -> bool {
        self.risk.is_some()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Long US-English date shown in the report header, e.g. "October 19, 2026".
    pub fn report_date(&self) -> String {
        self.generated_at.format("%B %-d, %Y").to_string()
    }
}

/// Shape handed to the renderer. Keys match what the browser client reads.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    biomarkers: &'a [BiomarkerEntry],
    docs_note: &'a str,
    hindi_summary: &'a str,
    actionable_steps: &'a [String],
    nutrition_plan: &'a [String],
    risk: Option<&'a str>,
    has_risk_alert: bool,
    generated_at: DateTime<Utc>,
    report_date: String,
}

impl Serialize for AnalysisReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ReportView {
            biomarkers: &self.biomarkers,
            docs_note: &self.summary_primary,
            hindi_summary: &self.summary_translated,
            actionable_steps: &self.actionable_steps,
            nutrition_plan: &self.nutrition_plan,
            risk: self.risk.as_deref(),
            has_risk_alert: self.has_risk_alert(),
            generated_at: self.generated_at,
            report_date: self.report_date(),
        }
        .serialize(serializer)
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// "low" anywhere in the text wins over every other marker.
        #[test]
        fn low_marker_always_wins(prefix in any::<String>(), suffix in any::<String>()) {
            let status = format!("{prefix}LoW{suffix}");
            prop_assert_eq!(BiomarkerStatus::classify(&status), BiomarkerStatus::Low);
        }

        /// Non-blank text without any marker is read as normal.
        #[test]
        fn unmarked_text_is_normal(text in "[0-9a-fA-F .,/+-]{0,30}[0-9a-fA-F]") {
            prop_assert_eq!(BiomarkerStatus::classify(&text), BiomarkerStatus::Normal);
        }

        /// Severity and scale are a pure function of the classified status.
        #[test]
        fn derived_fields_follow_classification(text in any::<String>()) {
            let status = BiomarkerStatus::classify(&text);
            prop_assert_eq!(status, BiomarkerStatus::classify(&text));
            let danger = matches!(status, BiomarkerStatus::Low | BiomarkerStatus::High);
            prop_assert_eq!(status.severity() == SeverityColor::Danger, danger);
            prop_assert_eq!(status.scale_percent() != 50, danger);
        }
    }
}
