//! Flat patient discharge-record lookup.
//!
//! Records load from a JSON file when one is provided, otherwise from a
//! compiled-in sample roster. Lookup follows a fixed three-tier precedence:
//! exact full-name equality, then substring containment, then last-token
//! equality — all case-insensitive, first hit wins. The precedence is part
//! of the contract and covered by tests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;

/// A read-only snapshot of a patient's discharge report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Patient full name.
    pub patient_name: String,
    /// Discharge date (ISO-8601 date string).
    pub discharge_date: String,
    /// Primary discharge diagnosis.
    pub primary_diagnosis: String,
    /// Prescribed medications, in prescription order.
    pub medications: Vec<String>,
    /// Dietary restrictions.
    pub dietary_restrictions: String,
    /// Follow-up appointment instructions.
    pub follow_up: String,
    /// Warning signs that require medical attention.
    pub warning_signs: String,
    /// General discharge instructions.
    pub discharge_instructions: String,
}

/// In-memory directory of discharge records.
#[derive(Debug, Clone)]
pub struct PatientDirectory {
    records: Vec<PatientRecord>,
}

impl PatientDirectory {
    /// Loads records from a JSON file (an array of records).
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatientDirectory`] when the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let data = std::fs::read_to_string(path).map_err(|e| Error::PatientDirectory {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let records: Vec<PatientRecord> =
            serde_json::from_str(&data).map_err(|e| Error::PatientDirectory {
                message: format!("invalid patient JSON in {}: {e}", path.display()),
            })?;
        info!(count = records.len(), path = %path.display(), "loaded patient records");
        Ok(Self { records })
    }

    /// Creates a directory from records already in memory.
    #[must_use]
    pub const fn with_records(records: Vec<PatientRecord>) -> Self {
        Self { records }
    }

    /// Compiled-in sample roster, used when no records file is configured.
    #[must_use]
    pub fn sample() -> Self {
        Self::with_records(sample_records())
    }

    /// Looks up a record by name.
    ///
    /// Precedence, evaluated in order with first hit winning:
    /// 1. exact case-insensitive full-name equality,
    /// 2. stored name containing `query` as a substring,
    /// 3. stored name whose last whitespace-delimited token equals `query`.
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&PatientRecord> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(exact) = self
            .records
            .iter()
            .find(|r| r.patient_name.to_lowercase() == needle)
        {
            return Some(exact);
        }

        if let Some(substring) = self
            .records
            .iter()
            .find(|r| r.patient_name.to_lowercase().contains(&needle))
        {
            return Some(substring);
        }

        self.records.iter().find(|r| {
            r.patient_name
                .split_whitespace()
                .next_back()
                .is_some_and(|last| last.to_lowercase() == needle)
        })
    }

    /// Number of records in the directory.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the directory holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Formats a record as the report text handed to the reasoning model.
#[must_use]
pub fn format_report(record: &PatientRecord) -> String {
    let medications = record
        .medications
        .iter()
        .map(|m| format!("  - {m}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "PATIENT DISCHARGE REPORT FOUND:\n\n\
         Patient Name: {}\n\
         Discharge Date: {}\n\n\
         PRIMARY DIAGNOSIS:\n{}\n\n\
         MEDICATIONS:\n{medications}\n\n\
         DIETARY RESTRICTIONS:\n{}\n\n\
         FOLLOW-UP APPOINTMENTS:\n{}\n\n\
         WARNING SIGNS TO WATCH FOR:\n{}\n\n\
         DISCHARGE INSTRUCTIONS:\n{}",
        record.patient_name,
        record.discharge_date,
        record.primary_diagnosis,
        record.dietary_restrictions,
        record.follow_up,
        record.warning_signs,
        record.discharge_instructions,
    )
}

fn sample_records() -> Vec<PatientRecord> {
    vec![
        PatientRecord {
            patient_name: "John Smith".to_string(),
            discharge_date: "2025-06-14".to_string(),
            primary_diagnosis: "Chronic Kidney Disease Stage 3b".to_string(),
            medications: vec![
                "Lisinopril 10mg once daily".to_string(),
                "Furosemide 40mg once daily".to_string(),
                "Sodium bicarbonate 650mg twice daily".to_string(),
            ],
            dietary_restrictions: "Low sodium (<2g/day), moderate protein, limit potassium-rich foods"
                .to_string(),
            follow_up: "Nephrology clinic in 2 weeks; repeat labs (creatinine, potassium) in 1 week"
                .to_string(),
            warning_signs: "Swelling in legs or face, shortness of breath, urine output dropping, \
                            weight gain over 2kg in 3 days"
                .to_string(),
            discharge_instructions: "Weigh yourself daily, take medications with food, avoid NSAIDs \
                                     such as ibuprofen"
                .to_string(),
        },
        PatientRecord {
            patient_name: "John Doe".to_string(),
            discharge_date: "2025-06-20".to_string(),
            primary_diagnosis: "Acute Kidney Injury, resolving".to_string(),
            medications: vec!["Amlodipine 5mg once daily".to_string()],
            dietary_restrictions: "Maintain hydration; avoid high-salt processed foods".to_string(),
            follow_up: "Primary care in 1 week for repeat creatinine".to_string(),
            warning_signs: "Reduced urination, confusion, nausea that does not settle".to_string(),
            discharge_instructions: "Stop NSAIDs permanently; resume normal activity gradually"
                .to_string(),
        },
        PatientRecord {
            patient_name: "Mary Johnson".to_string(),
            discharge_date: "2025-05-30".to_string(),
            primary_diagnosis: "Diabetic nephropathy with microalbuminuria".to_string(),
            medications: vec![
                "Empagliflozin 10mg once daily".to_string(),
                "Losartan 50mg once daily".to_string(),
                "Metformin 500mg twice daily".to_string(),
            ],
            dietary_restrictions: "Diabetic diet, sodium <2g/day".to_string(),
            follow_up: "Endocrinology and nephrology joint review in 4 weeks".to_string(),
            warning_signs: "Foamy urine increasing, blood sugar persistently above 15 mmol/L, \
                            ankle swelling"
                .to_string(),
            discharge_instructions: "Check blood glucose twice daily; keep a log for the clinic"
                .to_string(),
        },
        PatientRecord {
            patient_name: "Priya Patel".to_string(),
            discharge_date: "2025-07-02".to_string(),
            primary_diagnosis: "IgA nephropathy".to_string(),
            medications: vec![
                "Ramipril 5mg once daily".to_string(),
                "Fish oil 1g twice daily".to_string(),
            ],
            dietary_restrictions: "Low sodium; normal protein intake".to_string(),
            follow_up: "Nephrology clinic in 6 weeks with urine protein/creatinine ratio".to_string(),
            warning_signs: "Visible blood in urine, severe flank pain, fever".to_string(),
            discharge_instructions: "Report any upper respiratory infection to the clinic".to_string(),
        },
        PatientRecord {
            patient_name: "Robert Chen".to_string(),
            discharge_date: "2025-06-28".to_string(),
            primary_diagnosis: "Kidney transplant recipient, post-operative day 12".to_string(),
            medications: vec![
                "Tacrolimus 2mg twice daily".to_string(),
                "Mycophenolate 500mg twice daily".to_string(),
                "Prednisone 10mg once daily".to_string(),
            ],
            dietary_restrictions: "Avoid grapefruit; food-safety precautions while immunosuppressed"
                .to_string(),
            follow_up: "Transplant clinic twice weekly for tacrolimus levels".to_string(),
            warning_signs: "Fever above 38C, tenderness over the graft, sudden drop in urine output"
                .to_string(),
            discharge_instructions: "Take tacrolimus at the same times daily; avoid crowds for the \
                                     first month"
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use test_case::test_case;

    #[test]
    fn test_sample_roster_nonempty() {
        let dir = PatientDirectory::sample();
        assert!(dir.len() >= 5);
        assert!(!dir.is_empty());
    }

    #[test_case("John Smith", "John Smith"; "exact full name")]
    #[test_case("john smith", "John Smith"; "exact case insensitive")]
    #[test_case("Smith", "John Smith"; "substring and last token")]
    #[test_case("Patel", "Priya Patel"; "last name only")]
    #[test_case("mary", "Mary Johnson"; "substring first name")]
    fn test_find_matches(query: &str, expected: &str) {
        let dir = PatientDirectory::sample();
        let record = dir.find(query);
        assert_eq!(record.map(|r| r.patient_name.as_str()), Some(expected));
    }

    #[test]
    fn test_exact_beats_substring_with_overlapping_candidates() {
        // "John" matches both records by substring, but the exact-equality
        // tier must win for the full name.
        let dir = PatientDirectory::sample();
        let record = dir.find("John Smith");
        assert_eq!(record.map(|r| r.patient_name.as_str()), Some("John Smith"));
        let record = dir.find("John Doe");
        assert_eq!(record.map(|r| r.patient_name.as_str()), Some("John Doe"));
    }

    #[test]
    fn test_last_token_rule_without_substring_match() {
        // A record whose stored name is "Anna-Lena Berg" is only reachable
        // for query "berg" via substring; construct a case where only the
        // last-token tier applies: query equals last token but is not a
        // substring match of any earlier record.
        let dir = PatientDirectory::with_records(vec![PatientRecord {
            patient_name: "Ana Berg".to_string(),
            discharge_date: "2025-01-01".to_string(),
            primary_diagnosis: "CKD".to_string(),
            medications: vec![],
            dietary_restrictions: String::new(),
            follow_up: String::new(),
            warning_signs: String::new(),
            discharge_instructions: String::new(),
        }]);
        assert!(dir.find("Berg").is_some());
    }

    #[test]
    fn test_unknown_patient_none() {
        let dir = PatientDirectory::sample();
        assert!(dir.find("Zzyx Qqplx").is_none());
        assert!(dir.find("").is_none());
        assert!(dir.find("   ").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = PatientDirectory::sample();
        let json = serde_json::to_string(&dir.records).unwrap_or_default();
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        file.write_all(json.as_bytes()).unwrap_or_else(|_| unreachable!());

        let loaded = PatientDirectory::load(file.path()).unwrap_or_else(|_| unreachable!());
        assert_eq!(loaded.len(), dir.len());
        assert!(loaded.find("John Smith").is_some());
    }

    #[test]
    fn test_load_invalid_json_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        file.write_all(b"not json").unwrap_or_else(|_| unreachable!());
        assert!(PatientDirectory::load(file.path()).is_err());
    }

    #[test]
    fn test_format_report_contains_fields() {
        let dir = PatientDirectory::sample();
        let record = dir.find("John Smith").unwrap_or_else(|| unreachable!());
        let report = format_report(record);
        assert!(report.contains("John Smith"));
        assert!(report.contains("Chronic Kidney Disease"));
        assert!(report.contains("Lisinopril"));
        assert!(report.contains("WARNING SIGNS"));
    }
}
