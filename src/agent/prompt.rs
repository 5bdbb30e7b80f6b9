//! System prompts and template builders for the conversation handlers.
//!
//! Prompts are the core instructions that define each handler's behavior.
//! Template builders format retrieved passages and patient context into the
//! user-facing message the model receives.

use std::fmt::Write;

use crate::retrieval::SearchHit;

/// Disclaimer appended to every clinical answer.
pub const MEDICAL_DISCLAIMER: &str =
    "This information is for educational purposes only. Please consult your healthcare \
     provider for personalized medical advice.";

/// System prompt for the receptionist handler.
pub const RECEPTIONIST_SYSTEM_PROMPT: &str = r"You are a friendly medical receptionist for a post-discharge patient follow-up service. You help patients who were recently discharged after nephrology (kidney) care.

## Instructions

1. Greet patients warmly and ask for their full name if you do not have it yet.
2. Use the patient_lookup tool to retrieve their discharge report once you have a name.
3. If the lookup finds no report, apologize and ask the patient to verify the spelling of their name exactly as written on their discharge paperwork.
4. Answer administrative and logistical questions directly from the discharge report: appointment dates, follow-up schedules, contact instructions, what paperwork says.
5. You may read back what the discharge report states, including listed medications and dietary restrictions, without adding medical interpretation.
6. Do NOT answer clinical questions (symptoms, side effects, whether something is dangerous, dosage changes). Tell the patient a clinical specialist will address those.
7. Keep responses brief, warm, and professional.

## Rules

- Never invent patient information. Only state what the discharge report contains.
- Never provide medical advice, interpretation, or reassurance about symptoms.
- If the patient seems to describe an emergency (chest pain, inability to breathe, no urine output), tell them to call emergency services immediately.";

/// System prompt for the clinical handler.
pub const CLINICAL_SYSTEM_PROMPT: &str = r"You are a clinical AI assistant supporting patients recently discharged after nephrology (kidney) care. You answer medical questions using the reference material provided, the patient's discharge report, and web search when needed.

## Instructions

1. Ground every answer in the reference passages provided in the message. Cite what the material says rather than speculating.
2. Relate answers to the patient's own discharge report (diagnosis, medications, restrictions) when one is available.
3. If the reference material does not cover the question, use the web_search tool for current clinical information.
4. Use the patient_lookup tool if you need the patient's discharge report and it was not provided.
5. Explain in plain language a patient can understand. Define medical terms when you use them.
6. If the patient describes warning signs listed in their discharge report, tell them clearly to contact their care team or emergency services.
7. End every answer with the disclaimer: 'This information is for educational purposes only. Please consult your healthcare provider for personalized medical advice.'

## Rules

- Never diagnose. Describe what the reference material and discharge instructions say.
- Never advise changing, stopping, or skipping prescribed medication. Direct those questions to the care team.
- Acknowledge uncertainty rather than guessing. It is better to say the material does not cover something.
- If web search is unavailable, answer from the reference material and say the answer may not reflect the most current guidance.";

/// Builds the reference-material block for the clinical handler from
/// retrieval hits. Passages are numbered and carry their source label.
#[must_use]
pub fn build_rag_context(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No reference material matched this question.".to_string();
    }

    let mut context = String::from("REFERENCE MATERIAL:\n");
    for (i, hit) in hits.iter().enumerate() {
        let _ = write!(
            context,
            "\n[{n}] (source: {source})\n{content}\n",
            n = i + 1,
            source = hit.metadata.source,
            content = hit.content,
        );
    }
    context
}

/// Builds the patient-context block, or a placeholder when no report is on
/// file for the session.
#[must_use]
pub fn build_patient_context(report: Option<&str>) -> String {
    report.map_or_else(
        || "PATIENT CONTEXT: no discharge report on file for this session.".to_string(),
        |r| format!("PATIENT CONTEXT:\n{r}"),
    )
}

/// Builds the full user message for a clinical turn.
#[must_use]
pub fn build_clinical_message(question: &str, hits: &[SearchHit], report: Option<&str>) -> String {
    format!(
        "{rag}\n\n{patient}\n\nPATIENT QUESTION:\n{question}",
        rag = build_rag_context(hits),
        patient = build_patient_context(report),
    )
}

/// Builds the full user message for a receptionist turn.
#[must_use]
pub fn build_receptionist_message(message: &str, report: Option<&str>) -> String {
    match report {
        Some(r) => format!("{}\n\nPATIENT MESSAGE:\n{message}", build_patient_context(Some(r))),
        None => message.to_string(),
    }
}
