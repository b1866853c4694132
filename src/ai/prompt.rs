use serde_json::{Value, json};

/// Number of questions asked of the model per request.
pub const QUESTIONS_REQUESTED: usize = 10;

/// Seconds a user has to answer each question.
pub const ANSWER_WINDOW_SECS: u32 = 5;

/// Max length of the profession after sanitising
pub const MAX_PROFESSION_LEN: usize = 120;

/// Strip control characters and hard-truncate a user-supplied profession.
#[must_use]
pub fn sanitize_profession(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .take(MAX_PROFESSION_LEN)
        .collect::<String>()
        .trim()
        .to_string()
}

#[must_use]
pub fn build_quiz_prompt(profession: &str, experience: u32) -> String {
    let profession = sanitize_profession(profession);
    format!(
        "You are helping onboard users to Beam, a professional networking app where users \
        beam their details (name, experience, expertise) and connect with nearby professionals.\n\n\
        As part of verification we need to confirm that people truly work in their stated field \
        and have the stated level of experience.\n\n\
        Given the profile below, generate a list of {QUESTIONS_REQUESTED} multiple choice questions \
        with answers suited to that level. Each question must be easily answerable by someone at \
        that skill level, because they will only have {ANSWER_WINDOW_SECS} seconds to pick an answer. \
        The answer must be exactly one of the options.\n\n\
        Profile\n\
        Field: {profession}\n\
        Years of Experience: {experience}"
    )
}

/// Response schema constraining the model to an array of quiz questions.
#[must_use]
pub fn quiz_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "required": ["question", "options", "answer"],
            "properties": {
                "question": { "type": "STRING" },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "answer": { "type": "STRING" }
            }
        }
    })
}
