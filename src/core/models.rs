use serde::{Deserialize, Serialize};

const fn default_expire_time() -> u32 {
    3600
}

const fn default_experience() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub channel_name: Option<String>,
    #[serde(default)]
    pub uid: u32,
    #[serde(default = "default_expire_time")]
    pub expire_time: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    pub profession: Option<String>,
    #[serde(default = "default_experience")]
    pub experience: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizQuestion {
    /// A question is usable when its text is non-blank and its answer is one
    /// of its options.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && self.options.iter().any(|o| o == &self.answer)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_defaults() {
        let req: TokenRequest = serde_json::from_str(r#"{"channelName":"room1"}"#).unwrap();
        assert_eq!(req.channel_name.as_deref(), Some("room1"));
        assert_eq!(req.uid, 0);
        assert_eq!(req.expire_time, 3600);
    }

    #[test]
    fn test_quiz_request_defaults() {
        let req: QuizRequest = serde_json::from_str(r#"{"profession":"Nurse"}"#).unwrap();
        assert_eq!(req.experience, 1);
    }

    #[test]
    fn test_question_well_formed() {
        let mut q = QuizQuestion {
            question: "2 + 2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            answer: "4".to_string(),
        };
        assert!(q.is_well_formed());

        q.answer = "5".to_string();
        assert!(!q.is_well_formed());

        q.options.clear();
        assert!(!q.is_well_formed());

        q.options = vec!["4".to_string()];
        q.answer = "4".to_string();
        q.question = "   ".to_string();
        assert!(!q.is_well_formed());
    }
}
