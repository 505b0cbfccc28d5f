pub mod drafter;
pub mod formatter;
pub mod generator;

use crate::model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("model reply is not valid quiz JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no correct answer found for question \"{question}\"")]
    NoCorrectAnswer { question: String },

    #[error("{count} answers are marked correct for question \"{question}\"")]
    MultipleCorrectAnswers { question: String, count: usize },

    #[error("question \"{question}\" has an empty answer")]
    EmptyAnswer { question: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Topic {
    FemalePsychology,
    MalePsychology,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::FemalePsychology, Topic::MalePsychology];

    pub fn label(&self) -> &'static str {
        match self {
            Topic::FemalePsychology => "여성의 심리",
            Topic::MalePsychology => "남성의 심리",
        }
    }

    pub fn from_label(label: &str) -> Option<Topic> {
        let label = label.trim();
        Topic::ALL.into_iter().find(|t| t.label() == label)
    }
}

/// Unstructured drafter output. Nothing about its shape is guaranteed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQuestionText(String);

impl RawQuestionText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Quiz {
    pub topic: Topic,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub text: String,
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn new(text: String, answers: Vec<Answer>) -> Self {
        Self { text, answers }
    }

    /// The single answer flagged correct. Zero or several flagged answers is an error.
    pub fn correct_answer(&self) -> Result<&Answer, QuizError> {
        let mut correct = self.answers.iter().filter(|a| a.is_correct);
        let first = correct.next().ok_or_else(|| QuizError::NoCorrectAnswer {
            question: self.text.clone(),
        })?;

        let extra = correct.count();
        if extra > 0 {
            return Err(QuizError::MultipleCorrectAnswers {
                question: self.text.clone(),
                count: extra + 1,
            });
        }
        Ok(first)
    }

    pub fn find_answer(&self, text: &str) -> Option<&Answer> {
        let text = text.trim();
        self.answers.iter().find(|a| a.text == text)
    }

    pub fn check(&self, chosen: &str) -> Result<Verdict, QuizError> {
        let correct = self.correct_answer()?;
        if correct.text == chosen.trim() {
            Ok(Verdict::Correct)
        } else {
            Ok(Verdict::Incorrect {
                correct_answer: correct.text.clone(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
}
impl Answer {
    pub fn new(text: String, is_correct: bool) -> Self {
        Self { text, is_correct }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { correct_answer: String },
}
