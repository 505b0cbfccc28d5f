use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::model::TextModel;
use crate::quiz::drafter::{ANSWER_COUNT, CORRECT_MARKER, QUESTION_COUNT};
use crate::quiz::{Answer, Question, Quiz, QuizError, RawQuestionText, Topic};

const CODE_FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

/// Wire shape the formatting prompt asks the model to emit.
#[derive(Debug, Deserialize)]
struct FormattedQuiz {
    questions: Vec<FormattedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormattedQuestion {
    pub question: String,
    pub answers: Vec<FormattedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormattedAnswer {
    pub answer: String,
    pub correct: bool,
}

pub fn format_prompt(raw: &RawQuestionText) -> String {
    format!(
        r#"다음 질문들을 JSON 형식으로 포맷팅해주세요. {CORRECT_MARKER}가 표시된 답변이 정답입니다.
        질문들: {raw}
        다음과 같은 JSON 형식으로 출력해주세요:
        ```json
        {{
            "questions": [
                {{
                    "question": "질문 내용",
                    "answers": [
                        {{ "answer": "답변1", "correct": false }},
                        {{ "answer": "답변2", "correct": true }},
                        {{ "answer": "답변3", "correct": false }},
                        {{ "answer": "답변4", "correct": false }}
                    ]
                }},
                ...
            ]
        }}
        ```"#,
        raw = raw.as_str()
    )
}

/// Removes the Markdown code block the model tends to wrap JSON in.
/// Anything outside a leading/trailing fence is left alone.
pub fn strip_code_fence(reply: &str) -> &str {
    let mut text = reply.trim();

    if let Some(rest) = text.strip_prefix(CODE_FENCE) {
        text = rest.strip_prefix(LANGUAGE_TAG).unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix(CODE_FENCE) {
        text = rest;
    }

    text.trim()
}

pub fn decode(text: &str) -> Result<Vec<FormattedQuestion>, QuizError> {
    let quiz: FormattedQuiz = serde_json::from_str(strip_code_fence(text))?;
    Ok(quiz.questions)
}

/// Validates every decoded question and shuffles its answers exactly once.
pub fn assemble<R: Rng + ?Sized>(
    topic: Topic,
    decoded: Vec<FormattedQuestion>,
    rng: &mut R,
) -> Result<Quiz, QuizError> {
    if decoded.len() != QUESTION_COUNT {
        log::warn!(
            "Expected {} questions, model produced {}",
            QUESTION_COUNT,
            decoded.len()
        );
    }

    let mut questions = Vec::with_capacity(decoded.len());
    for formatted in decoded {
        if formatted.answers.len() != ANSWER_COUNT {
            log::warn!(
                "Question {:?} has {} answers instead of {}",
                formatted.question,
                formatted.answers.len(),
                ANSWER_COUNT
            );
        }

        // Answers are matched against trimmed chat input, so store them trimmed too.
        let text = formatted.question.trim().to_string();
        let mut answers: Vec<Answer> = formatted
            .answers
            .into_iter()
            .map(|a| Answer::new(a.answer.trim().to_string(), a.correct))
            .collect();
        if answers.iter().any(|a| a.text.is_empty()) {
            return Err(QuizError::EmptyAnswer { question: text });
        }
        answers.shuffle(rng);

        let question = Question::new(text, answers);
        question.correct_answer()?;
        questions.push(question);
    }

    Ok(Quiz { topic, questions })
}

fn build_quiz(topic: Topic, reply: &str) -> Result<Quiz, QuizError> {
    let decoded = decode(reply)?;
    assemble(topic, decoded, &mut rand::thread_rng())
}

/// Asks the model to restate `raw` as JSON and turns the reply into a [`Quiz`].
pub async fn format(
    model: &dyn TextModel,
    topic: Topic,
    raw: &RawQuestionText,
) -> Result<Quiz, QuizError> {
    log::info!("Formatting drafted questions about {:?}", topic);

    let reply = model.complete(&format_prompt(raw)).await?;
    log::debug!("Formatted reply: {:?}", reply);

    build_quiz(topic, &reply)
}
