use crate::model::TextModel;
use crate::quiz::{drafter, formatter, Quiz, QuizError, Topic};

/// Runs the two model round trips that turn a topic into a playable quiz.
pub struct QuizGenerator {
    model: Box<dyn TextModel>,
}

impl QuizGenerator {
    pub fn new(model: Box<dyn TextModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, topic: Topic) -> Result<Quiz, QuizError> {
        let raw = drafter::draft(&*self.model, topic).await?;
        let quiz = formatter::format(&*self.model, topic, &raw).await?;

        log::info!(
            "Generated {} questions about {:?}",
            quiz.questions.len(),
            topic
        );
        Ok(quiz)
    }
}
