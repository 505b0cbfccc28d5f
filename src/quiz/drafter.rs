use crate::model::TextModel;
use crate::quiz::{QuizError, RawQuestionText, Topic};

/// Literal suffix the model is asked to append to the correct option.
pub const CORRECT_MARKER: &str = "(o)";

pub const QUESTION_COUNT: usize = 5;
pub const ANSWER_COUNT: usize = 4;

pub fn draft_prompt(topic: Topic) -> String {
    let topic = topic.label();
    format!(
        "당신은 남녀 연애 심리학 전문가입니다. {topic}와 연애에 대한 {QUESTION_COUNT}개의 흥미로운 질문을 만들어주세요.
        각 질문은 {ANSWER_COUNT}개의 답변을 가져야 하며, 그 중 1개만 맞아야 합니다.
        정답에는 {CORRECT_MARKER}로 표시하세요.
        답변의 순서는 무작위로 해주세요.
        예시:
        질문: 여성들이 스트레스를 받을 때 가장 흔히 보이는 행동은?
        답변: 잠자기|과식하기{CORRECT_MARKER}|운동하기|쇼핑하기
        이제 당신 차례입니다! {topic}에 대한 {QUESTION_COUNT}개의 질문을 만들어주세요."
    )
}

/// Asks the model for five marked-up questions on `topic`.
pub async fn draft(model: &dyn TextModel, topic: Topic) -> Result<RawQuestionText, QuizError> {
    log::info!("Drafting questions about {:?}", topic);

    let content = model.complete(&draft_prompt(topic)).await?;
    log::debug!("Draft: {:?}", content);

    Ok(RawQuestionText::new(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::scripted::ScriptedModel;
    use crate::model::ModelError;

    #[test]
    fn prompt_carries_topic_and_marker() {
        for topic in Topic::ALL {
            let prompt = draft_prompt(topic);
            assert!(prompt.contains(topic.label()));
            assert!(prompt.contains("과식하기(o)"));
            assert!(prompt.contains("5개의"));
            assert!(prompt.contains("4개의"));
        }
    }

    #[tokio::test]
    async fn draft_sends_one_prompt_and_returns_reply_verbatim() {
        let model = ScriptedModel::new(vec![Ok("질문: ...\n답변: a|b(o)|c|d".to_string())]);

        let raw = draft(&model, Topic::MalePsychology).await.unwrap();

        assert_eq!(raw.as_str(), "질문: ...\n답변: a|b(o)|c|d");
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("남성의 심리"));
    }

    #[tokio::test]
    async fn transport_failure_is_not_retried() {
        let model = ScriptedModel::new(vec![
            Err(ModelError::Network("connection reset".to_string())),
            Ok("unused".to_string()),
        ]);

        let err = draft(&model, Topic::FemalePsychology).await.unwrap_err();

        assert!(matches!(err, QuizError::Model(ModelError::Network(_))));
        assert_eq!(model.prompts().len(), 1);
    }
}
