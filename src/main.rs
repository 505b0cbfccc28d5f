mod config;
mod model;
mod quiz;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use quiz::{generator::QuizGenerator, Quiz, Topic, Verdict};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveTopic,
    Quiz {
        quiz: Quiz,
        question_number: usize,
        score: usize,
    },
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting relationship psychology quiz bot...");

    let config = Config::from_env()?;
    let generator = Arc::new(QuizGenerator::new(config.build_model()?));

    let bot = Bot::from_env();

    // Quiz sessions live only as long as the process.
    let storage: SessionStorage = InMemStorage::<State>::new().erase();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveTopic].endpoint(receive_topic))
            .branch(
                dptree::case![State::Quiz {
                    quiz,
                    question_number,
                    score
                }]
                .endpoint(answer_question),
            ),
    )
    .dependencies(dptree::deps![storage, generator])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;

    Ok(())
}

const GREETING_TEXT: &str =
    "🧠 남녀 심리 퀴즈\n재미있는 퀴즈로 연애 심리의 세계를 탐험해보세요!\n퀴즈 주제를 선택하세요:";
const CHOOSE_TOPIC_TEXT: &str = "퀴즈 주제를 선택하고 버튼을 눌러주세요!";
const PREPARING_TEXT: &str = "🧠 흥미진진한 퀴즈를 준비 중입니다...";
const CHOOSE_ANSWER_TEXT: &str = "보기 중에서 답을 골라주세요.";
const NEW_QUIZ: &str = "새 퀴즈 시작하기";

fn topic_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![Topic::ALL
        .iter()
        .map(|t| KeyboardButton::new(t.label()))
        .collect::<Vec<_>>()])
}

/// One row per answer, in the order fixed when the quiz was generated.
fn answer_keyboard(question: &quiz::Question) -> KeyboardMarkup {
    let mut rows: Vec<Vec<KeyboardButton>> = question
        .answers
        .iter()
        .map(|a| vec![KeyboardButton::new(a.text.clone())])
        .collect();
    rows.push(vec![KeyboardButton::new(NEW_QUIZ)]);
    KeyboardMarkup::new(rows)
}

fn verdict_text(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Correct => "🎉 정답입니다!".to_string(),
        Verdict::Incorrect { correct_answer } => {
            format!("💡 틀렸어요. 정답은 '{}'입니다.", correct_answer)
        }
    }
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(topic_keyboard())
        .await?;

    dialogue.update(State::ReceiveTopic).await?;
    Ok(())
}

async fn receive_topic(
    generator: Arc<QuizGenerator>,
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
) -> HandlerResult {
    let Some(topic) = msg.text().and_then(Topic::from_label) else {
        bot.send_message(msg.chat.id, CHOOSE_TOPIC_TEXT)
            .reply_markup(topic_keyboard())
            .await?;
        return Ok(());
    };

    // Only cosmetic, so a failure here is ignored.
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;
    bot.send_message(msg.chat.id, PREPARING_TEXT).await?;

    let quiz = match generator.generate(topic).await {
        Ok(quiz) => quiz,
        Err(err) => {
            log::error!("Quiz generation for chat {} failed: {}", msg.chat.id.0, err);
            bot.send_message(
                msg.chat.id,
                format!("퀴즈 생성 중 오류가 발생했습니다: {}", err),
            )
            .reply_markup(topic_keyboard())
            .await?;
            return Ok(());
        }
    };

    if quiz.questions.is_empty() {
        bot.send_message(msg.chat.id, "퀴즈 생성 중 오류가 발생했습니다: 질문이 없습니다")
            .reply_markup(topic_keyboard())
            .await?;
        return Ok(());
    }

    send_question(&bot, msg.chat.id, &quiz, 0).await?;
    dialogue
        .update(State::Quiz {
            quiz,
            question_number: 0,
            score: 0,
        })
        .await?;
    Ok(())
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    quiz: &Quiz,
    number: usize,
) -> HandlerResult {
    let question = &quiz.questions[number];
    bot.send_message(chat_id, format!("질문 {}: {}", number + 1, question.text))
        .reply_markup(answer_keyboard(question))
        .await?;
    Ok(())
}

async fn answer_question(
    bot: Bot,
    dialogue: QuizDialogue,
    (quiz, question_number, score): (Quiz, usize, usize),
    msg: Message,
) -> HandlerResult {
    let text = msg.text().unwrap_or_default();

    if text == NEW_QUIZ {
        bot.send_message(msg.chat.id, CHOOSE_TOPIC_TEXT)
            .reply_markup(topic_keyboard())
            .await?;
        dialogue.update(State::ReceiveTopic).await?;
        return Ok(());
    }

    let Some(question) = quiz.questions.get(question_number) else {
        log::warn!("Chat {} is past the last question, resetting", msg.chat.id.0);
        dialogue.update(State::ReceiveTopic).await?;
        return Ok(());
    };

    if question.find_answer(text).is_none() {
        bot.send_message(msg.chat.id, CHOOSE_ANSWER_TEXT)
            .reply_markup(answer_keyboard(question))
            .await?;
        return Ok(());
    }

    let mut current_score = score;
    match question.check(text) {
        Ok(verdict) => {
            if verdict == Verdict::Correct {
                current_score += 1;
            }
            bot.send_message(msg.chat.id, verdict_text(&verdict)).await?;
        }
        Err(err) => {
            log::error!("Cannot check answer for chat {}: {}", msg.chat.id.0, err);
            bot.send_message(msg.chat.id, format!("정답을 확인할 수 없습니다: {}", err))
                .await?;
        }
    }

    let next = question_number + 1;
    if next >= quiz.questions.len() {
        let summary = format!(
            "퀴즈가 끝났습니다! {}개 중 {}개를 맞혔어요.\n새 퀴즈의 주제를 선택하세요:",
            quiz.questions.len(),
            current_score
        );
        bot.send_message(msg.chat.id, summary)
            .reply_markup(topic_keyboard())
            .await?;

        dialogue.update(State::ReceiveTopic).await?;
        return Ok(());
    }

    send_question(&bot, msg.chat.id, &quiz, next).await?;
    dialogue
        .update(State::Quiz {
            quiz,
            question_number: next,
            score: current_score,
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Answer, Question};

    fn question() -> Question {
        Question::new(
            "Q1".to_string(),
            vec![
                Answer::new("C".to_string(), false),
                Answer::new("A".to_string(), false),
                Answer::new("B".to_string(), true),
                Answer::new("D".to_string(), false),
            ],
        )
    }

    fn button_texts(markup: &KeyboardMarkup) -> Vec<String> {
        markup
            .keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    #[test]
    fn answer_keyboard_keeps_quiz_order_on_every_render() {
        let question = question();

        let first = button_texts(&answer_keyboard(&question));
        let second = button_texts(&answer_keyboard(&question));

        assert_eq!(first, vec!["C", "A", "B", "D", NEW_QUIZ]);
        assert_eq!(first, second);
    }

    #[test]
    fn topic_keyboard_lists_every_topic() {
        assert_eq!(
            button_texts(&topic_keyboard()),
            vec!["여성의 심리", "남성의 심리"]
        );
    }

    #[test]
    fn verdict_messages() {
        let question = question();
        assert_eq!(
            verdict_text(&question.check("B").unwrap()),
            "🎉 정답입니다!"
        );
        assert_eq!(
            verdict_text(&question.check("A").unwrap()),
            "💡 틀렸어요. 정답은 'B'입니다."
        );
    }
}
