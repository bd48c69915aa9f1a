//! Application-level configuration loading, including the seeded question bank.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dao::models::QuestionEntity;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_DUEL_CONFIG_PATH";
/// Questions assigned to each game when the configuration does not say otherwise.
const DEFAULT_QUESTIONS_PER_GAME: usize = 6;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    questions_per_game: usize,
    question_bank: Vec<QuestionEntity>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to a baked-in default bank.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        questions_per_game = app_config.questions_per_game,
                        bank_size = app_config.question_bank.len(),
                        "loaded question bank from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration from explicit values, bypassing the config file.
    pub fn new(questions_per_game: usize, question_bank: Vec<QuestionEntity>) -> Self {
        Self {
            questions_per_game,
            question_bank,
        }
    }

    /// Number of questions assigned to every game.
    pub fn questions_per_game(&self) -> usize {
        self.questions_per_game
    }

    /// Question seeds to upsert into storage at startup.
    pub fn question_bank(&self) -> &[QuestionEntity] {
        &self.question_bank
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_per_game: DEFAULT_QUESTIONS_PER_GAME,
            question_bank: default_question_bank(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    questions_per_game: Option<usize>,
    question_bank: Vec<RawQuestion>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let question_bank = value.question_bank.into_iter().map(Into::into).collect();
        Self {
            questions_per_game: value
                .questions_per_game
                .unwrap_or(DEFAULT_QUESTIONS_PER_GAME),
            question_bank,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single question seed inside the configuration file.
///
/// The id is part of the file so repeated startups upsert the same rows
/// instead of growing the bank.
struct RawQuestion {
    id: Uuid,
    body: String,
    accepted_answers: Vec<String>,
    #[serde(default = "default_published")]
    published: bool,
}

fn default_published() -> bool {
    true
}

impl From<RawQuestion> for QuestionEntity {
    fn from(value: RawQuestion) -> Self {
        Self {
            id: value.id,
            body: value.body,
            accepted_answers: value.accepted_answers,
            published: value.published,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn seed(n: u128, body: &str, answers: &[&str]) -> QuestionEntity {
    QuestionEntity {
        id: Uuid::from_u128(n),
        body: body.to_owned(),
        accepted_answers: answers.iter().map(|a| (*a).to_owned()).collect(),
        published: true,
    }
}

/// Built-in question bank shipped with the binary.
fn default_question_bank() -> Vec<QuestionEntity> {
    vec![
        seed(
            0x8e3f_0001,
            "What is the capital of France?",
            &["Paris"],
        ),
        seed(
            0x8e3f_0002,
            "How many continents are there on Earth?",
            &["7", "seven"],
        ),
        seed(
            0x8e3f_0003,
            "What is the chemical symbol for gold?",
            &["Au"],
        ),
        seed(
            0x8e3f_0004,
            "Which planet is known as the Red Planet?",
            &["Mars"],
        ),
        seed(
            0x8e3f_0005,
            "What is the largest ocean on Earth?",
            &["Pacific", "Pacific Ocean", "the Pacific Ocean"],
        ),
        seed(
            0x8e3f_0006,
            "In which year did the Second World War end?",
            &["1945"],
        ),
        seed(
            0x8e3f_0007,
            "What is the square root of 144?",
            &["12", "twelve"],
        ),
        seed(
            0x8e3f_0008,
            "Which language has the most native speakers?",
            &["Mandarin", "Mandarin Chinese", "Chinese"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_defaults_questions_per_game() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "question_bank": [
                    {
                        "id": "3f2b0d5e-0000-0000-0000-000000000001",
                        "body": "2+2?",
                        "accepted_answers": ["4"]
                    }
                ]
            }"#,
        )
        .unwrap();

        let config: AppConfig = raw.into();
        assert_eq!(config.questions_per_game(), DEFAULT_QUESTIONS_PER_GAME);
        assert_eq!(config.question_bank().len(), 1);
        assert!(config.question_bank()[0].published);
    }

    #[test]
    fn default_bank_is_published_and_unique() {
        let bank = default_question_bank();
        assert!(bank.len() >= DEFAULT_QUESTIONS_PER_GAME);
        assert!(bank.iter().all(|q| q.published));

        let mut ids = bank.iter().map(|q| q.id).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), bank.len());
    }
}
