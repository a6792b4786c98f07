use bridge_core::model::card::{Card, ParseCardError};
use bridge_core::model::moves::{Move, MoveError};
use bridge_core::model::suit::Suit;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One table action read from a move script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(Move),
    Pass,
    NextRound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("line {line}: unknown command '{word}'")]
    UnknownCommand { line: usize, word: String },
    #[error("line {line}: unexpected argument '{word}'")]
    UnexpectedArgument { line: usize, word: String },
    #[error("line {line}: {source}")]
    Card {
        line: usize,
        #[source]
        source: ParseCardError,
    },
    #[error("line {line}: '{value}' is not a suit")]
    Suit { line: usize, value: String },
    #[error("line {line}: {source}")]
    Move {
        line: usize,
        #[source]
        source: MoveError,
    },
}

pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<ScriptLine>, ScriptError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        source,
        path: path.to_path_buf(),
    })?;
    parse_script(&text)
}

/// Parses one command per line. Blank lines and `#` comments are skipped.
///
/// ```text
/// play 9S 9C continue
/// play JD request=H
/// pass
/// next-round
/// ```
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(command) = parse_command(line, raw)? {
            lines.push(ScriptLine { line, command });
        }
    }
    Ok(lines)
}

fn parse_command(line: usize, raw: &str) -> Result<Option<Command>, ScriptError> {
    let content = raw.split('#').next().unwrap_or_default();
    let mut words = content.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "play" => Command::Play(parse_play(line, words)?),
        "pass" => {
            reject_arguments(line, words)?;
            Command::Pass
        }
        "next-round" => {
            reject_arguments(line, words)?;
            Command::NextRound
        }
        _ => {
            return Err(ScriptError::UnknownCommand {
                line,
                word: verb.to_string(),
            });
        }
    };
    Ok(Some(command))
}

fn parse_play<'a>(
    line: usize,
    words: impl Iterator<Item = &'a str>,
) -> Result<Move, ScriptError> {
    let mut cards: Vec<Card> = Vec::new();
    let mut requested_suit = None;
    let mut bridge = false;
    let mut completed = true;

    for word in words {
        let lower = word.to_ascii_lowercase();
        if lower == "continue" {
            completed = false;
        } else if lower == "bridge" {
            bridge = true;
        } else if let Some(value) = lower.strip_prefix("request=") {
            let suit = Suit::from_code(value).ok_or_else(|| ScriptError::Suit {
                line,
                value: value.to_string(),
            })?;
            requested_suit = Some(suit);
        } else {
            let card = word
                .parse()
                .map_err(|source| ScriptError::Card { line, source })?;
            cards.push(card);
        }
    }

    Move::new(cards, requested_suit, bridge, completed)
        .map_err(|source| ScriptError::Move { line, source })
}

fn reject_arguments<'a>(
    line: usize,
    mut words: impl Iterator<Item = &'a str>,
) -> Result<(), ScriptError> {
    match words.next() {
        Some(word) => Err(ScriptError::UnexpectedArgument {
            line,
            word: word.to_string(),
        }),
        None => Ok(()),
    }
}
