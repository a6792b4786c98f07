use std::fs;
use std::path::PathBuf;

use bridge_core::game::error::GameError;
use bridge_core::game::snapshot::GameSnapshot;
use bridge_core::game::state::GameState;
use bridge_core::game::table::Game;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ResolvedOutputs, TableConfig};
use crate::script::{Command, ScriptLine};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to set up the table: {0}")]
    Setup(#[source] GameError),
    #[error("line {line}: table stopped: {source}")]
    Stopped {
        line: usize,
        #[source]
        source: GameError,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub rounds_finished: usize,
    pub final_state: GameState,
    pub snapshot_path: PathBuf,
}

/// Replays a move script against a freshly dealt table and records where it
/// ended up.
pub struct TableRunner {
    config: TableConfig,
    outputs: ResolvedOutputs,
}

impl TableRunner {
    pub fn new(config: TableConfig, outputs: ResolvedOutputs) -> Self {
        Self { config, outputs }
    }

    pub fn run(&self, script: &[ScriptLine]) -> Result<RunSummary, RunnerError> {
        let mut game = self.config.new_game().map_err(RunnerError::Setup)?;
        info!(
            run_id = %self.config.run_id,
            players = game.players().len(),
            dealer = game.dealer_index(),
            required_first_card = ?game.required_first_card(),
            "table dealt"
        );

        let mut accepted = 0;
        let mut rejected = 0;
        let mut rounds_finished = 0;

        for entry in script {
            let before = game.state();
            match execute(&mut game, &entry.command) {
                Ok(detail) => {
                    accepted += 1;
                    info!(
                        line = entry.line,
                        player = game.current_player_index(),
                        state = %game.state(),
                        %detail,
                        "command accepted"
                    );
                }
                Err(err) if err.is_internal() => {
                    return Err(RunnerError::Stopped {
                        line: entry.line,
                        source: err,
                    });
                }
                Err(err) => {
                    rejected += 1;
                    warn!(line = entry.line, %err, "command rejected");
                }
            }

            if before != GameState::RoundEnded && game.state() == GameState::RoundEnded {
                rounds_finished += 1;
                if let Some(outcome) = game.outcome() {
                    info!(
                        player = outcome.player,
                        reason = ?outcome.reason,
                        points_ratio = outcome.points_ratio,
                        "round finished"
                    );
                }
            }
        }

        let snapshot_path = self.write_snapshot(&game)?;

        Ok(RunSummary {
            commands: script.len(),
            accepted,
            rejected,
            rounds_finished,
            final_state: game.state(),
            snapshot_path,
        })
    }

    fn write_snapshot(&self, game: &Game) -> Result<PathBuf, RunnerError> {
        let path = self.outputs.snapshot.clone();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RunnerError::Write {
                source,
                path: parent.to_path_buf(),
            })?;
        }

        let json = GameSnapshot::to_json(game)?;
        fs::write(&path, json).map_err(|source| RunnerError::Write {
            source,
            path: path.clone(),
        })?;
        Ok(path)
    }
}

fn execute(game: &mut Game, command: &Command) -> Result<String, GameError> {
    match command {
        Command::Play(mv) => {
            game.make_move(mv.clone())?;
            Ok(format!("play {mv}"))
        }
        Command::Pass => {
            let outcome = game.pass()?;
            Ok(format!("pass ({outcome:?})"))
        }
        Command::NextRound => {
            game.start_next_round()?;
            Ok(format!("next round, dealer {}", game.dealer_index()))
        }
    }
}
