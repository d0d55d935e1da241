/*!
This module handles what happens when a [`Game`] is played:
accepting swaps and resolving them stage by stage until the board settles.
*/

use super::*;

impl Game {
    /// Starts a turn with the given swap.
    ///
    /// The swap is only performed by the following call to [`Game::step`]; until the turn is
    /// over the board must not be considered settled.
    ///
    /// # Errors
    ///
    /// This function may error with:
    /// - [`UpdateGameError::GameEnded`] if the game has ended,
    /// - [`UpdateGameError::TurnInProgress`] if the previous swap is still resolving, or
    /// - [`UpdateGameError::IllegalSwap`] if the swap would not create a chain, in which case
    ///   nothing changes.
    pub fn submit_swap(&mut self, swap: Swap) -> Result<(), UpdateGameError> {
        self.check_idle()?;
        if !self.state.board.is_legal(&swap) {
            return Err(UpdateGameError::IllegalSwap(swap));
        }
        self.state.turn.reset_combo();
        self.phase = Phase::SwapPending { swap };
        Ok(())
    }

    /// Advances the turn in progress by exactly one stage, returning the feedback produced.
    ///
    /// Stages are: performing the swap, detecting chains, scoring and removing them, letting
    /// pieces fall, and refilling the top. Detection finding nothing ends the turn.
    /// While the game waits for a swap this does nothing.
    ///
    /// # Errors
    ///
    /// [`UpdateGameError::GameEnded`] if the game has ended.
    pub fn step(&mut self) -> Result<Vec<Feedback>, UpdateGameError> {
        if self.ended() {
            return Err(UpdateGameError::GameEnded);
        }
        let mut feedback_msgs = Vec::new();
        self.advance(&mut feedback_msgs);
        Ok(self.filter_feedback(feedback_msgs))
    }

    /// Plays an entire turn: submits the swap and steps until the board has settled.
    ///
    /// The returned report does not depend on [`Configuration::feedback_verbosity`].
    ///
    /// # Errors
    ///
    /// Same as [`Game::submit_swap`].
    pub fn play_turn(&mut self, swap: Swap) -> Result<TurnReport, UpdateGameError> {
        self.submit_swap(swap)?;
        let mut feedback_msgs = Vec::new();
        while self.turn_in_progress() {
            self.advance(&mut feedback_msgs);
        }
        Ok(TurnReport::from_feedback(swap, feedback_msgs))
    }

    /// Replaces the board with a freshly generated one offering at least one legal swap.
    ///
    /// Costs a move if [`Configuration::shuffle_costs_move`] is set, which may end the game.
    /// If no playable board can be generated the game ends with [`GameOver::NoLegalSwaps`].
    ///
    /// # Errors
    ///
    /// [`UpdateGameError::GameEnded`] or [`UpdateGameError::TurnInProgress`] unless the game
    /// is waiting for a swap.
    pub fn shuffle(&mut self) -> Result<Vec<Feedback>, UpdateGameError> {
        self.check_idle()?;
        let mut feedback_msgs = Vec::new();
        self.phase = match self.reshuffle(false, &mut feedback_msgs) {
            Ok(()) => {
                if self.config.shuffle_costs_move {
                    self.state.moves_left = self.state.moves_left.saturating_sub(1);
                }
                self.settle(true, &mut feedback_msgs)
            }
            Err(_) => self.end_game(Err(GameOver::NoLegalSwaps), &mut feedback_msgs),
        };
        Ok(self.filter_feedback(feedback_msgs))
    }

    fn check_idle(&self) -> Result<(), UpdateGameError> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::GameEnd { .. } => Err(UpdateGameError::GameEnded),
            Phase::SwapPending { .. } | Phase::Resolving { .. } => {
                Err(UpdateGameError::TurnInProgress)
            }
        }
    }

    /// Processes the current phase once, collecting every feedback message regardless of verbosity.
    fn advance(&mut self, feedback_msgs: &mut Vec<Feedback>) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        let processed = stage_name(&phase);
        self.phase = match phase {
            Phase::Idle | Phase::GameEnd { .. } => {
                self.phase = phase;
                return;
            }

            Phase::SwapPending { swap } => {
                self.state.board.perform_swap(swap);
                feedback_msgs.push(Feedback::SwapPerformed { swap });
                Phase::Resolving {
                    stage: ResolveStage::Detect,
                }
            }

            // No chains means the board settled.
            Phase::Resolving {
                stage: ResolveStage::Detect,
            } => {
                let chains = self.state.board.find_chains();
                if chains.is_empty() {
                    self.end_turn(feedback_msgs)
                } else {
                    Phase::Resolving {
                        stage: ResolveStage::RemoveAndScore { chains },
                    }
                }
            }

            Phase::Resolving {
                stage: ResolveStage::RemoveAndScore { mut chains },
            } => {
                let score_delta = self
                    .state
                    .turn
                    .score_chains(&mut chains, self.config.chain_base_score);
                self.state.score = self.state.score.saturating_add(score_delta);
                self.state.board.remove_chains(&chains);
                feedback_msgs.push(Feedback::ChainsRemoved {
                    chains,
                    score_delta,
                });
                Phase::Resolving {
                    stage: ResolveStage::Gravity,
                }
            }

            Phase::Resolving {
                stage: ResolveStage::Gravity,
            } => {
                let columns = self.state.board.fill_holes();
                feedback_msgs.push(Feedback::PiecesFell { columns });
                Phase::Resolving {
                    stage: ResolveStage::Refill,
                }
            }

            Phase::Resolving {
                stage: ResolveStage::Refill,
            } => {
                let columns = self.state.board.top_up(
                    &mut self.state.piece_generator,
                    &mut self.state.rng,
                    self.state_init.kind_count,
                );
                feedback_msgs.push(Feedback::PiecesSpawned { columns });
                Phase::Resolving {
                    stage: ResolveStage::Detect,
                }
            }
        };
        feedback_msgs.push(Feedback::Debug(format!(
            "processed {processed}, next: {}",
            stage_name(&self.phase)
        )));
    }

    fn end_turn(&mut self, feedback_msgs: &mut Vec<Feedback>) -> Phase {
        let has_legal_swaps = !self.state.board.recompute_legal_swaps().is_empty();
        self.state.moves_left = self.state.moves_left.saturating_sub(1);
        self.state.turns_played += 1;
        feedback_msgs.push(Feedback::TurnEnded {
            score_delta: self.state.turn.score_delta(),
            has_legal_swaps,
        });
        self.settle(has_legal_swaps, feedback_msgs)
    }

    /// Decides how the game continues once the board is at rest.
    fn settle(&mut self, has_legal_swaps: bool, feedback_msgs: &mut Vec<Feedback>) -> Phase {
        if self.state.score >= self.level.target_score {
            self.end_game(Ok(()), feedback_msgs)
        } else if self.state.moves_left == 0 {
            self.end_game(Err(GameOver::OutOfMoves), feedback_msgs)
        } else if !has_legal_swaps && self.config.auto_shuffle {
            match self.reshuffle(true, feedback_msgs) {
                Ok(()) => Phase::Idle,
                Err(_) => self.end_game(Err(GameOver::NoLegalSwaps), feedback_msgs),
            }
        } else {
            // Without auto-shuffle a stuck player is left to call `shuffle` themselves.
            Phase::Idle
        }
    }

    fn reshuffle(
        &mut self,
        automatic: bool,
        feedback_msgs: &mut Vec<Feedback>,
    ) -> Result<(), ShuffleError> {
        let pieces = self.state.board.shuffle(
            &mut self.state.piece_generator,
            &mut self.state.rng,
            self.state_init.kind_count,
            self.config.max_shuffle_attempts,
        )?;
        self.state.shuffles += 1;
        feedback_msgs.push(Feedback::BoardShuffled { pieces, automatic });
        Ok(())
    }

    fn end_game(&mut self, result: GameResult, feedback_msgs: &mut Vec<Feedback>) -> Phase {
        feedback_msgs.push(Feedback::GameEnded { result });
        Phase::GameEnd { result }
    }

    fn filter_feedback(&self, mut feedback_msgs: Vec<Feedback>) -> Vec<Feedback> {
        match self.config.feedback_verbosity {
            FeedbackVerbosity::Silent => feedback_msgs.clear(),
            FeedbackVerbosity::Default => {
                feedback_msgs.retain(|msg| !matches!(msg, Feedback::Debug(_)));
            }
            FeedbackVerbosity::Debug => {}
        }
        feedback_msgs
    }
}

fn stage_name(phase: &Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::SwapPending { .. } => "swap",
        Phase::Resolving { stage } => match stage {
            ResolveStage::Detect => "detect",
            ResolveStage::RemoveAndScore { .. } => "remove-and-score",
            ResolveStage::Gravity => "gravity",
            ResolveStage::Refill => "refill",
        },
        Phase::GameEnd { .. } => "game end",
    }
}

impl TurnReport {
    /// Collects the unfiltered feedback of one turn into a report.
    fn from_feedback(swap: Swap, feedback_msgs: Vec<Feedback>) -> Self {
        let mut report = TurnReport {
            swap,
            steps: Vec::new(),
            score_delta: 0,
            has_legal_swaps: false,
            reshuffled: None,
            result: None,
        };
        for msg in feedback_msgs {
            match msg {
                Feedback::ChainsRemoved {
                    chains,
                    score_delta,
                } => report.steps.push(CascadeStep {
                    chains,
                    score_delta,
                    ..Default::default()
                }),
                Feedback::PiecesFell { columns } => {
                    if let Some(step) = report.steps.last_mut() {
                        step.fallen = columns;
                    }
                }
                Feedback::PiecesSpawned { columns } => {
                    if let Some(step) = report.steps.last_mut() {
                        step.spawned = columns;
                    }
                }
                Feedback::TurnEnded {
                    score_delta,
                    has_legal_swaps,
                } => {
                    report.score_delta = score_delta;
                    report.has_legal_swaps = has_legal_swaps;
                }
                Feedback::BoardShuffled {
                    pieces,
                    automatic: true,
                } => report.reshuffled = Some(pieces),
                Feedback::GameEnded { result } => report.result = Some(result),
                Feedback::BoardShuffled { .. }
                | Feedback::SwapPerformed { .. }
                | Feedback::Debug(_) => {}
            }
        }
        report
    }
}
