use std::io::{self, Write};

use cascade_engine::{Board, Feedback, Game, GameOver, Piece, Swap};
use crossterm::{
    style::{Color, Print, PrintStyledContent, Stylize},
    QueueableCommand,
};

use crate::palette_presets::Palette;

/// Prints boards and game events as plain lines, coloured by a [`Palette`].
#[derive(Clone, Debug)]
pub struct BoardRenderer {
    palette: Palette,
}

impl BoardRenderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    fn piece_color(&self, piece: &Piece) -> Option<Color> {
        self.palette.get(&piece.kind.index()).copied()
    }

    /// Prints the board top row first, with column and row numbers around it.
    pub fn render_board<W: Write>(
        &self,
        term: &mut W,
        board: &Board,
        highlight: Option<Swap>,
    ) -> io::Result<()> {
        let highlighted = |coord| {
            highlight.is_some_and(|swap| {
                let (a, b) = swap.coords();
                a == coord || b == coord
            })
        };

        for row in (0..board.height()).rev() {
            term.queue(Print(format!("{row:>2} ")))?;
            for column in 0..board.width() {
                let coord = (column, row);
                let symbol = match board.piece_at(coord) {
                    Some(piece) => {
                        let mut styled = piece.kind.symbol().to_string().stylize();
                        if let Some(color) = self.piece_color(piece) {
                            styled = styled.with(color);
                        }
                        if highlighted(coord) {
                            styled = styled.reverse();
                        }
                        styled
                    }
                    None if board.mask().is_playable(coord) => "·".to_string().dark_grey(),
                    None => " ".to_string().stylize(),
                };
                term.queue(PrintStyledContent(symbol))?.queue(Print(" "))?;
            }
            term.queue(Print("\n"))?;
        }

        term.queue(Print("   "))?;
        for column in 0..board.width() {
            term.queue(Print(format!("{} ", column % 10)))?;
        }
        term.queue(Print("\n"))?;
        term.flush()
    }

    pub fn render_status<W: Write>(&self, term: &mut W, game: &Game) -> io::Result<()> {
        let state = game.state();
        term.queue(Print(format!(
            "Score {}/{} | Moves left {} | Turn {}\n",
            state.score,
            game.level().target_score,
            state.moves_left,
            state.turns_played + 1,
        )))?;
        term.flush()
    }

    /// Prints one line per event; the events that move pieces around also reprint the board.
    pub fn render_feedback<W: Write>(
        &self,
        term: &mut W,
        feedback: &Feedback,
        board: &Board,
    ) -> io::Result<()> {
        match feedback {
            Feedback::BoardShuffled { pieces, automatic } => {
                let reason = if *automatic {
                    "no moves left, reshuffled"
                } else {
                    "shuffled"
                };
                term.queue(PrintStyledContent(
                    format!("~ Board {reason} ({} pieces).\n", pieces.len()).yellow(),
                ))?;
                self.render_board(term, board, None)?;
            }
            Feedback::SwapPerformed { swap } => {
                term.queue(Print(format!("> Swapped {swap}.\n")))?;
            }
            Feedback::ChainsRemoved {
                chains,
                score_delta,
            } => {
                for chain in chains {
                    let first = chain.first().position;
                    let last = chain.last().position;
                    let line = format!(
                        "* {} x{} {:?}..{:?} +{}\n",
                        chain.kind(),
                        chain.len(),
                        first,
                        last,
                        chain.score
                    );
                    let styled = match self.palette.get(&chain.kind().index()) {
                        Some(&color) => line.with(color),
                        None => line.stylize(),
                    };
                    term.queue(PrintStyledContent(styled))?;
                }
                if chains.len() > 1 {
                    term.queue(Print(format!("  = +{score_delta}\n")))?;
                }
            }
            Feedback::PiecesFell { columns } => {
                let count: usize = columns.iter().map(Vec::len).sum();
                if count > 0 {
                    term.queue(Print(format!("v {count} pieces fell.\n")))?;
                }
            }
            Feedback::PiecesSpawned { columns } => {
                let count: usize = columns.iter().map(Vec::len).sum();
                term.queue(Print(format!("+ {count} pieces spawned.\n")))?;
                self.render_board(term, board, None)?;
            }
            Feedback::TurnEnded {
                score_delta,
                has_legal_swaps,
            } => {
                term.queue(PrintStyledContent(
                    format!("Turn over: +{score_delta}.\n").bold(),
                ))?;
                if !has_legal_swaps {
                    term.queue(Print("No legal swaps remain.\n"))?;
                }
            }
            Feedback::GameEnded { result } => {
                let line = match result {
                    Ok(()) => "Level complete!".to_string().green().bold(),
                    Err(GameOver::Forfeit) => "Game abandoned.".to_string().red(),
                    Err(game_over) => format!("Game over: {game_over}.").red().bold(),
                };
                term.queue(PrintStyledContent(line))?.queue(Print("\n"))?;
            }
            Feedback::Debug(msg) => {
                term.queue(PrintStyledContent(format!("[debug] {msg}\n").dark_grey()))?;
            }
        }
        term.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette_presets::monochrome_palette;

    #[test]
    fn monochrome_board_has_labels_and_gaps() {
        let board: Board = "ab-\nc.a".parse().unwrap();
        let mut out = Vec::new();
        BoardRenderer::new(monochrome_palette())
            .render_board(&mut out, &board, None)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(" 1 a b"));
        assert!(text.contains(" 0 c"));
        assert!(text.ends_with("   0 1 2 \n"));
    }
}
