use std::{
    fmt,
    io::{self, BufRead, Write},
};

use cascade_engine::{Game, Swap, UpdateGameError};
use crossterm::{
    style::{Print, PrintStyledContent, Stylize},
    QueueableCommand,
};
use rand::{rngs::StdRng, seq::IndexedRandom, SeedableRng};

use crate::board_renderer::BoardRenderer;

/// A line of player input.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Command {
    Swap(Swap),
    Hint,
    Shuffle,
    Board,
    Help,
    Quit,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum CommandError {
    Empty,
    Unknown(String),
    NotANumber(String),
    WrongArity(usize),
    NotAdjacent,
}

pub const HELP: &str = "\
Commands:
  <col> <row> <col> <row>   swap two adjacent pieces, e.g. `3 4 4 4`
  <col> <row> <u|d|l|r>     swap a piece with its neighbour above/below/left/right
  h, hint                   show a legal swap
  s, shuffle                reshuffle the board (may cost a move)
  b, board                  print the board again
  ?, help                   print this help
  q, quit                   give up and leave
";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let tokens: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();
    let Some(&first) = tokens.first() else {
        return Err(CommandError::Empty);
    };
    let keyword = match first.to_ascii_lowercase().as_str() {
        "h" | "hint" => Some(Command::Hint),
        "s" | "shuffle" => Some(Command::Shuffle),
        "b" | "board" => Some(Command::Board),
        "?" | "help" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    };
    if let Some(command) = keyword {
        return Ok(command);
    }
    if first.parse::<usize>().is_err() {
        return Err(CommandError::Unknown(first.to_string()));
    }

    let number = |token: &str| {
        token
            .parse::<usize>()
            .map_err(|_| CommandError::NotANumber(token.to_string()))
    };
    let (from, to) = match tokens[..] {
        [c0, r0, c1, r1] => ((number(c0)?, number(r0)?), (number(c1)?, number(r1)?)),
        [c, r, direction] => {
            let (column, row) = (number(c)?, number(r)?);
            let neighbor = match direction.to_ascii_lowercase().as_str() {
                "u" | "up" => Some((column, row + 1)),
                "d" | "down" => row.checked_sub(1).map(|row| (column, row)),
                "l" | "left" => column.checked_sub(1).map(|column| (column, row)),
                "r" | "right" => Some((column + 1, row)),
                _ => return Err(CommandError::Unknown(direction.to_string())),
            };
            ((column, row), neighbor.ok_or(CommandError::NotAdjacent)?)
        }
        _ => return Err(CommandError::WrongArity(tokens.len())),
    };
    Swap::new(from, to)
        .map(Command::Swap)
        .ok_or(CommandError::NotAdjacent)
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "no command given"),
            CommandError::Unknown(token) => write!(f, "unknown command {token:?}"),
            CommandError::NotANumber(token) => write!(f, "{token:?} is not a coordinate"),
            CommandError::WrongArity(n) => {
                write!(f, "expected 3 or 4 values for a swap, got {n}")
            }
            CommandError::NotAdjacent => write!(f, "cells are not adjacent"),
        }
    }
}

impl std::error::Error for CommandError {}

/// One game played in the terminal, either by a person or by the autoplayer.
pub struct Session<W: Write> {
    term: W,
    game: Game,
    renderer: BoardRenderer,
    /// Print a JSON line per turn instead of the human-readable narration.
    json: bool,
}

impl<W: Write> Session<W> {
    pub fn new(term: W, game: Game, renderer: BoardRenderer, json: bool) -> Self {
        Self {
            term,
            game,
            renderer,
            json,
        }
    }

    #[cfg(test)]
    pub fn game(&self) -> &Game {
        &self.game
    }

    #[cfg(test)]
    pub fn into_term(self) -> W {
        self.term
    }

    pub fn run_interactive<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        if !self.json {
            self.term.queue(PrintStyledContent(
                format!("{} {}\n", clap::crate_name!(), clap::crate_version!()).bold(),
            ))?;
            self.term.queue(Print("Type `?` for help.\n\n"))?;
            self.show_board()?;
        }

        let mut lines = input.lines();
        while !self.game.ended() {
            if !self.json {
                self.term.queue(Print("> "))?;
                self.term.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let command = match parse_command(&line?) {
                Ok(command) => command,
                Err(CommandError::Empty) => continue,
                Err(e) => {
                    self.say(&format!("{e}; type `?` for help."))?;
                    continue;
                }
            };
            match command {
                Command::Swap(swap) => self.play_turn(swap)?,
                Command::Hint => match self.game.hint() {
                    Some(swap) => {
                        self.say(&format!("Try {swap}."))?;
                        if !self.json {
                            self.renderer
                                .render_board(&mut self.term, self.game.board(), Some(swap))?;
                        }
                    }
                    None => self.say("No legal swap available, try shuffling.")?,
                },
                Command::Shuffle => self.shuffle()?,
                Command::Board => self.show_board()?,
                Command::Help => self.say(HELP)?,
                Command::Quit => {
                    if let Ok(feedback) = self.game.forfeit() {
                        if !self.json {
                            self.renderer
                                .render_feedback(&mut self.term, &feedback, self.game.board())?;
                        }
                    }
                }
            }
        }
        self.finish()
    }

    /// Plays up to `max_turns` turns with swaps drawn at random from the legal ones.
    ///
    /// Swaps are drawn from an RNG seeded with the game seed, so a seed replays the same game.
    pub fn run_autoplay(&mut self, max_turns: u32) -> io::Result<()> {
        let mut rng = StdRng::seed_from_u64(self.game.state_init().seed);
        if !self.json {
            self.show_board()?;
        }
        for _ in 0..max_turns {
            if self.game.ended() {
                break;
            }
            let legal: Vec<Swap> = self.game.board().legal_swaps().iter().copied().collect();
            match legal.choose(&mut rng) {
                Some(&swap) => self.play_turn(swap)?,
                None => self.shuffle()?,
            }
        }
        self.finish()
    }

    fn play_turn(&mut self, swap: Swap) -> io::Result<()> {
        if self.json {
            return match self.game.play_turn(swap) {
                Ok(report) => {
                    writeln!(self.term, "{}", serde_json::to_string(&report)?)?;
                    self.term.flush()
                }
                Err(e) => self.say(&e.to_string()),
            };
        }

        if let Err(e) = self.game.submit_swap(swap) {
            return match e {
                UpdateGameError::IllegalSwap(_) => self.say(&format!("{e}; try `hint`.")),
                _ => self.say(&e.to_string()),
            };
        }
        while self.game.turn_in_progress() {
            let feedback_msgs = self
                .game
                .step()
                .map_err(|e| io::Error::other(e.to_string()))?;
            for feedback in &feedback_msgs {
                self.renderer
                    .render_feedback(&mut self.term, feedback, self.game.board())?;
            }
        }
        if !self.game.ended() {
            self.renderer.render_status(&mut self.term, &self.game)?;
        }
        Ok(())
    }

    fn shuffle(&mut self) -> io::Result<()> {
        match self.game.shuffle() {
            Ok(feedback_msgs) => {
                if !self.json {
                    for feedback in &feedback_msgs {
                        self.renderer
                            .render_feedback(&mut self.term, feedback, self.game.board())?;
                    }
                    if !self.game.ended() {
                        self.renderer.render_status(&mut self.term, &self.game)?;
                    }
                }
                Ok(())
            }
            Err(e) => self.say(&e.to_string()),
        }
    }

    fn show_board(&mut self) -> io::Result<()> {
        self.renderer
            .render_board(&mut self.term, self.game.board(), None)?;
        self.renderer.render_status(&mut self.term, &self.game)
    }

    fn say(&mut self, msg: &str) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        self.term.queue(Print(msg))?.queue(Print("\n"))?;
        self.term.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        if self.json {
            return Ok(());
        }
        let state = self.game.state();
        let outcome = match self.game.result() {
            Some(Ok(())) => "won".to_string(),
            Some(Err(game_over)) => game_over.to_string(),
            None => "unfinished".to_string(),
        };
        let summary = format!(
            "Final score {} after {} turns ({outcome}).\n",
            state.score, state.turns_played
        );
        self.term.queue(Print(summary))?;
        self.term.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette_presets::monochrome_palette;

    fn swap(a: (usize, usize), b: (usize, usize)) -> Command {
        Command::Swap(Swap::new(a, b).unwrap())
    }

    fn session(seed: u64, json: bool) -> Session<Vec<u8>> {
        let game = Game::builder().seed(seed).moves(8).build().unwrap();
        Session::new(Vec::new(), game, BoardRenderer::new(monochrome_palette()), json)
    }

    #[test]
    fn parses_swaps_in_both_notations() {
        assert_eq!(parse_command("3 4 4 4"), Ok(swap((3, 4), (4, 4))));
        assert_eq!(parse_command(" 3,4, 3,5 "), Ok(swap((3, 4), (3, 5))));
        assert_eq!(parse_command("3 4 d"), Ok(swap((3, 4), (3, 3))));
        assert_eq!(parse_command("0 4 L"), Err(CommandError::NotAdjacent));
        assert_eq!(parse_command("1 1 2 2"), Err(CommandError::NotAdjacent));
        assert_eq!(parse_command("1 1 2"), Err(CommandError::Unknown("2".into())));
        assert_eq!(parse_command("1 x 2 2"), Err(CommandError::NotANumber("x".into())));
        assert_eq!(parse_command("1 1"), Err(CommandError::WrongArity(2)));
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(parse_command("hint"), Ok(Command::Hint));
        assert_eq!(parse_command("S"), Ok(Command::Shuffle));
        assert_eq!(parse_command("?"), Ok(Command::Help));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("jump"),
            Err(CommandError::Unknown("jump".into()))
        );
    }

    #[test]
    fn quitting_forfeits() {
        let mut session = session(3, false);
        session.run_interactive(&b"h\nnonsense\nq\n"[..]).unwrap();
        assert_eq!(
            session.game().result(),
            Some(Err(cascade_engine::GameOver::Forfeit))
        );
        let out = String::from_utf8(session.into_term()).unwrap();
        assert!(out.contains("Try "));
        assert!(out.contains("unknown command \"nonsense\""));
        assert!(out.contains("Game abandoned."));
    }

    #[test]
    fn autoplay_is_reproducible() {
        let mut first = session(11, true);
        first.run_autoplay(5).unwrap();
        let mut second = session(11, true);
        second.run_autoplay(5).unwrap();

        assert_eq!(first.game(), second.game());
        assert!(first.game().state().turns_played >= 1);
        let out = String::from_utf8(first.into_term()).unwrap();
        assert_eq!(
            out.lines().count() as u32,
            second.game().state().turns_played
        );
        for line in out.lines() {
            let report: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(report["score_delta"].as_u64().unwrap() >= 60);
        }
    }
}
