mod board_renderer;
mod level_file;
mod palette_presets;
mod session;

use std::{io, path::PathBuf};

use cascade_engine::{BoardMask, FeedbackVerbosity, Game, Level};
use clap::{Parser, ValueEnum};

use crate::{board_renderer::BoardRenderer, palette_presets::Palette, session::Session};

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
enum PaletteChoice {
    Monochrome,
    Color16,
    #[default]
    Fullcolor,
    Gruvbox,
}

impl PaletteChoice {
    fn palette(self) -> Palette {
        match self {
            PaletteChoice::Monochrome => palette_presets::monochrome_palette(),
            PaletteChoice::Color16 => palette_presets::color16_palette(),
            PaletteChoice::Fullcolor => palette_presets::fullcolor_palette(),
            PaletteChoice::Gruvbox => palette_presets::gruvbox_palette(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level to play, given as the path to a level file or the name of a bundled level.
    /// Example: `./cascade-match --level level_2`.
    #[arg(short, long)]
    level: Option<String>,
    /// Additional directory searched first for levels given by name.
    #[arg(long)]
    levels_dir: Option<PathBuf>,
    /// Custom board layout, top row first, rows separated by `/`.
    /// `#` is a playable cell, `-` a hole.
    /// Example: `./cascade-match --mask="-#####-/#######/#######/-#####-"`.
    #[arg(short, long, conflicts_with = "level")]
    mask: Option<String>,
    /// Score needed to complete the level.
    #[arg(short, long)]
    target_score: Option<u32>,
    /// Number of swaps allowed.
    #[arg(long)]
    moves: Option<u32>,
    /// Custom starting seed, given as a 64-bit integer.
    /// Playing again with the same seed (and the same swaps) replays the same game.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Number of different piece kinds (at least 3).
    #[arg(short, long)]
    kinds: Option<u8>,
    /// Let the computer play up to this many turns with random legal swaps.
    #[arg(long, value_name = "TURNS")]
    autoplay: Option<u32>,
    /// Print one JSON turn report per line instead of drawing the board.
    #[arg(long)]
    json: bool,
    /// Shorthand for `--palette monochrome`.
    #[arg(long)]
    monochrome: bool,
    /// Colours used for the piece kinds.
    #[arg(long, value_enum, default_value_t)]
    palette: PaletteChoice,
    /// Narrate every internal stage of a turn.
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn level(&self) -> Result<Level, Box<dyn std::error::Error>> {
        let mut level = match (&self.level, &self.mask) {
            (Some(name), _) => level_file::load_level(name, self.levels_dir.as_deref())?,
            (None, Some(mask)) => Level {
                mask: mask.parse::<BoardMask>()?,
                ..Level::default()
            },
            (None, None) => Level::default(),
        };
        if let Some(target_score) = self.target_score {
            level.target_score = target_score;
        }
        if let Some(moves) = self.moves {
            level.moves = moves;
        }
        Ok(level)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read commandline arguments.
    let args = Args::parse();

    let mut builder = Game::builder();
    builder.level(args.level()?);
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    if let Some(kinds) = args.kinds {
        builder.kind_count(kinds);
    }
    if args.debug {
        builder.feedback_verbosity(FeedbackVerbosity::Debug);
    }
    let game = builder.build()?;

    let palette = if args.monochrome {
        palette_presets::monochrome_palette()
    } else {
        args.palette.palette()
    };
    let stdout = io::BufWriter::new(io::stdout());
    let mut session = Session::new(stdout, game, BoardRenderer::new(palette), args.json);

    // Make sure a panic does not leave the terminal coloured.
    std::panic::set_hook(Box::new(|panic_info| {
        let _ =
            crossterm::ExecutableCommand::execute(&mut io::stderr(), crossterm::style::ResetColor);
        eprint!("{panic_info}\n\n");
    }));

    match args.autoplay {
        Some(turns) => session.run_autoplay(turns)?,
        None => session.run_interactive(io::stdin().lock())?,
    }

    Ok(())
}
