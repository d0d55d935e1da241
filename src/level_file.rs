use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use cascade_engine::{BoardMask, ConfigError, Level};

/// On-disk form of a level.
///
/// `tiles` lists rows top first; `1` marks a playable cell and `0` a hole in the board.
#[derive(PartialEq, Eq, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelFile {
    pub tiles: Vec<Vec<u8>>,
    pub target_score: u32,
    pub moves: u32,
}

#[derive(Debug)]
pub enum LevelFileError {
    Io(io::Error),
    Json(serde_json::Error),
    InvalidTile {
        line: usize,
        column: usize,
        value: u8,
    },
    Config(ConfigError),
}

impl LevelFile {
    pub const EXTENSION: &'static str = "json";

    pub fn from_json(json: &str) -> Result<Self, LevelFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LevelFileError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_level(&self) -> Result<Level, LevelFileError> {
        let mut rows = Vec::with_capacity(self.tiles.len());
        for (line, tiles) in self.tiles.iter().enumerate() {
            let row = tiles
                .iter()
                .enumerate()
                .map(|(column, &value)| match value {
                    0 => Ok(false),
                    1 => Ok(true),
                    value => Err(LevelFileError::InvalidTile {
                        line,
                        column,
                        value,
                    }),
                })
                .collect::<Result<Vec<bool>, _>>()?;
            rows.push(row);
        }
        Ok(Level {
            mask: BoardMask::from_rows(&rows)?,
            target_score: self.target_score,
            moves: self.moves,
        })
    }
}

/// Directories searched for level files by name, in order.
///
/// These are the custom directory if given, the levels bundled with the game, and the
/// user's data directory.
pub fn levels_dirs(custom_dir: Option<&Path>) -> Vec<PathBuf> {
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("levels");
    let user = dirs::data_dir().map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("levels"));
    custom_dir
        .map(Path::to_path_buf)
        .into_iter()
        .chain([bundled])
        .chain(user)
        .collect()
}

/// Finds a level given either as a path to a file or as the name of a bundled or installed level.
pub fn find_level(name_or_path: &str, custom_dir: Option<&Path>) -> Result<PathBuf, LevelFileError> {
    let path = Path::new(name_or_path);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    let file_name = Path::new(name_or_path).with_extension(LevelFile::EXTENSION);
    levels_dirs(custom_dir)
        .into_iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            LevelFileError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no level named {name_or_path:?} found"),
            ))
        })
}

pub fn load_level(name_or_path: &str, custom_dir: Option<&Path>) -> Result<Level, LevelFileError> {
    LevelFile::load(&find_level(name_or_path, custom_dir)?)?.to_level()
}

impl fmt::Display for LevelFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFileError::Io(e) => write!(f, "could not read level: {e}"),
            LevelFileError::Json(e) => write!(f, "malformed level file: {e}"),
            LevelFileError::InvalidTile {
                line,
                column,
                value,
            } => write!(
                f,
                "tile {value} in line {line}, column {column} is neither 0 nor 1"
            ),
            LevelFileError::Config(e) => write!(f, "unusable level: {e}"),
        }
    }
}

impl std::error::Error for LevelFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelFileError::Io(e) => Some(e),
            LevelFileError::Json(e) => Some(e),
            LevelFileError::InvalidTile { .. } => None,
            LevelFileError::Config(e) => Some(e),
        }
    }
}

impl From<io::Error> for LevelFileError {
    fn from(e: io::Error) -> Self {
        LevelFileError::Io(e)
    }
}

impl From<serde_json::Error> for LevelFileError {
    fn from(e: serde_json::Error) -> Self {
        LevelFileError::Json(e)
    }
}

impl From<ConfigError> for LevelFileError {
    fn from(e: ConfigError) -> Self {
        LevelFileError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_layout_top_row_first() {
        let file = LevelFile::from_json(
            r#"{ "tiles": [[0, 1, 1], [1, 1, 1]], "targetScore": 1500, "moves": 12 }"#,
        )
        .unwrap();
        let level = file.to_level().unwrap();
        assert_eq!(level.mask.to_string(), "-##\n###");
        assert_eq!((level.target_score, level.moves), (1500, 12));
    }

    #[test]
    fn rejects_unknown_tiles_and_shapes() {
        let file = LevelFile {
            tiles: vec![vec![1, 2]],
            target_score: 100,
            moves: 5,
        };
        assert!(matches!(
            file.to_level(),
            Err(LevelFileError::InvalidTile {
                line: 0,
                column: 1,
                value: 2
            })
        ));

        let ragged = LevelFile {
            tiles: vec![vec![1, 1], vec![1]],
            ..file
        };
        assert!(matches!(
            ragged.to_level(),
            Err(LevelFileError::Config(ConfigError::RaggedMask { .. }))
        ));

        assert!(matches!(
            LevelFile::from_json(r#"{ "tiles": [[1]] }"#),
            Err(LevelFileError::Json(_))
        ));
    }

    #[test]
    fn bundled_levels_are_found_and_valid() {
        for name in ["level_1", "level_2", "level_3"] {
            let level = load_level(name, None).unwrap();
            assert!(level.moves > 0);
            assert!(level.mask.playable_count() > 0);
        }
        assert!(matches!(
            load_level("no_such_level", None),
            Err(LevelFileError::Io(_))
        ));
    }
}
