use std::collections::HashMap;

use crossterm::style::Color;

/// Terminal colour of each piece kind, by kind index.
///
/// Kinds missing from a palette are printed in the terminal's default colour.
pub type Palette = HashMap<u8, Color>;

pub fn monochrome_palette() -> Palette {
    HashMap::new()
}

pub fn color16_palette() -> Palette {
    const COLORS_COLOR16: [(u8, Color); 8] = [
        (0, Color::Red),
        (1, Color::Yellow),
        (2, Color::Green),
        (3, Color::Blue),
        (4, Color::Magenta),
        (5, Color::Cyan),
        (6, Color::White),
        (7, Color::DarkYellow),
    ];
    HashMap::from(COLORS_COLOR16)
}

pub fn fullcolor_palette() -> Palette {
    #[rustfmt::skip]
    const COLORS_DEFAULT: [(u8, Color); 8] = [
        (0, Color::Rgb{r:237,g: 41,b: 58}), // #ED293A
        (1, Color::Rgb{r:254,g:203,b:  1}), // #FECB01
        (2, Color::Rgb{r:105,g:190,b: 41}), // #69BE29
        (3, Color::Rgb{r:  0,g:101,b:190}), // #0065BE
        (4, Color::Rgb{r:149,g: 45,b:153}), // #952D99
        (5, Color::Rgb{r:  0,g:159,b:219}), // #009FDB
        (6, Color::Rgb{r:255,g:121,b:  1}), // #FF7901
        (7, Color::Rgb{r:235,g:235,b:235}), // #EBEBEB
    ];
    HashMap::from(COLORS_DEFAULT)
}

pub fn gruvbox_palette() -> Palette {
    #[rustfmt::skip]
    const COLORS_GRUVBOX: [(u8, Color); 8] = [
        (0, Color::Rgb{r:251,g: 73,b: 52}), // #FB4934
        (1, Color::Rgb{r:250,g:189,b: 47}), // #FABD2F
        (2, Color::Rgb{r:184,g:187,b: 38}), // #B8BB26
        (3, Color::Rgb{r:131,g:165,b:152}), // #83A598
        (4, Color::Rgb{r:211,g:134,b:155}), // #D3869B
        (5, Color::Rgb{r:142,g:192,b:124}), // #8EC07C
        (6, Color::Rgb{r:254,g:128,b: 25}), // #FE8019
        (7, Color::Rgb{r:235,g:219,b:178}), // #EBDBB2
    ];
    HashMap::from(COLORS_GRUVBOX)
}
