//! ASCII layout parsing for hand-authored test and demo maps.

use crate::error::{MapError, ParseError};
use crate::map::OpacityMask;

/// Alpha painted for wall cells.
pub const OPAQUE: u8 = 255;
/// Alpha painted for open cells.
pub const CLEAR: u8 = 0;

/// Parser for converting ASCII layouts into opacity masks.
pub struct LayoutParser;

impl LayoutParser {
    /// Parses a single character into the alpha it paints.
    pub fn parse_character(c: char) -> Result<u8, ParseError> {
        match c {
            '#' => Ok(OPAQUE),
            '.' | ' ' => Ok(CLEAR),
            _ => Err(ParseError::UnknownCharacter(c)),
        }
    }

    /// Parses a layout into a grid of cell alphas, row-major.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout is empty, has rows of differing width, or contains
    /// characters other than `#`, `.` and space.
    pub fn parse_cells<S: AsRef<str>>(rows: &[S]) -> Result<Vec<Vec<u8>>, ParseError> {
        let Some(first) = rows.first() else {
            return Err(ParseError::Empty);
        };
        let expected = first.as_ref().chars().count();
        if expected == 0 {
            return Err(ParseError::Empty);
        }

        rows.iter()
            .enumerate()
            .map(|(row, line)| {
                let cells = line
                    .as_ref()
                    .chars()
                    .map(Self::parse_character)
                    .collect::<Result<Vec<_>, _>>()?;
                if cells.len() != expected {
                    return Err(ParseError::RaggedRow {
                        row,
                        expected,
                        found: cells.len(),
                    });
                }
                Ok(cells)
            })
            .collect()
    }

    /// Rasterizes a layout with each cell covering `cell_size` square pixels.
    pub fn rasterize<S: AsRef<str>>(rows: &[S], cell_size: u32) -> Result<OpacityMask, LayoutError> {
        let cells = Self::parse_cells(rows)?;
        let columns = cells[0].len() as u32;
        let mut mask = OpacityMask::filled(columns * cell_size, cells.len() as u32 * cell_size, CLEAR)?;

        for (y, row) in cells.iter().enumerate() {
            for (x, &alpha) in row.iter().enumerate() {
                if alpha != CLEAR {
                    mask.fill_rect(x as u32 * cell_size, y as u32 * cell_size, cell_size, cell_size, alpha);
                }
            }
        }

        Ok(mask)
    }
}

/// Either half of a failed rasterization.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Map(#[from] MapError),
}

impl From<LayoutError> for crate::error::GameError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Parse(e) => e.into(),
            LayoutError::Map(e) => e.into(),
        }
    }
}
