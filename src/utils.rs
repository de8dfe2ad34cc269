use crate::engine::{Board, Position, Tile, TileLocation, TileValue, BOARD_SIZE};

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from row `y = 0`; the character index is the
/// column `x`. Missing rows and short rows are left empty.
///
/// Valid characters are the digits `0`-`9` (a tile of that value) and `.` (an empty cell).
/// Each tile gets the id `board-<x>-<y>`.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful.
/// * `Err(String)` if there are more than `BOARD_SIZE` rows, a row is longer than
///   `BOARD_SIZE`, or a character is not a digit or `.`.
///
/// # Examples
/// ```
/// use fives_engine::engine::Position;
/// use fives_engine::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["", ".12"]).unwrap();
/// assert_eq!(board.get(Position::new(1, 1)).map(|t| t.value.get()), Some(1));
/// assert_eq!(board.get(Position::new(2, 1)).map(|t| t.value.get()), Some(2));
/// assert!(board.get(Position::new(0, 0)).is_none());
///
/// assert!(board_from_str_array(&["R"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, String> {
    if s.len() > BOARD_SIZE as usize {
        return Err(format!(
            "Invalid number of rows. Expected at most {}, found {}",
            BOARD_SIZE,
            s.len()
        ));
    }

    let mut board = Board::new_empty();

    for (y, row_str) in s.iter().enumerate() {
        if row_str.chars().count() > BOARD_SIZE as usize {
            return Err(format!(
                "Row {} is too long. Expected at most {} characters, found {}",
                y,
                BOARD_SIZE,
                row_str.chars().count()
            ));
        }

        for (x, ch) in row_str.chars().enumerate() {
            if ch == '.' {
                continue;
            }
            let value = ch
                .to_digit(10)
                .and_then(|d| TileValue::new(d as u8))
                .ok_or_else(|| {
                    format!("Unrecognized character '{}' in row {} col {}", ch, y, x)
                })?;
            let pos = Position::new(x as i32, y as i32);
            let id = format!("board-{}-{}", x, y);
            board.place(pos, Tile::new(value, id, TileLocation::Board { position: pos }));
        }
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(&["0123456789", "..........9"]).unwrap();
        assert_eq!(board.len(), 11);
        assert_eq!(board.get(Position::new(9, 0)).map(|t| t.value.get()), Some(9));
        assert_eq!(
            board.get(Position::new(10, 1)).map(|t| t.unique_id.as_str()),
            Some("board-10-1")
        );
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["12X"]);
        assert!(result.unwrap_err().contains("Unrecognized character 'X'"));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let too_long_row = "1".repeat(BOARD_SIZE as usize + 1);
        let result = board_from_str_array(&[too_long_row.as_str()]);
        assert!(result.unwrap_err().contains("Row 0 is too long"));
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["."; BOARD_SIZE as usize + 1];
        let result = board_from_str_array(&rows);
        assert!(result.unwrap_err().contains("Invalid number of rows"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board = board_from_str_array(&[]).unwrap();
        assert!(board.is_empty());
    }
}
