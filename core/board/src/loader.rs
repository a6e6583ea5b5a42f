//! 棋盤載入器

use crate::alias::Coord;
use crate::component::{Color, Piece, PieceType, Position};
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::{Context, LoadError, Result};
use crate::logic::board::Board;
use crate::logic::id_generator::IdGenerator;
use std::collections::HashMap;

/// 從 ASCII 格式載入棋盤
///
/// ASCII 格式：10 行、每行 9 個以空格分隔的符號，第一行為 y = 0（黑方底線）
/// - `.` = 空格
/// - 單一棋子字母 = 棋子，紅方大寫、黑方小寫（K A E H R C P）
/// - 其他單一字母 = [`LoadError::InvalidSymbol`]
/// - 其他字串（`*`、`1` 等）= 標記位置（空格），相同的標記會全部收集成 Vec
///
/// 返回：(棋盤, 標記映射)
///
/// 例如：
/// ```text
/// . . . a k a . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . * . . . .
/// . . . . . . . . .
/// . . . . P . . . .
/// . . . . . . . . .
/// . . . . . . . . .
/// . . . . K . . . .
/// ```
pub fn load_from_ascii(ascii: &str) -> Result<(Board, HashMap<String, Vec<Position>>)> {
    let mut ids = IdGenerator::default();
    load_from_ascii_with(ascii, &mut ids)
}

/// 同 [`load_from_ascii`]，使用呼叫端的 ID 產生器
pub fn load_from_ascii_with(
    ascii: &str,
    ids: &mut IdGenerator,
) -> Result<(Board, HashMap<String, Vec<Position>>)> {
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LoadError::ParseError("棋盤為空".to_string()).into());
    }
    if lines.len() != BOARD_HEIGHT as usize {
        return Err(LoadError::ParseError(format!(
            "棋盤必須是 {} 行，實際 {} 行",
            BOARD_HEIGHT,
            lines.len()
        ))
        .into());
    }

    let mut board = Board::empty();
    let mut markers: HashMap<String, Vec<Position>> = HashMap::new();

    for (y, line) in lines.iter().enumerate() {
        let cells: Vec<&str> = line.split_whitespace().collect();
        if cells.len() != BOARD_WIDTH as usize {
            return Err(LoadError::ParseError(format!(
                "第 {} 行必須是 {} 格，實際 {} 格",
                y,
                BOARD_WIDTH,
                cells.len()
            ))
            .into());
        }
        for (x, cell) in cells.into_iter().enumerate() {
            let pos = Position::new(x as Coord, y as Coord);
            match parse_cell(cell, pos).context(format!("解析第 {} 行", y))? {
                Cell::Empty => {}
                Cell::Piece(piece_type, color) => {
                    board.set_piece(pos, Some(Piece::new(ids.mint(), piece_type, color, pos)));
                }
                Cell::Marker => markers.entry(cell.to_string()).or_default().push(pos),
            }
        }
    }

    Ok((board, markers))
}

enum Cell {
    Empty,
    Piece(PieceType, Color),
    Marker,
}

fn parse_cell(cell: &str, pos: Position) -> Result<Cell> {
    if cell == "." {
        return Ok(Cell::Empty);
    }
    let mut chars = cell.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => match PieceType::from_symbol(c) {
            Some((piece_type, color)) => Ok(Cell::Piece(piece_type, color)),
            None => Err(LoadError::InvalidSymbol {
                symbol: cell.to_string(),
                x: pos.x,
                y: pos.y,
            }
            .into()),
        },
        // 非字母的符號記為標記
        _ => Ok(Cell::Marker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_round_trip_through_to_ascii() {
        let mut ids = IdGenerator::default();
        let board = Board::standard(&mut ids);
        let (loaded, markers) = load_from_ascii(&board.to_ascii()).unwrap();
        assert!(markers.is_empty());
        for piece in board.get_all_pieces() {
            let other = loaded.get_piece(piece.position).unwrap();
            assert_eq!(other.piece_type, piece.piece_type);
            assert_eq!(other.color, piece.color);
        }
    }

    #[test]
    fn test_markers_and_errors() {
        let ascii = r#"
. . . . k . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . * . . . .
. . . . . . . . .
. . . . P . . . .
. . . . . . . . .
. . . . . . . . .
. . . 1 K 1 . . .
        "#;
        let (board, markers) = load_from_ascii(ascii).unwrap();
        assert_eq!(markers["*"], vec![Position::new(4, 4)]);
        assert_eq!(markers["1"].len(), 2);
        assert_eq!(board.find_king(Color::Black).unwrap().position, Position::new(4, 0));
        assert!(board.get_piece(Position::new(3, 9)).is_none());

        assert!(load_from_ascii("").is_err());
        assert!(load_from_ascii(". . .\n. . .").is_err());
    }

    #[test]
    fn test_unknown_letter() {
        let ascii = r#"
. . . . k . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . . . . . .
. . x . . . . . .
. . . . . . . . .
. . . . . . . . .
. . . . K . . . .
        "#;
        let err = load_from_ascii(ascii).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Load(LoadError::InvalidSymbol { x: 2, y: 6, .. })
        ));
        assert_eq!(err.contexts().len(), 1);
        assert!(err.to_string().contains("解析第 6 行"));
    }
}
