//! 棋盤與棋子位置一致性（隨機操作序列）

use board::component::{Color, Piece, PieceType, Position};
use board::logic::board::Board;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const TYPES: [PieceType; 7] = [
    PieceType::King,
    PieceType::Advisor,
    PieceType::Elephant,
    PieceType::Horse,
    PieceType::Chariot,
    PieceType::Cannon,
    PieceType::Pawn,
];

fn random_pos(rng: &mut StdRng) -> Position {
    // 偶爾給出棋盤外的位置
    Position::new(rng.random_range(-1..10), rng.random_range(-1..11))
}

fn assert_consistent(board: &Board) {
    let mut ids = HashSet::new();
    for y in 0..10 {
        for x in 0..9 {
            let pos = Position::new(x, y);
            if let Some(piece) = board.get_piece(pos) {
                assert_eq!(piece.position, pos);
                assert!(piece.is_alive);
                assert!(ids.insert(piece.id), "棋子 {} 出現在兩格", piece.id);
            }
        }
    }
}

#[test]
fn test_random_set_piece_sequences_stay_consistent() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut board = Board::empty();
        for _ in 0..300 {
            let pos = random_pos(&mut rng);
            match rng.random_range(0..4) {
                0 => board.set_piece(pos, None),
                1 => {
                    board.remove_piece(pos);
                }
                2 => {
                    let to = random_pos(&mut rng);
                    board.move_piece(pos, to);
                }
                _ => {
                    let id = rng.random_range(0..20);
                    let t = *TYPES.choose(&mut rng).unwrap();
                    let color = if rng.random_bool(0.5) {
                        Color::Red
                    } else {
                        Color::Black
                    };
                    // 故意給錯的位置，set_piece 要改寫
                    board.set_piece(pos, Some(Piece::new(id, t, color, Position::new(0, 0))));
                }
            }
            assert_consistent(&board);
        }
        assert!(board.get_all_pieces().len() <= 20);
    }
}

#[test]
fn test_serde_round_trip() {
    let mut ids = board::IdGenerator::default();
    let board = Board::standard(&mut ids);
    let json = serde_json::to_string(&board).unwrap();
    let back: Board = serde_json::from_str(&json).unwrap();
    assert_eq!(board, back);
}
