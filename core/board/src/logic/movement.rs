//! 走法驗證
//!
//! 純函式：(候選走法, 棋盤, 歷史, 走子方規則) → 合法 / 不合法 + 原因。
//! 每個棋種先查覆寫，再退回古典規則。結構正確的輸入永遠不會 panic。

use crate::alias::Coord;
use crate::component::{Color, Move, Piece, PieceType, Position};
use crate::logic::board::Board;
use crate::logic::rule_context::MoveRules;
use thiserror::Error as ThisError;

/// 不合法走法的原因，`Display` 即為給玩家看的說明
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum IllegalMove {
    #[error("position ({x}, {y}) is off the board")]
    OffBoard { x: Coord, y: Coord },
    #[error("no piece at ({x}, {y})")]
    NoPieceAtOrigin { x: Coord, y: Coord },
    #[error("a move must change squares")]
    NoDisplacement,
    #[error("destination ({x}, {y}) holds an own piece")]
    OwnPieceAtDestination { x: Coord, y: Coord },
    #[error("{piece_type} cannot move that way")]
    BadShape { piece_type: PieceType },
    #[error("{piece_type} must stay inside the palace")]
    LeavesPalace { piece_type: PieceType },
    #[error("{piece_type} cannot cross the river")]
    CrossesRiver { piece_type: PieceType },
    #[error("elephant is blocked at its heart ({x}, {y})")]
    HeartBlocked { x: Coord, y: Coord },
    #[error("horse leg is blocked at ({x}, {y})")]
    LegBlocked { x: Coord, y: Coord },
    #[error("horse cannot make consecutive jumps")]
    ConsecutiveJump,
    #[error("{piece_type} path is blocked")]
    PathBlocked { piece_type: PieceType },
    #[error("cannon needs exactly one screen to capture, found {found}")]
    CannonScreen { found: usize },
    #[error("pawn cannot move backward")]
    PawnBackward,
    #[error("pawn cannot move sideways before crossing the river")]
    PawnSidewaysBeforeRiver,
    #[error("pawn cannot cross the river in a single move")]
    PawnCrossRiverDirectly,
    #[error("pawn cannot move two steps after crossing the river")]
    PawnTwoSteps,
}

/// 驗證 `from` → `to`，成功時回傳走動的棋子
pub fn validate_move(
    board: &Board,
    history: &[Move],
    from: Position,
    to: Position,
    rules: &MoveRules,
) -> Result<Piece, IllegalMove> {
    for pos in [from, to] {
        if !pos.is_on_board() {
            return Err(IllegalMove::OffBoard { x: pos.x, y: pos.y });
        }
    }
    if from == to {
        return Err(IllegalMove::NoDisplacement);
    }
    let piece = *board.get_piece(from).ok_or(IllegalMove::NoPieceAtOrigin {
        x: from.x,
        y: from.y,
    })?;
    if let Some(target) = board.get_piece(to) {
        if target.color == piece.color {
            return Err(IllegalMove::OwnPieceAtDestination { x: to.x, y: to.y });
        }
    }

    match piece.piece_type {
        PieceType::King => validate_king(&piece, to, rules),
        PieceType::Advisor => validate_advisor(&piece, to, rules),
        PieceType::Elephant => validate_elephant(board, &piece, to, rules),
        PieceType::Horse => validate_horse(board, history, &piece, to, rules),
        PieceType::Chariot => validate_chariot(board, &piece, to),
        PieceType::Cannon => validate_cannon(board, &piece, to),
        PieceType::Pawn => validate_pawn(board, &piece, to, rules),
    }?;
    Ok(piece)
}

fn delta(from: Position, to: Position) -> (Coord, Coord) {
    (to.x - from.x, to.y - from.y)
}

fn validate_king(piece: &Piece, to: Position, rules: &MoveRules) -> Result<(), IllegalMove> {
    let (dx, dy) = delta(piece.position, to);
    if dx.abs() + dy.abs() != 1 {
        return Err(IllegalMove::BadShape {
            piece_type: PieceType::King,
        });
    }
    if !rules.king().can_leave_palace && !Board::is_in_palace(to, piece.color) {
        return Err(IllegalMove::LeavesPalace {
            piece_type: PieceType::King,
        });
    }
    Ok(())
}

fn validate_advisor(piece: &Piece, to: Position, rules: &MoveRules) -> Result<(), IllegalMove> {
    let (dx, dy) = delta(piece.position, to);
    if dx.abs() != 1 || dy.abs() != 1 {
        return Err(IllegalMove::BadShape {
            piece_type: PieceType::Advisor,
        });
    }
    let advisor = rules.advisor();
    if !advisor.can_leave_palace {
        if !Board::is_in_palace(to, piece.color) {
            return Err(IllegalMove::LeavesPalace {
                piece_type: PieceType::Advisor,
            });
        }
    } else if !advisor.can_cross_river && Board::has_river_crossed(to, piece.color) {
        return Err(IllegalMove::CrossesRiver {
            piece_type: PieceType::Advisor,
        });
    }
    Ok(())
}

fn validate_elephant(
    board: &Board,
    piece: &Piece,
    to: Position,
    rules: &MoveRules,
) -> Result<(), IllegalMove> {
    let (dx, dy) = delta(piece.position, to);
    if dx.abs() != 2 || dy.abs() != 2 {
        return Err(IllegalMove::BadShape {
            piece_type: PieceType::Elephant,
        });
    }
    let elephant = rules.elephant();
    let heart = piece.position.offset(dx / 2, dy / 2);
    if !elephant.ignore_heart_block && board.get_piece(heart).is_some() {
        return Err(IllegalMove::HeartBlocked {
            x: heart.x,
            y: heart.y,
        });
    }
    if !elephant.can_cross_river && Board::has_river_crossed(to, piece.color) {
        return Err(IllegalMove::CrossesRiver {
            piece_type: PieceType::Elephant,
        });
    }
    Ok(())
}

fn validate_horse(
    board: &Board,
    history: &[Move],
    piece: &Piece,
    to: Position,
    rules: &MoveRules,
) -> Result<(), IllegalMove> {
    let (dx, dy) = delta(piece.position, to);
    let leg = match (dx.abs(), dy.abs()) {
        (2, 1) => piece.position.offset(dx / 2, 0),
        (1, 2) => piece.position.offset(0, dy / 2),
        _ => {
            return Err(IllegalMove::BadShape {
                piece_type: PieceType::Horse,
            });
        }
    };
    let horse = rules.horse();
    if !horse.ignore_leg_block && board.get_piece(leg).is_some() {
        return Err(IllegalMove::LegBlocked { x: leg.x, y: leg.y });
    }
    if horse.limit_consecutive_jumps {
        // 只看走子方自己最近一手
        let last_own = history.iter().rev().find(|m| m.piece.color == piece.color);
        if let Some(last) = last_own {
            if last.piece.id == piece.id && last.is_l_shape() {
                return Err(IllegalMove::ConsecutiveJump);
            }
        }
    }
    Ok(())
}

fn validate_chariot(board: &Board, piece: &Piece, to: Position) -> Result<(), IllegalMove> {
    if !Board::same_line(piece.position, to) {
        return Err(IllegalMove::BadShape {
            piece_type: PieceType::Chariot,
        });
    }
    if board.is_path_blocked(piece.position, to) {
        return Err(IllegalMove::PathBlocked {
            piece_type: PieceType::Chariot,
        });
    }
    Ok(())
}

fn validate_cannon(board: &Board, piece: &Piece, to: Position) -> Result<(), IllegalMove> {
    let Some(between) = board.count_between(piece.position, to) else {
        return Err(IllegalMove::BadShape {
            piece_type: PieceType::Cannon,
        });
    };
    match board.get_piece(to) {
        // 吃子需要恰好一個炮架
        Some(_) if between != 1 => Err(IllegalMove::CannonScreen { found: between }),
        Some(_) => Ok(()),
        None if between > 0 => Err(IllegalMove::PathBlocked {
            piece_type: PieceType::Cannon,
        }),
        None => Ok(()),
    }
}

fn validate_pawn(
    board: &Board,
    piece: &Piece,
    to: Position,
    rules: &MoveRules,
) -> Result<(), IllegalMove> {
    let from = piece.position;
    let color = piece.color;
    let forward = color.forward();
    let (dx, dy) = delta(from, to);
    // 以走子方視角的前進量
    let progress = dy * forward;
    let lateral = dx.abs();
    let pawn = rules.pawn();
    let bad_shape = IllegalMove::BadShape {
        piece_type: PieceType::Pawn,
    };

    if progress < 0 {
        return Err(IllegalMove::PawnBackward);
    }

    if !Board::has_river_crossed(from, color) {
        return match (lateral, progress) {
            (0, 1) => Ok(()),
            (0, 2)
                if Board::has_river_crossed(to, color)
                    && !Board::has_river_crossed(from.offset(0, forward), color) =>
            {
                if pawn.can_cross_river_directly {
                    Ok(())
                } else {
                    Err(IllegalMove::PawnCrossRiverDirectly)
                }
            }
            (_, 0) => Err(IllegalMove::PawnSidewaysBeforeRiver),
            _ => Err(bad_shape),
        };
    }

    match (lateral, progress) {
        (1, 0) | (0, 1) => Ok(()),
        // 兩步：橫二，或橫一加進一；淨前進最多一格
        (2, 0) | (1, 1) => {
            if !pawn.can_move_two_steps_after_river {
                return Err(IllegalMove::PawnTwoSteps);
            }
            let via: Vec<Position> = if progress == 0 {
                vec![from.offset(dx / 2, 0)]
            } else {
                vec![from.offset(dx, 0), from.offset(0, forward)]
            };
            if via.iter().any(|p| board.get_piece(*p).is_none()) {
                Ok(())
            } else {
                Err(IllegalMove::PathBlocked {
                    piece_type: PieceType::Pawn,
                })
            }
        }
        _ => Err(bad_shape),
    }
}

/// `color` 的將帥是否正被敵方任一棋子攻擊
pub fn is_in_check(board: &Board, color: Color, attacker_rules: &MoveRules) -> bool {
    let Some(king) = board.find_king(color) else {
        return false;
    };
    let target = king.position;
    board
        .pieces_of(color.opponent())
        .any(|p| validate_move(board, &[], p.position, target, attacker_rules).is_ok())
}

/// 窮舉 `from` 上棋子的所有合法落點
pub fn legal_destinations(
    board: &Board,
    history: &[Move],
    from: Position,
    rules: &MoveRules,
) -> Vec<Position> {
    (0..crate::constants::BOARD_HEIGHT)
        .flat_map(|y| (0..crate::constants::BOARD_WIDTH).map(move |x| Position::new(x, y)))
        .filter(|to| validate_move(board, history, from, *to, rules).is_ok())
        .collect()
}
