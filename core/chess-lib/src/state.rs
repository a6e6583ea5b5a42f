//! state.rs：
//! - 一局棋的完整快照（GameState），可序列化整包送給客戶端。
//! - 棋盤是存活棋子的唯一權威；玩家棋子列表在每次變動後由棋盤重新同步，陣亡棋子保留在列表中。
//! - 不負責走法合法性（board crate）與技能分派（engine.rs）。
use board::alias::{PieceId, Timestamp};
use board::component::{Color, Move, Piece, PieceType, Position};
use board::{Board, IdGenerator, RuleContext};
use serde::{Deserialize, Serialize};
use skills_lib::{HeroID, SkillID, Turn};
use std::collections::BTreeMap;
use strum_macros::Display;
use thiserror::Error as ThisError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Hero {
    pub id: HeroID,
    pub name: String,
    pub skills: Vec<SkillID>,
    /// 是否已有覺醒技被喚醒
    pub awakened: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub color: Color,
    pub hero: Hero,
    pub pieces: Vec<Piece>,
    pub rules: RuleContext,
}

impl Player {
    pub fn new(id: impl Into<String>, color: Color, hero: Hero) -> Self {
        Self {
            id: id.into(),
            color,
            hero,
            pieces: Vec::new(),
            rules: RuleContext::new(),
        }
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    pub fn dead_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.is_alive)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum GamePhase {
    #[default]
    Playing,
    Finished {
        winner: Color,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    /// 只能走指定的棋子
    ForceMove,
    /// 多走幾步，部分兵種禁用
    ExtraMove,
}

/// 技能造成的回合限制，屬於當前玩家
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TurnState {
    pub phase: TurnPhase,
    pub remaining_moves: u32,
    pub required_piece_id: Option<PieceId>,
    #[serde(default)]
    pub banned_piece_types: Vec<PieceType>,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TurnRestriction {
    #[error("must move piece {piece_id}")]
    MustMovePiece { piece_id: PieceId },
    #[error("{piece_type} cannot move during the extra move")]
    BannedPieceType { piece_type: PieceType },
}

impl TurnState {
    pub fn force_move(piece_id: PieceId, moves: u32) -> Self {
        Self {
            phase: TurnPhase::ForceMove,
            remaining_moves: moves,
            required_piece_id: Some(piece_id),
            banned_piece_types: Vec::new(),
        }
    }

    pub fn extra_move(moves: u32, banned: &[PieceType]) -> Self {
        Self {
            phase: TurnPhase::ExtraMove,
            remaining_moves: moves,
            required_piece_id: None,
            banned_piece_types: banned.to_vec(),
        }
    }

    /// 走法檢查前先過回合限制
    pub fn check(&self, piece: &Piece) -> Result<(), TurnRestriction> {
        if let Some(piece_id) = self.required_piece_id {
            if piece.id != piece_id {
                return Err(TurnRestriction::MustMovePiece { piece_id });
            }
        }
        if self.banned_piece_types.contains(&piece.piece_type) {
            return Err(TurnRestriction::BannedPieceType {
                piece_type: piece.piece_type,
            });
        }
        Ok(())
    }
}

/// 客戶端送來的走法
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Position,
    pub to: Position,
    /// 客戶端以為要走的棋子，與棋盤不符時拒絕
    #[serde(default)]
    pub piece_id: Option<PieceId>,
    /// 客戶端以為會吃掉的棋子
    #[serde(default)]
    pub captured_piece_id: Option<PieceId>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl MoveRequest {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            piece_id: None,
            captured_piece_id: None,
            timestamp: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    /// 以 `Color::index()` 取用
    pub players: [Player; 2],
    pub current_player: Color,
    pub game_phase: GamePhase,
    pub move_history: Vec<Move>,
    pub turn_state: Option<TurnState>,
    pub markers: BTreeMap<Color, i32>,
    pub turn: Turn,
}

impl GameState {
    /// 紅方先行
    pub fn new(board: Board, red: Player, black: Player) -> Self {
        let mut state = Self {
            board,
            players: [red, black],
            current_player: Color::Red,
            game_phase: GamePhase::Playing,
            move_history: Vec::new(),
            turn_state: None,
            markers: BTreeMap::new(),
            turn: 0,
        };
        state.sync_pieces();
        state
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color.index()]
    }

    pub fn player_mut(&mut self, color: Color) -> &mut Player {
        &mut self.players[color.index()]
    }

    pub fn markers_of(&self, color: Color) -> i32 {
        self.markers.get(&color).copied().unwrap_or(0)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.game_phase, GamePhase::Finished { .. })
    }

    /// 任一方的棋子（含陣亡）
    pub fn find_piece(&self, id: PieceId) -> Option<&Piece> {
        self.players.iter().find_map(|p| p.piece(id))
    }

    /// 以整局出現過的所有 ID 重建產生器，反序列化後也能安全發新 ID
    pub fn id_generator(&self) -> IdGenerator {
        let listed = self.players.iter().flat_map(|p| p.pieces.iter().map(|x| x.id));
        let on_board = self.board.get_all_pieces().into_iter().map(|x| x.id);
        IdGenerator::from_used(listed.chain(on_board))
    }

    /// 以棋盤為準同步兩方棋子列表
    pub fn sync_pieces(&mut self) {
        let on_board = self.board.get_all_pieces();
        for player in self.players.iter_mut() {
            for piece in player.pieces.iter_mut() {
                match on_board.iter().find(|p| p.id == piece.id) {
                    Some(current) => *piece = *current,
                    None => piece.is_alive = false,
                }
            }
            for piece in on_board.iter().filter(|p| p.color == player.color) {
                if player.piece(piece.id).is_none() {
                    player.pieces.push(*piece);
                }
            }
        }
    }

    /// 將帥被吃則結束對局，回傳勝方
    pub fn refresh_phase(&mut self) -> Option<Color> {
        if let GamePhase::Finished { winner } = self.game_phase {
            return Some(winner);
        }
        let winner = if self.board.find_king(Color::Red).is_none() {
            Color::Black
        } else if self.board.find_king(Color::Black).is_none() {
            Color::Red
        } else {
            return None;
        };
        self.game_phase = GamePhase::Finished { winner };
        self.turn_state = None;
        Some(winner)
    }
}
