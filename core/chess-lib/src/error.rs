//! 對局核心錯誤型別，攜帶 function name，支援來源錯誤巢狀
use crate::*;
use board::IllegalMove;
use board::alias::PieceId;
use board::component::{Color, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// 對局核心錯誤型別
#[derive(Debug, Error)]
pub enum Error {
    #[error("`{func}`: 非法走法: {reason}")]
    IllegalMove {
        func: &'static str,
        reason: IllegalMove,
    },

    #[error("`{func}`: 回合限制: {reason}")]
    TurnRestricted {
        func: &'static str,
        reason: TurnRestriction,
    },

    #[error("`{func}`: 現在輪到 {expected}，不是 {actual}")]
    NotYourTurn {
        func: &'static str,
        expected: Color,
        actual: Color,
    },

    #[error("`{func}`: 棋子 {piece_id} 屬於 {owner}，不屬於 {color}")]
    NotYourPiece {
        func: &'static str,
        piece_id: PieceId,
        owner: Color,
        color: Color,
    },

    #[error("`{func}`: 位置 {pos:?} 無棋子")]
    NoPieceAtPos { func: &'static str, pos: Position },

    #[error("`{func}`: 宣告的棋子 {declared} 與棋盤上的 {actual} 不符")]
    PieceMismatch {
        func: &'static str,
        declared: PieceId,
        actual: PieceId,
    },

    #[error("`{func}`: 宣告吃子 {declared:?} 與棋盤上的 {actual:?} 不符")]
    CaptureMismatch {
        func: &'static str,
        declared: Option<PieceId>,
        actual: Option<PieceId>,
    },

    #[error("`{func}`: 對局已結束")]
    GameFinished { func: &'static str },

    #[error("`{func}`: 技能 {key} 不存在")]
    SkillNotFound { func: &'static str, key: String },

    #[error("`{func}`: 技能 {key} 無法使用: {reason}")]
    SkillUnavailable {
        func: &'static str,
        key: String,
        reason: String,
    },

    #[error("`{func}`: 技能 {key} 失敗: {message}")]
    SkillFailed {
        func: &'static str,
        key: String,
        message: String,
    },

    #[error("`{func}`: 技能參數錯誤: {message}")]
    InvalidSkillParams { func: &'static str, message: String },

    #[error("`{func}`: 位置 {pos:?} 已有友方棋子")]
    OccupiedSquare { func: &'static str, pos: Position },

    #[error("`{func}`: 位置 {pos:?} 不在棋盤上")]
    OffBoard { func: &'static str, pos: Position },

    #[error("`{func}`: 找不到棋子 {piece_id}")]
    PieceNotFound { func: &'static str, piece_id: PieceId },

    #[error("`{func}`: 標記不足，需要 {needed}，只有 {have}")]
    NotEnoughMarkers {
        func: &'static str,
        needed: i32,
        have: i32,
    },

    #[error("`{func}`: 英雄 {hero_id} 不存在")]
    HeroNotFound { func: &'static str, hero_id: String },

    #[error("`{func}`: 載入失敗: {source}")]
    Load {
        func: &'static str,
        #[source]
        source: board::error::Error,
    },

    #[error("`{func}`: 包裝: {source}")]
    Wrap {
        func: &'static str,
        #[source]
        source: Box<Error>,
    },
}

/// 給房間層用的穩定錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    IllegalMove,
    TurnRestricted,
    NotYourTurn,
    NotYourPiece,
    NoPieceAtPos,
    PieceMismatch,
    CaptureMismatch,
    GameFinished,
    SkillNotFound,
    SkillUnavailable,
    SkillFailed,
    InvalidSkillParams,
    OccupiedSquare,
    OffBoard,
    PieceNotFound,
    NotEnoughMarkers,
    HeroNotFound,
    Load,
}

/// 序列化後送往客戶端的錯誤報告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub context: BTreeMap<String, String>,
}

impl Error {
    /// 包上一層呼叫端的 function name
    pub fn wrap(self, func: &'static str) -> Self {
        Error::Wrap {
            func,
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match root_error(self) {
            Error::IllegalMove { .. } => ErrorKind::IllegalMove,
            Error::TurnRestricted { .. } => ErrorKind::TurnRestricted,
            Error::NotYourTurn { .. } => ErrorKind::NotYourTurn,
            Error::NotYourPiece { .. } => ErrorKind::NotYourPiece,
            Error::NoPieceAtPos { .. } => ErrorKind::NoPieceAtPos,
            Error::PieceMismatch { .. } => ErrorKind::PieceMismatch,
            Error::CaptureMismatch { .. } => ErrorKind::CaptureMismatch,
            Error::GameFinished { .. } => ErrorKind::GameFinished,
            Error::SkillNotFound { .. } => ErrorKind::SkillNotFound,
            Error::SkillUnavailable { .. } => ErrorKind::SkillUnavailable,
            Error::SkillFailed { .. } => ErrorKind::SkillFailed,
            Error::InvalidSkillParams { .. } => ErrorKind::InvalidSkillParams,
            Error::OccupiedSquare { .. } => ErrorKind::OccupiedSquare,
            Error::OffBoard { .. } => ErrorKind::OffBoard,
            Error::PieceNotFound { .. } => ErrorKind::PieceNotFound,
            Error::NotEnoughMarkers { .. } => ErrorKind::NotEnoughMarkers,
            Error::HeroNotFound { .. } => ErrorKind::HeroNotFound,
            Error::Load { .. } => ErrorKind::Load,
            // root_error 不會停在 Wrap
            Error::Wrap { .. } => ErrorKind::Load,
        }
    }

    /// 產生錯誤報告；訊息取最內層錯誤，避免把整串 func 路徑送給玩家
    pub fn report<I, K, V>(&self, context: I) -> ErrorReport
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ErrorReport {
            kind: self.kind(),
            message: root_error(self).to_string(),
            context: context
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

pub fn root_error(err: &Error) -> &Error {
    let mut err = err;
    while let Error::Wrap { source, .. } = err {
        err = source.as_ref();
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_root_error() {
        let err = Error::GameFinished { func: "inner" }
            .wrap("middle")
            .wrap("outer");
        assert!(matches!(root_error(&err), Error::GameFinished { .. }));
        assert_eq!(err.kind(), ErrorKind::GameFinished);
        let text = err.to_string();
        assert!(text.starts_with("`outer`"));
        assert!(text.contains("對局已結束"));
    }

    #[test]
    fn test_report() {
        let err = Error::NoPieceAtPos {
            func: "GameManager::execute_move",
            pos: Position::new(1, 2),
        }
        .wrap("room");
        let report = err.report([("room_id", "r1")]);
        assert_eq!(report.kind, ErrorKind::NoPieceAtPos);
        assert_eq!(report.kind.to_string(), "no_piece_at_pos");
        assert!(report.message.contains("GameManager::execute_move"));
        assert_eq!(report.context["room_id"], "r1");
    }
}
