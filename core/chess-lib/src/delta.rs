//! delta.rs：技能回傳的狀態變更，由引擎在工作副本上整批套用
use crate::*;
use board::RuleOverride;
use board::alias::PieceId;
use board::component::{Color, Piece, PieceType, Position};
use serde::{Deserialize, Serialize};
use skills_lib::SkillID;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "change")]
pub enum StateChange {
    /// 生出新棋子（發新 ID）
    Spawn {
        color: Color,
        piece_type: PieceType,
        at: Position,
    },
    /// 陣亡棋子回到棋盤
    Revive { piece_id: PieceId, at: Position },
    /// 存活棋子直接搬到別格
    Relocate { piece_id: PieceId, to: Position },
    Swap { a: PieceId, b: PieceId },
    /// 移除某格棋子（陣亡），空格為 no-op
    Remove { at: Position },
    /// 可為負；扣到負數則整批失敗
    AddMarkers { color: Color, amount: i32 },
    EnableRule { color: Color, rule: RuleOverride },
    SetCurrentPlayer { color: Color },
    Awaken { owner: Color, skill_id: SkillID },
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    pub changes: Vec<StateChange>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn push(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }
}

impl FromIterator<StateChange> for StateDelta {
    fn from_iter<I: IntoIterator<Item = StateChange>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

/// 套用後留給引擎處理的副作用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaEffects {
    /// 被吃或被覆蓋而陣亡的棋子
    pub removed: Vec<Piece>,
    /// 待覺醒的技能
    pub awaken: Vec<SkillKey>,
}

/// 整批套用；任何一步失敗時 `state` 完全不變
pub fn apply_delta(
    state: &mut GameState,
    delta: &StateDelta,
    policy: OccupancyPolicy,
) -> Result<DeltaEffects, Error> {
    let func = "apply_delta";

    let mut effects = DeltaEffects::default();
    if delta.is_empty() {
        return Ok(effects);
    }
    let mut work = state.clone();
    for change in &delta.changes {
        apply_change(&mut work, change, policy, &mut effects).map_err(|e| e.wrap(func))?;
    }
    work.sync_pieces();
    *state = work;
    Ok(effects)
}

fn apply_change(
    work: &mut GameState,
    change: &StateChange,
    policy: OccupancyPolicy,
    effects: &mut DeltaEffects,
) -> Result<(), Error> {
    let func = "apply_change";

    match change {
        StateChange::Spawn {
            color,
            piece_type,
            at,
        } => {
            let id = work.id_generator().mint();
            let piece = Piece::new(id, *piece_type, *color, *at);
            place(work, piece, *at, policy, effects)?;
        }
        StateChange::Revive { piece_id, at } => {
            let piece = *work
                .find_piece(*piece_id)
                .ok_or(Error::PieceNotFound {
                    func,
                    piece_id: *piece_id,
                })?;
            if piece.is_alive || work.board.find_piece(*piece_id).is_some() {
                return Err(Error::InvalidSkillParams {
                    func,
                    message: format!("piece {} is still alive", piece_id),
                });
            }
            place(work, piece, *at, policy, effects)?;
        }
        StateChange::Relocate { piece_id, to } => {
            let piece = *alive_piece(work, *piece_id, func)?;
            place(work, piece, *to, policy, effects)?;
        }
        StateChange::Swap { a, b } => {
            let pa = *alive_piece(work, *a, func)?;
            let pb = *alive_piece(work, *b, func)?;
            work.board.remove_piece(pa.position);
            work.board.remove_piece(pb.position);
            work.board.set_piece(pb.position, Some(pa));
            work.board.set_piece(pa.position, Some(pb));
        }
        StateChange::Remove { at } => {
            if let Some(mut piece) = work.board.remove_piece(*at) {
                piece.is_alive = false;
                effects.removed.push(piece);
            }
        }
        StateChange::AddMarkers { color, amount } => {
            let have = work.markers_of(*color);
            let total = have + amount;
            if total < 0 {
                return Err(Error::NotEnoughMarkers {
                    func,
                    needed: -amount,
                    have,
                });
            }
            work.markers.insert(*color, total);
        }
        StateChange::EnableRule { color, rule } => {
            work.player_mut(*color).rules.enable(*rule);
        }
        StateChange::SetCurrentPlayer { color } => {
            work.current_player = *color;
        }
        StateChange::Awaken { owner, skill_id } => {
            effects.awaken.push(SkillKey::new(*owner, skill_id.clone()));
        }
    }
    Ok(())
}

fn alive_piece<'a>(
    work: &'a GameState,
    piece_id: PieceId,
    func: &'static str,
) -> Result<&'a Piece, Error> {
    work.board
        .find_piece(piece_id)
        .ok_or(Error::PieceNotFound { func, piece_id })
}

/// 放置棋子；回傳 false 表示依設定略過
fn place(
    work: &mut GameState,
    piece: Piece,
    at: Position,
    policy: OccupancyPolicy,
    effects: &mut DeltaEffects,
) -> Result<bool, Error> {
    let func = "place";

    if !at.is_on_board() {
        return Err(Error::OffBoard { func, pos: at });
    }
    if let Some(occupant) = work.board.get_piece(at).copied() {
        if occupant.id != piece.id {
            if occupant.color == piece.color {
                match policy {
                    OccupancyPolicy::Overwrite => {}
                    OccupancyPolicy::Skip => return Ok(false),
                    OccupancyPolicy::Reject => return Err(Error::OccupiedSquare { func, pos: at }),
                }
            }
            work.board.remove_piece(at);
            effects.removed.push(Piece {
                is_alive: false,
                ..occupant
            });
        }
    }
    work.board.set_piece(at, Some(piece));
    Ok(true)
}
