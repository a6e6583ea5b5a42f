//! 唯一 ID 產生邏輯

use crate::alias::PieceId;
use rand::random;
use std::collections::HashSet;

/// 從集合中產生唯一的隨機 ID
pub fn generate_unique_id(used_ids: &mut HashSet<PieceId>) -> PieceId {
    loop {
        let new_id: PieceId = random();
        if used_ids.insert(new_id) {
            return new_id;
        }
    }
}

/// 棋子 ID 產生器
///
/// 記住整局用過的每個 ID（含已死亡棋子），保證不會重複發放。
/// 反序列化後以 `from_used` 從玩家棋子列表重建。
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    used: HashSet<PieceId>,
}

impl IdGenerator {
    pub fn from_used<I: IntoIterator<Item = PieceId>>(ids: I) -> Self {
        Self {
            used: ids.into_iter().collect(),
        }
    }

    pub fn mint(&mut self) -> PieceId {
        generate_unique_id(&mut self.used)
    }

    /// 登記外部建立的 ID；已存在回傳 false
    pub fn reserve(&mut self, id: PieceId) -> bool {
        self.used.insert(id)
    }

    pub fn is_used(&self, id: PieceId) -> bool {
        self.used.contains(&id)
    }
}
