use serde::Serialize;
use std::sync::{Arc, RwLock};

/// 玩家 UID，0 表示“未激活”
pub type Uid = u64;

/// 未激活哨兵值
pub const INACTIVE_UID: Uid = 0;

/// 身份状态
///
/// - `self_uid`: 当前登录会话对应的 UID，从页面自身的请求中被动获取，只记录一次
/// - `other_uid`: 用户输入的 UID，可随时修改，清空输入后回到 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdentityState {
    self_uid: Uid,
    other_uid: Uid,
}

impl IdentityState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录 self UID，仅第一次（非 0）生效
    pub fn learn_self(&mut self, uid: Uid) {
        if self.self_uid != INACTIVE_UID || uid == INACTIVE_UID {
            return;
        }
        self.self_uid = uid;
        tracing::info!("Player uid learned: {}", uid);
    }

    /// 无条件替换 other UID（包括重置为 0）
    pub fn set_other(&mut self, uid: Uid) {
        self.other_uid = uid;
        tracing::info!("otherUid updated: {}", uid);
    }

    pub fn self_uid(&self) -> Uid {
        self.self_uid
    }

    pub fn other_uid(&self) -> Uid {
        self.other_uid
    }

    pub fn is_self_known(&self) -> bool {
        self.self_uid != INACTIVE_UID
    }

    /// other 非 0 且不等于 self 时视为激活
    pub fn is_other_active(&self) -> bool {
        self.is_valid_uid(self.other_uid)
    }

    /// 可以用来查询记录的 UID：非 0 且不是自己
    pub fn is_valid_uid(&self, uid: Uid) -> bool {
        uid != INACTIVE_UID && uid != self.self_uid
    }
}

/// 在拦截器、拉取器和协调器之间共享的身份状态句柄
#[derive(Debug, Clone, Default)]
pub struct SharedIdentity {
    inner: Arc<RwLock<IdentityState>>,
}

impl SharedIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取当前状态快照
    pub fn snapshot(&self) -> IdentityState {
        self.inner.read().map(|state| *state).unwrap_or_default()
    }

    pub fn learn_self(&self, uid: Uid) {
        if let Ok(mut state) = self.inner.write() {
            state.learn_self(uid);
        }
    }

    pub fn set_other(&self, uid: Uid) {
        if let Ok(mut state) = self.inner.write() {
            state.set_other(uid);
        }
    }

    pub fn is_self_known(&self) -> bool {
        self.snapshot().is_self_known()
    }

    pub fn is_other_active(&self) -> bool {
        self.snapshot().is_other_active()
    }

    pub fn is_valid_uid(&self, uid: Uid) -> bool {
        self.snapshot().is_valid_uid(uid)
    }

    pub fn other_uid(&self) -> Uid {
        self.snapshot().other_uid()
    }
}
