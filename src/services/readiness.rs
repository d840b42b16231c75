// 一次性就绪监听器
//
// 监听文档结构变化，条件首次满足时执行回调，然后不再响应（Watching → Fired）

use crate::dom::{Document, Mutation};

/// 监听器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Watching,
    Fired,
}

type Predicate = Box<dyn Fn(&Document) -> bool + Send + Sync>;
type Callback = Box<dyn FnOnce(&mut Document) + Send + Sync>;

/// 一次性就绪监听器
pub struct ReadinessWatcher {
    state: WatcherState,
    predicate: Predicate,
    callback: Option<Callback>,
}

impl ReadinessWatcher {
    pub fn new<P, C>(predicate: P, callback: C) -> Self
    where
        P: Fn(&Document) -> bool + Send + Sync + 'static,
        C: FnOnce(&mut Document) + Send + Sync + 'static,
    {
        Self {
            state: WatcherState::Watching,
            predicate: Box::new(predicate),
            callback: Some(Box::new(callback)),
        }
    }

    /// 等待指定选择器出现
    pub fn for_selector<C>(selector: &'static str, callback: C) -> Self
    where
        C: FnOnce(&mut Document) + Send + Sync + 'static,
    {
        Self::new(move |doc: &Document| doc.query_selector(selector).is_some(), callback)
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// 处理文档的新变更
    ///
    /// 只有新增子元素时才检查条件；返回本次是否触发了回调
    pub fn notify(&mut self, doc: &mut Document) -> bool {
        let mutations = doc.take_mutations();
        if self.state == WatcherState::Fired {
            return false;
        }

        let structure_grew = mutations
            .iter()
            .any(|m| matches!(m, Mutation::ChildAdded { .. }));
        if !structure_grew || !(self.predicate)(doc) {
            return false;
        }

        self.state = WatcherState::Fired;
        if let Some(callback) = self.callback.take() {
            callback(doc);
        }
        // 回调产生的变更不再需要观察
        doc.take_mutations();
        true
    }
}
