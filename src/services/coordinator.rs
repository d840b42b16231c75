// 协调器
//
// 把页面事件分发给身份状态、拉取器和视图：
// - 输入 UID → 更新 other
// - 修改日期 → 用缓存结果重新渲染，不重新拉取
// - 点击类型标签 → 拉取 other 的记录，缓存并渲染
//
// 页面文档和缓存结果放在同一把锁后面；拉取期间不持有锁，最后完成的一次拉取覆盖缓存。

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::dom::Document;
use crate::models::{
    GachaEnvelope, PullCategory, SharedIdentity, Uid, ViewerEvent, ViewerStateResponse,
    INACTIVE_UID,
};
use super::fetcher::HistoryFetcher;
use super::host_page;
use super::readiness::{ReadinessWatcher, WatcherState};
use super::view::{self, ViewController};

/// 页面状态
struct PageState {
    document: Document,
    watcher: ReadinessWatcher,
    cached: Option<GachaEnvelope>,
}

/// 协调器
#[derive(Clone)]
pub struct Coordinator {
    identity: SharedIdentity,
    fetcher: HistoryFetcher,
    view: ViewController,
    page: Arc<Mutex<PageState>>,
}

/// 解析 UID 输入：去掉首尾空白，空值为 0，无法解析时也为 0
pub fn parse_uid_input(value: &str) -> Uid {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return INACTIVE_UID;
    }
    match trimmed.parse::<Uid>() {
        Ok(uid) => uid,
        Err(e) => {
            tracing::warn!("Ignoring unparseable uid input {:?}: {}", trimmed, e);
            INACTIVE_UID
        }
    }
}

impl Coordinator {
    pub fn new(identity: SharedIdentity, fetcher: HistoryFetcher) -> Self {
        let view = ViewController::new();
        let watcher = ReadinessWatcher::for_selector(view::TABS_SELECTOR, move |doc| {
            view.inject_controls(doc);
        });

        Self {
            identity,
            fetcher,
            view,
            page: Arc::new(Mutex::new(PageState {
                document: Document::new(),
                watcher,
                cached: None,
            })),
        }
    }

    pub fn identity(&self) -> &SharedIdentity {
        &self.identity
    }

    /// 宿主页面就绪：挂载布局并通知就绪监听器
    pub async fn mount_host_layout(&self) -> bool {
        let mut page = self.page.lock().await;
        let PageState { document, watcher, .. } = &mut *page;

        host_page::mount_host_layout(document);
        let fired = watcher.notify(document);
        if fired {
            tracing::info!("Host page ready, controls injected");
        }
        fired
    }

    /// 处理一个页面事件
    pub async fn handle_event(&self, event: ViewerEvent) {
        match event {
            ViewerEvent::Input { target, value } => self.on_input(&target, &value).await,
            ViewerEvent::Change { target, value } => self.on_change(&target, &value).await,
            ViewerEvent::Click { label, target } => {
                let category = self.resolve_category(label.as_deref(), target.as_deref()).await;
                match category {
                    Some(category) => self.on_category_click(category).await,
                    None => tracing::debug!("Click does not match any headhunting category"),
                }
            }
        }
    }

    async fn on_input(&self, target: &str, value: &str) {
        {
            let mut page = self.page.lock().await;
            set_input_value(&mut page.document, target, value);
        }

        if target == view::UID_INPUT_ID {
            self.identity.set_other(parse_uid_input(value));
        }
    }

    async fn on_change(&self, target: &str, value: &str) {
        let mut page = self.page.lock().await;
        set_input_value(&mut page.document, target, value);

        if target != view::DATE_FROM_ID && target != view::DATE_TO_ID {
            return;
        }

        let PageState { document, watcher, cached } = &mut *page;
        if let Some(envelope) = cached.as_ref() {
            let range = self.view.current_date_range(document);
            self.view.render(document, Some(envelope), &range);
        }
        // 渲染产生的变更交给监听器消费，避免变更记录无限增长
        watcher.notify(document);
    }

    /// 从标签文字或被点击元素所在的 `button`/`li` 解析记录类型
    async fn resolve_category(&self, label: Option<&str>, target: Option<&str>) -> Option<PullCategory> {
        if let Some(category) = label.and_then(PullCategory::from_label) {
            return Some(category);
        }

        let target = target?;
        let page = self.page.lock().await;
        let doc = &page.document;
        let node = doc.get_element_by_id(target)?;
        let control = doc.closest(node, &["button", "li"])?;
        PullCategory::from_label(&doc.text_content(control))
    }

    async fn on_category_click(&self, category: PullCategory) {
        let uid = self.identity.other_uid();
        tracing::info!("{} selected for uid {}", category.label(), uid);

        // 拉取期间不持有页面锁
        let Some(envelope) = self.fetcher.fetch(category, uid).await else {
            return;
        };

        let mut page = self.page.lock().await;
        let PageState { document, watcher, cached } = &mut *page;
        let range = self.view.current_date_range(document);
        self.view.render(document, Some(&envelope), &range);
        watcher.notify(document);
        *cached = Some(envelope);
    }

    /// 当前状态快照
    pub async fn snapshot(&self) -> ViewerStateResponse {
        let identity = self.identity.snapshot();
        let page = self.page.lock().await;

        ViewerStateResponse {
            self_uid: identity.self_uid(),
            other_uid: identity.other_uid(),
            other_active: identity.is_other_active(),
            controls_injected: page.watcher.state() == WatcherState::Fired
                && self.view.has_controls(&page.document),
            cached_rows: page
                .cached
                .as_ref()
                .and_then(|e| e.history())
                .map(|h| h.rows.len()),
            count_label: self.view.count_text(&page.document),
            rows: self.view.rendered_rows(&page.document),
        }
    }

    /// 当前页面 HTML
    pub async fn render_html(&self) -> String {
        let page = self.page.lock().await;
        page.document.to_html()
    }
}

fn set_input_value(doc: &mut Document, target: &str, value: &str) {
    let Some(node) = doc.get_element_by_id(target) else {
        tracing::debug!("Input target not found: {}", target);
        return;
    };
    if let Some(el) = doc.get_mut(node) {
        el.set_attribute("value", value);
    }
}
