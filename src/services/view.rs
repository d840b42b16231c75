// 视图控制器
//
// 负责：
// - 在宿主页面的标签栏中注入 UID 输入框、日期选择器和计数标签（只注入一次）
// - 把寻访记录按日期过滤后渲染为行
//
// 不访问网络，也不持有身份或缓存状态，只是数据的投影。

use crate::dom::{Document, NodeId};
use crate::models::{DateRange, GachaEnvelope, PullRecord, RenderedRow};

pub const TABS_SELECTOR: &str = ".tabs";
pub const GACHA_ROOT_SELECTOR: &str = ".gacha";
pub const EMPTY_STATE_SELECTOR: &str = ".content-empty";
pub const ROW_SELECTOR: &str = ".tr";

pub const UID_WRAPPER_ID: &str = "uid-wrapper";
pub const UID_INPUT_ID: &str = "uid-input";
pub const DATE_FROM_ID: &str = "date-from";
pub const DATE_TO_ID: &str = "date-to";
pub const GACHA_COUNT_ID: &str = "gacha-count";

const CELL_STYLE: [(&str, &str); 4] = [
    ("flex", "1"),
    ("padding", ".2857142857rem .1714285714rem"),
    ("font-size", ".2571428571rem"),
    ("line-height", ".3428571429rem"),
];

/// 计数标签文字
pub fn count_label(filtered: usize, total: u64) -> String {
    if filtered as u64 == total {
        format!("Gacha time: {}", total)
    } else {
        format!("Gacha time: {}/{}", filtered, total)
    }
}

/// 视图控制器
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewController;

impl ViewController {
    pub fn new() -> Self {
        Self
    }

    /// 控件是否已注入
    pub fn has_controls(&self, doc: &Document) -> bool {
        doc.get_element_by_id(UID_INPUT_ID).is_some()
    }

    /// 在标签栏中注入输入控件
    ///
    /// 已存在时不做任何事；标签栏尚未出现时返回 false
    pub fn inject_controls(&self, doc: &mut Document) -> bool {
        if self.has_controls(doc) {
            return true;
        }

        let Some(tabs) = doc.query_selector(TABS_SELECTOR) else {
            tracing::debug!("Tab bar not ready, skipping control injection");
            return false;
        };

        if let Some(el) = doc.get_mut(tabs) {
            el.set_style("display", "flex");
            el.set_style("align-items", "center");
        }

        let wrapper = self.create_uid_wrapper(doc);
        doc.append_child(tabs, wrapper);

        tracing::info!("UID input added");
        true
    }

    fn create_uid_wrapper(&self, doc: &mut Document) -> NodeId {
        let wrapper = element(doc, "div", Some(UID_WRAPPER_ID), &[], &[
            ("display", "flex"),
            ("align-items", "center"),
            ("gap", "0.15rem"),
            ("border", "2px solid"),
            ("border-radius", "6px"),
            ("padding", "0.1rem 0.2rem"),
            ("margin-bottom", "0.2rem"),
        ]);

        let uid_input = input(doc, UID_INPUT_ID, "text", "Enter UID", "1.8rem", "0.24rem");
        let date_from = input(doc, DATE_FROM_ID, "date", "From", "1.5rem", "0.22rem");
        let separator = element(doc, "span", None, &[], &[("font-size", "0.22rem"), ("color", "#666")]);
        set_text(doc, separator, "~");
        let date_to = input(doc, DATE_TO_ID, "date", "To", "1.5rem", "0.22rem");
        let count = element(doc, "span", Some(GACHA_COUNT_ID), &[], &[
            ("font-size", "0.24rem"),
            ("white-space", "nowrap"),
            ("color", "#333"),
            ("font-weight", "500"),
        ]);
        set_text(doc, count, &count_label(0, 0));

        for child in [uid_input, date_from, separator, date_to, count] {
            doc.append_child(wrapper, child);
        }
        wrapper
    }

    /// 读取日期选择器当前的范围，空值表示不限
    pub fn current_date_range(&self, doc: &Document) -> DateRange {
        let value_of = |id: &str| {
            doc.get_element_by_id(id)
                .and_then(|node| doc.get(node))
                .map(|el| el.value().to_string())
        };
        let from = value_of(DATE_FROM_ID);
        let to = value_of(DATE_TO_ID);
        DateRange::new(from.as_deref(), to.as_deref())
    }

    /// 渲染寻访记录
    ///
    /// 响应无效或容器不存在时只记录日志；否则先清空旧的行和空状态，再按日期过滤后绘制。
    /// 返回绘制的行数。
    pub fn render(
        &self,
        doc: &mut Document,
        envelope: Option<&GachaEnvelope>,
        range: &DateRange,
    ) -> Option<usize> {
        let Some(history) = envelope.and_then(|e| e.history()) else {
            tracing::error!("Invalid gacha history response");
            return None;
        };

        let Some(gacha_root) = doc.query_selector(GACHA_ROOT_SELECTOR) else {
            tracing::error!("Gacha container not found");
            return None;
        };

        tracing::info!("Rendering gacha history: {} items", history.rows.len());

        self.clear(doc, gacha_root);

        let filtered = range.filter(&history.rows);
        for record in &filtered {
            let row = self.create_row(doc, record);
            doc.append_child(gacha_root, row);
        }

        self.update_count(doc, filtered.len(), history.count);
        Some(filtered.len())
    }

    /// 删除空状态占位和所有旧的行，释放它们占用的节点
    fn clear(&self, doc: &mut Document, gacha_root: NodeId) {
        for empty in doc.query_selector_within(gacha_root, EMPTY_STATE_SELECTOR) {
            doc.delete(empty);
        }
        for row in doc.query_selector_within(gacha_root, ROW_SELECTOR) {
            doc.delete(row);
        }
    }

    fn create_row(&self, doc: &mut Document, record: &PullRecord) -> NodeId {
        let row = element(doc, "div", None, &["tr"], &[
            ("display", "flex"),
            ("align-items", "center"),
            ("border-bottom", "1px dashed #e6e6e6"),
        ]);

        let pool = element(doc, "div", None, &["ellipsis"], &CELL_STYLE);
        set_text(doc, pool, &record.pool_name);

        let character = element(doc, "div", None, &["ellipsis"], &CELL_STYLE);
        if let Some(el) = doc.get_mut(character) {
            // 颜色放在最前面，与页面原有行保持一致
            el.style.insert(0, ("color".to_string(), record.color.clone()));
            el.text = record.char_name.clone();
        }

        let time = element(doc, "div", None, &["time"], &CELL_STYLE);
        if let Some(el) = doc.get_mut(time) {
            el.set_style("color", "rgba(0, 0, 0, .56)");
            el.text = record.at_str.clone();
        }

        for cell in [pool, character, time] {
            doc.append_child(row, cell);
        }
        row
    }

    fn update_count(&self, doc: &mut Document, filtered: usize, total: u64) {
        if let Some(node) = doc.get_element_by_id(GACHA_COUNT_ID) {
            set_text(doc, node, &count_label(filtered, total));
        }
    }

    /// 当前计数标签的文字
    pub fn count_text(&self, doc: &Document) -> Option<String> {
        doc.get_element_by_id(GACHA_COUNT_ID)
            .map(|node| doc.text_content(node).trim().to_string())
    }

    /// 读取当前页面上绘制的行
    pub fn rendered_rows(&self, doc: &Document) -> Vec<RenderedRow> {
        let Some(gacha_root) = doc.query_selector(GACHA_ROOT_SELECTOR) else {
            return Vec::new();
        };

        doc.query_selector_within(gacha_root, ROW_SELECTOR)
            .into_iter()
            .filter_map(|row| {
                let cells = doc.get(row)?.children().to_vec();
                let cell = |i: usize| cells.get(i).and_then(|id| doc.get(*id));
                let (pool, character, time) = (cell(0)?, cell(1)?, cell(2)?);
                Some(RenderedRow {
                    pool_name: pool.text.clone(),
                    char_name: character.text.clone(),
                    color: character.style_value("color").unwrap_or_default().to_string(),
                    at_str: time.text.clone(),
                })
            })
            .collect()
    }
}

fn element(
    doc: &mut Document,
    tag: &str,
    id: Option<&str>,
    classes: &[&str],
    style: &[(&str, &str)],
) -> NodeId {
    let node = doc.create_element(tag);
    if let Some(el) = doc.get_mut(node) {
        el.id = id.map(str::to_string);
        for class in classes {
            el.add_class(class);
        }
        for (property, value) in style {
            el.set_style(property, value);
        }
    }
    node
}

fn input(doc: &mut Document, id: &str, kind: &str, placeholder: &str, width: &str, font_size: &str) -> NodeId {
    let padding = if kind == "text" { "0.05rem 0.1rem" } else { "0.05rem" };
    let node = element(doc, "input", Some(id), &[], &[
        ("width", width),
        ("font-size", font_size),
        ("padding", padding),
        ("border", "1px solid #ccc"),
        ("border-radius", "4px"),
    ]);
    if let Some(el) = doc.get_mut(node) {
        el.set_attribute("type", kind);
        el.set_attribute("placeholder", placeholder);
    }
    node
}

fn set_text(doc: &mut Document, node: NodeId, text: &str) {
    if let Some(el) = doc.get_mut(node) {
        el.text = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryResult;
    use crate::services::host_page::mount_host_layout;

    fn record(pool: &str, name: &str, at: &str) -> PullRecord {
        PullRecord {
            pool_name: pool.to_string(),
            char_name: name.to_string(),
            color: "#ffb300".to_string(),
            at_str: at.to_string(),
        }
    }

    fn envelope(rows: Vec<PullRecord>, count: u64) -> GachaEnvelope {
        GachaEnvelope {
            code: 0,
            message: "ok".to_string(),
            data: Some(HistoryResult { rows, count }),
        }
    }

    fn ready_document() -> Document {
        let mut doc = Document::new();
        mount_host_layout(&mut doc);
        ViewController::new().inject_controls(&mut doc);
        doc
    }

    fn set_value(doc: &mut Document, id: &str, value: &str) {
        let node = doc.get_element_by_id(id).unwrap();
        doc.get_mut(node).unwrap().set_attribute("value", value);
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(7, 10), "Gacha time: 7/10");
        assert_eq!(count_label(10, 10), "Gacha time: 10");
        assert_eq!(count_label(0, 0), "Gacha time: 0");
    }

    #[test]
    fn test_inject_controls_is_idempotent() {
        let view = ViewController::new();
        let mut doc = Document::new();
        assert!(!view.inject_controls(&mut doc));

        mount_host_layout(&mut doc);
        assert!(view.inject_controls(&mut doc));
        assert!(view.inject_controls(&mut doc));

        assert_eq!(doc.query_selector_all(&format!("#{}", UID_WRAPPER_ID)).len(), 1);
        assert_eq!(view.count_text(&doc).as_deref(), Some("Gacha time: 0"));

        let tabs = doc.query_selector(TABS_SELECTOR).unwrap();
        assert_eq!(doc.get(tabs).unwrap().style_value("display"), Some("flex"));

        let uid = doc.get_element_by_id(UID_INPUT_ID).unwrap();
        assert_eq!(doc.get(uid).unwrap().attribute("placeholder"), Some("Enter UID"));
    }

    #[test]
    fn test_render_replaces_placeholder_and_rows() {
        let view = ViewController::new();
        let mut doc = ready_document();
        assert!(doc.query_selector(EMPTY_STATE_SELECTOR).is_some());

        let first = envelope(vec![record("A", "Texas", "2024-01-01 00:00:00")], 1);
        assert_eq!(view.render(&mut doc, Some(&first), &DateRange::unbounded()), Some(1));
        assert!(doc.query_selector(EMPTY_STATE_SELECTOR).is_none());

        let second = envelope(
            vec![
                record("B", "Exusiai", "2024-02-01 00:00:00"),
                record("B", "Amiya", "2024-02-02 00:00:00"),
            ],
            5,
        );
        view.render(&mut doc, Some(&second), &DateRange::unbounded());

        let rows = view.rendered_rows(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].char_name, "Exusiai");
        assert_eq!(rows[0].color, "#ffb300");
        assert_eq!(rows[1].at_str, "2024-02-02 00:00:00");
        assert_eq!(view.count_text(&doc).as_deref(), Some("Gacha time: 2/5"));
    }

    #[test]
    fn test_render_with_date_range() {
        let view = ViewController::new();
        let mut doc = ready_document();
        let data = envelope(
            vec![
                record("L", "A", "2024-01-01 10:00:00"),
                record("L", "B", "2024-02-15 10:00:00"),
                record("L", "C", "2024-03-20 10:00:00"),
            ],
            3,
        );

        set_value(&mut doc, DATE_FROM_ID, "2024-02-01");
        set_value(&mut doc, DATE_TO_ID, "2024-03-01");
        let range = view.current_date_range(&doc);
        view.render(&mut doc, Some(&data), &range);

        let rows = view.rendered_rows(&doc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].at_str, "2024-02-15 10:00:00");
        assert_eq!(view.count_text(&doc).as_deref(), Some("Gacha time: 1/3"));
    }

    #[test]
    fn test_render_rejects_failed_envelope() {
        let view = ViewController::new();
        let mut doc = ready_document();
        let failed = GachaEnvelope {
            code: 1,
            message: "error".to_string(),
            data: None,
        };

        assert_eq!(view.render(&mut doc, Some(&failed), &DateRange::unbounded()), None);
        assert_eq!(view.render(&mut doc, None, &DateRange::unbounded()), None);
        assert!(doc.query_selector(EMPTY_STATE_SELECTOR).is_some());
    }

    #[test]
    fn test_render_without_container_is_noop() {
        let view = ViewController::new();
        let mut doc = Document::new();
        let data = envelope(vec![record("A", "B", "2024-01-01 00:00:00")], 1);
        assert_eq!(view.render(&mut doc, Some(&data), &DateRange::unbounded()), None);
    }

    #[test]
    fn test_row_text_is_escaped_in_html() {
        let view = ViewController::new();
        let mut doc = ready_document();
        let data = envelope(vec![record("<script>", "B", "2024-01-01 00:00:00")], 1);
        view.render(&mut doc, Some(&data), &DateRange::unbounded());

        let html = doc.to_html();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
