// 宿主页面布局
//
// 与门户的寻访记录页面结构一致：带三个类型标签的 `.tabs`，以及带空状态占位的 `.gacha`

use crate::dom::{Document, NodeId};
use crate::models::PullCategory;

/// 挂载宿主页面布局，已挂载时直接返回已有的标签栏
pub fn mount_host_layout(doc: &mut Document) -> NodeId {
    if let Some(tabs) = doc.query_selector(".tabs") {
        return tabs;
    }

    let body = doc.body();

    let tabs = doc.create_element("ul");
    if let Some(el) = doc.get_mut(tabs) {
        el.add_class("tabs");
    }
    for category in PullCategory::ALL {
        let li = doc.create_element("li");
        if let Some(el) = doc.get_mut(li) {
            el.text = category.label().to_string();
        }
        doc.append_child(tabs, li);
    }

    let gacha = doc.create_element("div");
    if let Some(el) = doc.get_mut(gacha) {
        el.add_class("gacha");
    }
    let empty = doc.create_element("div");
    if let Some(el) = doc.get_mut(empty) {
        el.add_class("content-empty");
        el.text = "No data".to_string();
    }
    doc.append_child(gacha, empty);

    doc.append_child(body, tabs);
    doc.append_child(body, gacha);
    tabs
}
