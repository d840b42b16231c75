use serde::{Deserialize, Serialize};

use super::Uid;

/// 页面上的用户事件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewerEvent {
    /// 输入框内容变化
    Input { target: String, value: String },
    /// 日期选择器变化
    Change { target: String, value: String },
    /// 点击类型标签，`label` 为标签文字，`target` 为被点击元素的 id
    Click {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
}

/// 页面上绘制的一行记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub pool_name: String,
    pub char_name: String,
    pub color: String,
    pub at_str: String,
}

/// 查看器状态响应DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerStateResponse {
    pub self_uid: Uid,
    pub other_uid: Uid,
    pub other_active: bool,
    pub controls_injected: bool,
    /// 缓存结果中的记录数，未拉取过时为 None
    pub cached_rows: Option<usize>,
    pub count_label: Option<String>,
    pub rows: Vec<RenderedRow>,
}
