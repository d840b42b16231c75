use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

/// 成功状态码
pub const SUCCESS_CODE: i64 = 0;

/// 单条寻访记录，字段原样来自远端服务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pool_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub char_name: String,
    /// 稀有度对应的颜色（CSS 颜色值）
    #[serde(default, deserialize_with = "null_as_default")]
    pub color: String,
    /// 格式固定为 "YYYY-MM-DD HH:MM:SS"
    #[serde(default, deserialize_with = "null_as_default")]
    pub at_str: String,
}

/// 缺失字段和 `null` 都按默认值处理，单条异常记录不影响整页
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PullRecord {
    /// 时间戳的日期部分
    pub fn date_part(&self) -> &str {
        self.at_str.get(..10).unwrap_or(&self.at_str)
    }
}

/// 一页寻访记录，`count` 为服务端声明的总数，可能大于 `rows.len()`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResult {
    #[serde(default)]
    pub rows: Vec<PullRecord>,
    #[serde(default)]
    pub count: u64,
}

/// 远端接口的响应包装
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GachaEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<HistoryResult>,
}

impl GachaEnvelope {
    /// 拦截时返回给页面的空响应
    pub fn empty_ok() -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "ok".to_string(),
            data: Some(HistoryResult::default()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// 仅在成功且包含数据时返回记录
    pub fn history(&self) -> Option<&HistoryResult> {
        if self.is_success() {
            self.data.as_ref()
        } else {
            None
        }
    }
}

/// 寻访类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullCategory {
    Regular,
    Limited,
    Special,
}

impl PullCategory {
    pub const ALL: [PullCategory; 3] = [
        PullCategory::Regular,
        PullCategory::Limited,
        PullCategory::Special,
    ];

    /// 查询参数值（`+` 按原样发送）
    pub fn query_value(&self) -> &'static str {
        match self {
            PullCategory::Regular => "Regular+Headhunting",
            PullCategory::Limited => "Limited+Headhunting",
            PullCategory::Special => "Special+Headhunting",
        }
    }

    /// 页面按钮上的文字
    pub fn label(&self) -> &'static str {
        match self {
            PullCategory::Regular => "Regular Headhunting",
            PullCategory::Limited => "Limited Headhunting",
            PullCategory::Special => "Special Headhunting",
        }
    }

    /// 根据按钮文字解析类型
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

/// 日期过滤范围（闭区间，只比较日期部分）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.and_then(parse_date_bound),
            to: to.and_then(parse_date_bound),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// 没有时间戳的记录总是保留
    pub fn contains(&self, record: &PullRecord) -> bool {
        if record.at_str.is_empty() {
            return true;
        }
        let date = record.date_part();
        let after_from = self.from.as_deref().map_or(true, |from| date >= from);
        let before_to = self.to.as_deref().map_or(true, |to| date <= to);
        after_from && before_to
    }

    /// 纯过滤，不修改原始记录，保持原顺序
    pub fn filter<'a>(&self, rows: &'a [PullRecord]) -> Vec<&'a PullRecord> {
        rows.iter().filter(|record| self.contains(record)).collect()
    }
}

/// 校验日期选择器的值，非法值视为未设置
pub fn parse_date_bound(value: &str) -> Option<String> {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();

    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let regex = DATE_REGEX.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("日期正则表达式编译失败")
    });

    if !regex.is_match(value) || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        tracing::warn!("Ignoring invalid date input: {}", value);
        return None;
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(at: &str) -> PullRecord {
        PullRecord {
            pool_name: "Pool".to_string(),
            char_name: "Amiya".to_string(),
            color: "#ff0000".to_string(),
            at_str: at.to_string(),
        }
    }

    #[test]
    fn test_envelope_deserialization() {
        let json = r##"{
            "code": 0,
            "message": "ok",
            "data": {
                "rows": [
                    {"poolName": "Joint Operation", "charName": "Texas", "color": "#ffb300", "atStr": "2024-01-01 12:00:00", "rarity": 5}
                ],
                "count": 12
            }
        }"##;

        let envelope: GachaEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.is_success());
        let history = envelope.history().unwrap();
        assert_eq!(history.count, 12);
        assert_eq!(history.rows[0].char_name, "Texas");
        assert_eq!(history.rows[0].date_part(), "2024-01-01");
    }

    #[test]
    fn test_record_with_null_fields_still_parses() {
        let json = r##"{
            "code": 0,
            "message": "ok",
            "data": {
                "rows": [
                    {"poolName": null, "charName": "Texas", "color": null, "atStr": "2024-01-01 12:00:00"},
                    {"charName": "Amiya", "color": "#ffb300"}
                ],
                "count": 2
            }
        }"##;

        let envelope: GachaEnvelope = serde_json::from_str(json).unwrap();
        let rows = &envelope.history().unwrap().rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].pool_name, "");
        assert_eq!(rows[0].color, "");
        assert_eq!(rows[0].char_name, "Texas");
        assert_eq!(rows[1].pool_name, "");
        assert_eq!(rows[1].at_str, "");
    }

    #[test]
    fn test_envelope_missing_count_defaults_to_zero() {
        let json = r#"{"code": 0, "message": "ok", "data": {"rows": []}}"#;
        let envelope: GachaEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.history().unwrap().count, 0);
    }

    #[test]
    fn test_failed_envelope_has_no_history() {
        let json = r#"{"code": 401, "message": "unauthorized"}"#;
        let envelope: GachaEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.is_success());
        assert!(envelope.history().is_none());
    }

    #[test]
    fn test_empty_ok_serialization() {
        let value = serde_json::to_value(GachaEnvelope::empty_ok()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"code": 0, "message": "ok", "data": {"rows": [], "count": 0}})
        );
    }

    #[test]
    fn test_category_labels_and_query_values() {
        assert_eq!(PullCategory::from_label("Limited Headhunting"), Some(PullCategory::Limited));
        assert_eq!(PullCategory::from_label("  Special Headhunting "), Some(PullCategory::Special));
        assert_eq!(PullCategory::from_label("Recruitment"), None);
        assert_eq!(PullCategory::Regular.query_value(), "Regular+Headhunting");
    }

    #[test]
    fn test_date_range_filter() {
        let rows = vec![
            record("2024-01-01 10:00:00"),
            record("2024-02-15 10:00:00"),
            record("2024-03-20 10:00:00"),
        ];
        let range = DateRange::new(Some("2024-02-01"), Some("2024-03-01"));
        let filtered = range.filter(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].at_str, "2024-02-15 10:00:00");
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let rows = vec![record("2024-02-01 00:00:00"), record("2024-03-01 23:59:59")];
        let range = DateRange::new(Some("2024-02-01"), Some("2024-03-01"));
        assert_eq!(range.filter(&rows).len(), 2);
    }

    #[test]
    fn test_record_without_timestamp_is_kept() {
        let rows = vec![record(""), record("2023-12-31 00:00:00")];
        let range = DateRange::new(Some("2024-01-01"), None);
        let filtered = range.filter(&rows);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].at_str.is_empty());
    }

    #[test]
    fn test_invalid_date_bound_is_ignored() {
        assert_eq!(parse_date_bound(""), None);
        assert_eq!(parse_date_bound("2024/02/01"), None);
        assert_eq!(parse_date_bound("2024-02-30"), None);
        assert_eq!(parse_date_bound("2024-02-29"), Some("2024-02-29".to_string()));
    }

    fn arb_record() -> impl Strategy<Value = PullRecord> {
        (2020u32..2026, 1u32..13, 1u32..29).prop_map(|(y, m, d)| {
            record(&format!("{:04}-{:02}-{:02} 08:00:00", y, m, d))
        })
    }

    proptest! {
        #[test]
        fn prop_unbounded_filter_is_identity(rows in proptest::collection::vec(arb_record(), 0..30)) {
            let filtered: Vec<PullRecord> = DateRange::unbounded().filter(&rows).into_iter().cloned().collect();
            prop_assert_eq!(filtered, rows);
        }

        #[test]
        fn prop_filter_is_idempotent(
            rows in proptest::collection::vec(arb_record(), 0..30),
            from in 2020u32..2026,
            to in 2020u32..2026,
        ) {
            let range = DateRange::new(Some(&format!("{}-01-01", from)), Some(&format!("{}-12-31", to)));
            let once: Vec<PullRecord> = range.filter(&rows).into_iter().cloned().collect();
            let twice: Vec<PullRecord> = range.filter(&once).into_iter().cloned().collect();
            prop_assert_eq!(once, twice);
        }
    }
}
