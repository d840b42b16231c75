// 寻访记录查看器后端库
//
// 本库提供：
// - 代理门户站点并拦截寻访记录请求
// - 按输入的 UID 拉取寻访记录
// - 页面控件注入与记录渲染
// - API 路由

pub mod api;
pub mod config;
pub mod dom;
pub mod external;
pub mod models;
pub mod services;
