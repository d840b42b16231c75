// 页面文档模型
//
// 以 arena 方式保存的元素树，提供：
// - 元素的创建、挂载、移除（删除的子树槽位会被复用）
// - `#id`、`.class`、`tag` 三种选择器
// - HTML 序列化
// - 结构变更记录（供就绪监听器使用）

pub mod node;

pub use node::{Element, NodeId};

/// 结构变更记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ChildAdded { parent: NodeId, child: NodeId },
    ChildRemoved { parent: NodeId, child: NodeId },
}

/// 简单选择器
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector<'a> {
    Id(&'a str),
    Class(&'a str),
    Tag(&'a str),
}

impl<'a> Selector<'a> {
    fn parse(selector: &'a str) -> Self {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            Selector::Id(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            Selector::Class(class)
        } else {
            Selector::Tag(selector)
        }
    }

    fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Id(id) => element.id.as_deref() == Some(*id),
            Selector::Class(class) => element.has_class(class),
            Selector::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
        }
    }
}

/// 文档
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    /// 已删除、可复用的槽位
    free: Vec<NodeId>,
    body: NodeId,
    mutations: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 创建只包含 `<body>` 的文档
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            free: Vec::new(),
            body: NodeId(0),
            mutations: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// 创建一个未挂载的元素
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.0] = Element::new(tag);
            return id;
        }
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0)
    }

    /// 挂载子元素（若已挂载在别处则先移走）
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.mutations.push(Mutation::ChildAdded { parent, child });
    }

    /// 移除并释放整个子树，之后这些 `NodeId` 不再有效
    pub fn delete(&mut self, node: NodeId) {
        if node == self.body || node.0 >= self.nodes.len() {
            return;
        }
        self.detach(node);

        let mut subtree = Vec::new();
        self.walk(node, &mut |id, _| subtree.push(id));
        for id in subtree {
            self.nodes[id.0] = Element::default();
            self.free.push(id);
        }
    }

    /// 已分配的槽位数（含可复用的空槽）
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|el| el.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node);
        self.nodes[node.0].parent = None;
        self.mutations.push(Mutation::ChildRemoved { parent, child: node });
    }

    /// 是否挂载在 body 下
    #[cfg(test)]
    fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.nodes.get(id.0).and_then(|el| el.parent);
        }
        false
    }

    /// 深度优先返回第一个匹配的已挂载元素
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// 深度优先返回所有匹配的已挂载元素
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        let mut found = Vec::new();
        self.walk(self.body, &mut |id, el| {
            if id != self.body && selector.matches(el) {
                found.push(id);
            }
        });
        found
    }

    /// 在子树中查找
    pub fn query_selector_within(&self, root: NodeId, selector: &str) -> Vec<NodeId> {
        let selector = Selector::parse(selector);
        let mut found = Vec::new();
        self.walk(root, &mut |id, el| {
            if id != root && selector.matches(el) {
                found.push(id);
            }
        });
        found
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_selector(&format!("#{}", id))
    }

    /// 自身或最近的祖先中，标签属于 `tags` 的元素
    pub fn closest(&self, node: NodeId, tags: &[&str]) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let el = self.nodes.get(id.0)?;
            if tags.iter().any(|tag| el.tag.eq_ignore_ascii_case(tag)) {
                return Some(id);
            }
            current = el.parent;
        }
        None
    }

    /// 子树内所有文本拼接
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.walk(node, &mut |_, el| text.push_str(&el.text));
        text
    }

    fn walk<F: FnMut(NodeId, &Element)>(&self, node: NodeId, visit: &mut F) {
        let Some(el) = self.nodes.get(node.0) else {
            return;
        };
        visit(node, el);
        for child in &el.children {
            self.walk(*child, visit);
        }
    }

    /// 取出并清空变更记录
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// 序列化为 HTML
    pub fn to_html(&self) -> String {
        self.outer_html(self.body)
    }

    fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(el) = self.nodes.get(node.0) else {
            return;
        };
        out.push('<');
        out.push_str(&el.tag);
        if let Some(ref id) = el.id {
            push_attr(out, "id", id);
        }
        if !el.classes.is_empty() {
            push_attr(out, "class", &el.classes.join(" "));
        }
        if !el.style.is_empty() {
            push_attr(out, "style", &el.style_text());
        }
        for (name, value) in &el.attributes {
            push_attr(out, name, value);
        }
        out.push('>');

        if el.is_void() {
            return;
        }

        out.push_str(&escape_html(&el.text));
        for child in &el.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

/// HTML 转义
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
