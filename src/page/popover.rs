/// Side of the anchor element a tooltip opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Text,
    Node(String),
}

/// Hover/focus tooltip content, fixed once the page is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popover {
    content: String,
    source: Source,
    placement: Placement,
}

impl Popover {
    pub fn text(content: impl Into<String>, placement: Placement) -> Self {
        Self {
            content: content.into(),
            source: Source::Text,
            placement,
        }
    }

    /// Content taken from another node rendered on the same page, with its
    /// whitespace collapsed the way the node's text would read.
    pub fn from_node(node_id: impl Into<String>, text: &str, placement: Placement) -> Self {
        Self {
            content: text.split_whitespace().collect::<Vec<_>>().join(" "),
            source: Source::Node(node_id.into()),
            placement,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Id of the node the content was read from, if any.
    pub fn node_id(&self) -> Option<&str> {
        match &self.source {
            Source::Text => None,
            Source::Node(id) => Some(id),
        }
    }
}
