use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    TopBottom,
    BottomTop,
    LeftRight,
    RightLeft,
}

impl Direction {
    /// Map a DSL direction keyword to a direction, defaulting to top-bottom.
    pub fn from_keyword(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "right" | "lr" => Direction::LeftRight,
            "left" | "rl" => Direction::RightLeft,
            "up" | "bt" => Direction::BottomTop,
            _ => Direction::TopBottom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    pub id: String,
    pub label: String,
    pub shape: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub id: String,
    pub label: String,
    pub nodes: Vec<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowDiagram {
    pub title: Option<String>,
    pub direction: Direction,
    pub nodes: IndexMap<String, NodeDef>,
    pub relationships: Vec<Relationship>,
    pub subgraphs: Vec<Subgraph>,
}
