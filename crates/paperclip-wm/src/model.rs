use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Smallest size a window may be resized to; keeps the title bar controls usable.
pub const MIN_WIDTH: u16 = 24;
pub const MIN_HEIGHT: u16 = 6;

/// Size used for windows whose kind has no dedicated entry in the defaults table.
pub const GENERIC_SIZE: Size = Size { width: 60, height: 18 };

/// New windows are placed at `CASCADE_BASE + CASCADE_STEP * open_count`.
pub const CASCADE_BASE: Point = Point { x: 6, y: 2 };
pub const CASCADE_STEP: Point = Point { x: 3, y: 2 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Raises either dimension to the minimum floor.
    pub fn clamped(self) -> Self {
        Self { width: self.width.max(MIN_WIDTH), height: self.height.max(MIN_HEIGHT) }
    }
}

/// Screen rectangle in terminal cells. The origin may be negative for windows
/// dragged past the left or top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self { x: origin.x, y: origin.y, width: size.width, height: size.height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + i32::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + i32::from(self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Research tools the backend exposes through `/query` commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    DomainDiscovery,
    PaperSummarizer,
    ProfessorFinder,
    DatasetHub,
    PretrainedModels,
    GenerateCode,
    /// A tool advertised by the server that this client has no dedicated form for.
    Other(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "domain_discovery" => ToolKind::DomainDiscovery,
            "paper_summarizer" => ToolKind::PaperSummarizer,
            "professor_finder" => ToolKind::ProfessorFinder,
            "dataset_hub" => ToolKind::DatasetHub,
            "pretrained_models" => ToolKind::PretrainedModels,
            "generate_code" => ToolKind::GenerateCode,
            other => ToolKind::Other(other.to_string()),
        }
    }

    /// Command name as understood by the backend.
    pub fn name(&self) -> &str {
        match self {
            ToolKind::DomainDiscovery => "domain_discovery",
            ToolKind::PaperSummarizer => "paper_summarizer",
            ToolKind::ProfessorFinder => "professor_finder",
            ToolKind::DatasetHub => "dataset_hub",
            ToolKind::PretrainedModels => "pretrained_models",
            ToolKind::GenerateCode => "generate_code",
            ToolKind::Other(name) => name,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ToolKind::DomainDiscovery => "Domain Discovery".into(),
            ToolKind::PaperSummarizer => "Paper Summarizer".into(),
            ToolKind::ProfessorFinder => "Professor Finder".into(),
            ToolKind::DatasetHub => "Dataset Hub".into(),
            ToolKind::PretrainedModels => "Pretrained Models".into(),
            ToolKind::GenerateCode => "Code Generator".into(),
            ToolKind::Other(name) => humanize(name),
        }
    }
}

fn humanize(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() { "Tool".into() } else { words.join(" ") }
}

/// Which content panel a window hosts. At most one window per kind is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelKind {
    Chat,
    Research,
    Tools,
    Tool(ToolKind),
    Workspaces,
    Stats,
    Ideation,
    Experiment,
    Account,
}

impl PanelKind {
    /// Kinds that get a desktop icon, in icon order.
    pub const LAUNCHERS: [PanelKind; 8] = [
        PanelKind::Chat,
        PanelKind::Research,
        PanelKind::Tools,
        PanelKind::Workspaces,
        PanelKind::Stats,
        PanelKind::Ideation,
        PanelKind::Experiment,
        PanelKind::Account,
    ];

    pub fn slug(&self) -> String {
        match self {
            PanelKind::Chat => "chat".into(),
            PanelKind::Research => "research".into(),
            PanelKind::Tools => "tools".into(),
            PanelKind::Tool(tool) => format!("tool-{}", tool.name()),
            PanelKind::Workspaces => "workspaces".into(),
            PanelKind::Stats => "stats".into(),
            PanelKind::Ideation => "ideation".into(),
            PanelKind::Experiment => "experiment".into(),
            PanelKind::Account => "account".into(),
        }
    }

    /// Short label for desktop icons.
    pub fn icon_label(&self) -> String {
        match self {
            PanelKind::Chat => "Chat".into(),
            PanelKind::Research => "Research".into(),
            PanelKind::Tools => "Tools".into(),
            PanelKind::Tool(tool) => tool.label(),
            PanelKind::Workspaces => "Workspaces".into(),
            PanelKind::Stats => "Stats".into(),
            PanelKind::Ideation => "Ideation".into(),
            PanelKind::Experiment => "Experiments".into(),
            PanelKind::Account => "Account".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDefaults {
    pub title: String,
    pub size: Size,
}

/// Initial title and size for a freshly opened window.
pub fn defaults_for(kind: &PanelKind) -> WindowDefaults {
    let (title, size) = match kind {
        PanelKind::Chat => ("Research Chat".to_string(), Size::new(72, 22)),
        PanelKind::Research => ("Research Studio".to_string(), Size::new(76, 24)),
        PanelKind::Tools => ("Research Tools".to_string(), Size::new(48, 18)),
        PanelKind::Tool(ToolKind::Other(name)) => (humanize(name), GENERIC_SIZE),
        PanelKind::Tool(tool) => (tool.label(), Size::new(70, 20)),
        PanelKind::Workspaces => ("Workspaces".to_string(), Size::new(80, 24)),
        PanelKind::Stats => ("Statistics".to_string(), Size::new(52, 14)),
        PanelKind::Ideation => ("Ideation Lab".to_string(), Size::new(72, 22)),
        PanelKind::Experiment => ("Experiment Designer".to_string(), Size::new(72, 22)),
        PanelKind::Account => ("Account".to_string(), Size::new(50, 14)),
    };
    WindowDefaults { title, size }
}

/// Opaque window token: the panel slug plus the host's creation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(String);

impl WindowId {
    pub(crate) fn new(kind: &PanelKind, seq: u64) -> Self {
        Self(format!("{}-{}", kind.slug(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub kind: PanelKind,
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub minimized: bool,
    pub maximized: bool,
    pub z_index: u64,
}

impl WindowRecord {
    /// Stored geometry, regardless of the maximized flag.
    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    /// Geometry used for drawing and hit testing.
    pub fn layout_rect(&self, work_area: Rect) -> Rect {
        if self.maximized { work_area } else { self.rect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_round_trip_through_kind() {
        for name in ["domain_discovery", "paper_summarizer", "professor_finder", "dataset_hub", "pretrained_models", "generate_code"] {
            assert_eq!(ToolKind::from_name(name).name(), name);
        }
        assert_eq!(ToolKind::from_name("citation_graph"), ToolKind::Other("citation_graph".into()));
    }

    #[test]
    fn unknown_tools_get_generic_defaults() {
        let d = defaults_for(&PanelKind::Tool(ToolKind::Other("citation_graph".into())));
        assert_eq!(d.size, GENERIC_SIZE);
        assert_eq!(d.title, "Citation Graph");
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(-2, 3, 4, 2);
        assert!(r.contains(Point::new(-2, 3)));
        assert!(r.contains(Point::new(1, 4)));
        assert!(!r.contains(Point::new(2, 4)));
        assert!(!r.contains(Point::new(0, 5)));
    }

    #[test]
    fn ids_carry_the_panel_slug() {
        let id = WindowId::new(&PanelKind::Tool(ToolKind::DatasetHub), 7);
        assert_eq!(id.as_str(), "tool-dataset_hub-7");
    }
}
