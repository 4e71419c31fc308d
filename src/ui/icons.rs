/// Sidebar glyphs for the icon names a catalog may carry.
///
/// Catalog entries name icons by their lucide identifier. Names not listed
/// here, and entries without an icon, fall back to `FileText`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocIcon {
    Rocket,
    ShieldCheck,
    Shield,
    Youtube,
    CircleHelp,
    Lock,
    Crown,
    BookOpen,
    Settings,
    FileText,
}

impl DocIcon {
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("Rocket") => Self::Rocket,
            Some("ShieldCheck") => Self::ShieldCheck,
            Some("Shield") => Self::Shield,
            Some("Youtube") => Self::Youtube,
            Some("CircleHelp") | Some("HelpCircle") => Self::CircleHelp,
            Some("Lock") => Self::Lock,
            Some("Crown") => Self::Crown,
            Some("BookOpen") => Self::BookOpen,
            Some("Settings") => Self::Settings,
            _ => Self::FileText,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Rocket => "\u{1f680}",
            Self::ShieldCheck => "\u{2705}",
            Self::Shield => "\u{1f6e1}",
            Self::Youtube => "\u{25b6}",
            Self::CircleHelp => "?",
            Self::Lock => "\u{1f512}",
            Self::Crown => "\u{1f451}",
            Self::BookOpen => "\u{1f4d6}",
            Self::Settings => "\u{2699}",
            Self::FileText => "\u{1f4c4}",
        }
    }
}
