// src/types.rs

use std::fmt;

/// Kind of entry file a task folder may contain.
///
/// The two script dialects are distinct entry kinds that normalize to the
/// same [`ArtifactKind::Script`] output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    Script,
    AlternateScript,
    Style,
    Markup,
}

impl EntryKind {
    pub const ALL: [EntryKind; 4] = [
        EntryKind::Script,
        EntryKind::AlternateScript,
        EntryKind::Style,
        EntryKind::Markup,
    ];

    /// Normalized output kind for this entry.
    pub fn artifact(self) -> ArtifactKind {
        match self {
            EntryKind::Script | EntryKind::AlternateScript => ArtifactKind::Script,
            EntryKind::Style => ArtifactKind::Style,
            EntryKind::Markup => ArtifactKind::Markup,
        }
    }

    /// Precedence within an artifact family; the higher value wins when a
    /// task folder holds more than one entry of the same artifact kind.
    pub fn precedence(self) -> u8 {
        match self {
            EntryKind::AlternateScript => 1,
            EntryKind::Script | EntryKind::Style | EntryKind::Markup => 0,
        }
    }

    /// Key used for this kind under `[entry_points]`.
    pub fn config_key(self) -> &'static str {
        match self {
            EntryKind::Script => "js",
            EntryKind::AlternateScript => "jsx",
            EntryKind::Style => "scss",
            EntryKind::Markup => "html",
        }
    }

    /// True when `self` should replace an already chosen `other` of the same
    /// artifact family.
    pub fn overrides(self, other: EntryKind) -> bool {
        self.artifact() == other.artifact() && self.precedence() > other.precedence()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Normalized output artifact produced for a task folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Script,
    Style,
    Markup,
}

impl ArtifactKind {
    /// Extension of the emitted file (`<task>.<ext>`).
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Script => "js",
            ArtifactKind::Style => "css",
            ArtifactKind::Markup => "html",
        }
    }

    /// Entry kinds that compile into this artifact, lowest precedence first.
    pub fn entry_kinds(self) -> &'static [EntryKind] {
        match self {
            ArtifactKind::Script => &[EntryKind::Script, EntryKind::AlternateScript],
            ArtifactKind::Style => &[EntryKind::Style],
            ArtifactKind::Markup => &[EntryKind::Markup],
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArtifactKind::Script => "javascript",
            ArtifactKind::Style => "css",
            ArtifactKind::Markup => "form",
        };
        f.write_str(label)
    }
}

/// How compiled output is produced.
///
/// - `Watch`: fast incremental output for the live-served directory; markup
///   links to the separately served script/style files.
/// - `Build`: minified output for the build directory; markup inlines the
///   compiled script/style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Watch,
    Build,
}
