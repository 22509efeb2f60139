//! Source map v3 model: regular maps, sectioned maps and data URIs.
//!
//! Compilers hand back regular maps; combining several units produces a
//! sectioned map whose sections are anchored at the line each unit starts
//! on in the combined output.

mod sections;

pub use sections::{line_count, sectioned};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Source map format version emitted and accepted.
pub const VERSION: u32 = 3;

/// Data URI prefix used for inline maps.
pub const DATA_URI_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// Regular (non-indexed) source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularMap {
    pub version: u32,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
    #[serde(
        rename = "sourcesContent",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(rename = "sourceRoot", default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl RegularMap {
    /// Empty map for `source`: no mappings, original text attached.
    pub fn empty(source: impl Into<String>, content: Option<String>) -> Self {
        Self {
            version: VERSION,
            sources: vec![source.into()],
            names: Vec::new(),
            mappings: String::new(),
            sources_content: content.map(|c| vec![Some(c)]),
            source_root: None,
            file: None,
        }
    }

    /// Account for `lines` lines inserted before the generated code.
    ///
    /// Every `;` starts a new generated line and segment columns restart per
    /// line, so prefixing separators keeps all other deltas valid.
    pub fn shift_lines(&mut self, lines: usize) {
        if lines > 0 {
            self.mappings.insert_str(0, &";".repeat(lines));
        }
    }
}

/// Zero-based position of a section in the combined output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub line: u32,
    pub column: u32,
}

/// One sub-map of a sectioned map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub offset: Offset,
    pub map: RegularMap,
}

/// Index map made of independently generated sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionedMap {
    pub version: u32,
    pub sections: Vec<Section>,
}

/// Either kind of source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMap {
    Sectioned(SectionedMap),
    Regular(RegularMap),
}

impl SourceMap {
    /// Serialize to JSON, tab-indented when `pretty`.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if !pretty {
            return serde_json::to_string(self);
        }
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Compact JSON encoded as a base64 `data:` URI.
    pub fn to_data_uri(&self) -> serde_json::Result<String> {
        let json = self.to_json(false)?;
        Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(json)))
    }

    /// Decode a map produced by [`to_data_uri`](Self::to_data_uri).
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let payload = uri.strip_prefix(DATA_URI_PREFIX)?;
        let bytes = STANDARD.decode(payload).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn as_regular(&self) -> Option<&RegularMap> {
        match self {
            Self::Regular(map) => Some(map),
            Self::Sectioned(_) => None,
        }
    }

    pub fn as_sectioned(&self) -> Option<&SectionedMap> {
        match self {
            Self::Sectioned(map) => Some(map),
            Self::Regular(_) => None,
        }
    }
}

impl From<RegularMap> for SourceMap {
    fn from(map: RegularMap) -> Self {
        Self::Regular(map)
    }
}
