//! The uniform record every container/codec combination is flattened
//! into at finalization. Nothing downstream of `parse_file` needs to
//! know whether a `Duration` field came from a TS PTS span or an `mvhd`
//! box — it only sees a `Stream` with ordered `Field`s.

use std::collections::BTreeMap;

use serde::Serialize;

/// One reported attribute, already rendered to a display string. Display
/// formatting (unit localization, thousands separators) is out of scope
/// here; values are the raw computed numbers/strings.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    /// Canonical field name, e.g. `"Format"`, `"Bit rate"`.
    pub name: String,
    /// Display value.
    pub value: String,
}

impl Field {
    /// Builds a field from anything convertible to a string.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// The kind of a reported stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum StreamKind {
    /// The whole-file summary section.
    General,
    /// An elementary video stream.
    Video,
    /// An elementary audio stream.
    Audio,
    /// A text/subtitle/closed-caption stream.
    Text,
    /// A still-image stream (e.g. an embedded cover).
    Image,
    /// A DVD-Video menu domain.
    Menu,
    /// Anything recognized but not classifiable into the above.
    Other,
}

/// One section of a report: a stream kind, its ordered fields, and a raw
/// key/value view of the same data for structured consumers.
#[derive(Debug, Clone, Serialize)]
pub struct Stream {
    /// This stream's kind.
    pub kind: StreamKind,
    /// Fields in canonical display order.
    pub fields: Vec<Field>,
    /// The same fields as a map, for callers that want structured access
    /// instead of display order.
    pub raw: BTreeMap<String, String>,
    /// Set when this stream has no meaningful position among others of
    /// its kind (e.g. a single-stream container) and a renderer should
    /// not emit a `Stream order` field for it.
    pub skip_stream_order: bool,
    /// Set when every field on this stream came directly from the
    /// container/codec headers with nothing derived (no duration/bitrate
    /// computed from byte counts), so a renderer should not label any of
    /// them as estimated.
    pub skip_computed: bool,
}

impl Stream {
    /// Starts an empty stream of the given kind.
    pub fn new(kind: StreamKind) -> Self {
        Self { kind, fields: Vec::new(), raw: BTreeMap::new(), skip_stream_order: false, skip_computed: false }
    }

    /// Appends a field, skipping it entirely when `value` is empty —
    /// canonical field order is defined by call order, so callers build
    /// fields in that order and absent ones simply leave gaps.
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.raw.insert(name.to_string(), value.clone());
        self.fields.push(Field::new(name, value));
    }
}

/// Constant or variable bitrate, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum BitrateMode {
    /// Every frame/sample costs roughly the same number of bits.
    Constant,
    /// Bit allocation varies across the stream.
    Variable,
}

/// One chapter mark.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    /// Chapter start, in seconds from the start of the file.
    pub start_seconds: f64,
    /// Chapter title, if the container carried one.
    pub title: Option<String>,
}

/// Whole-container facts that live on the `General` stream's computed
/// side rather than as a plain display field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContainerInfo {
    /// Overall duration in seconds, the longest of any elementary
    /// stream's own duration.
    pub duration_seconds: Option<f64>,
    /// Constant/variable bitrate, when a codec parser could tell.
    pub bitrate_mode: Option<BitrateMode>,
    /// Container bytes not attributable to any elementary stream's
    /// payload (box/chunk/packet headers, padding).
    pub stream_overhead_bytes: Option<u64>,
    /// Chapter marks. Always empty: none of the implemented container
    /// parsers extract chapter atoms/lists.
    pub chapters: Vec<Chapter>,
}

/// A complete parse result: one `General` section plus the elementary
/// streams discovered in the file.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Whole-file summary fields.
    pub general: Stream,
    /// Computed container-level facts backing some of `general`'s
    /// fields.
    pub container: ContainerInfo,
    /// Elementary streams, in discovery order.
    pub streams: Vec<Stream>,
}

impl Report {
    /// A report for a container that the sniffer recognized but for
    /// which no demuxer is implemented: `general` carries only the
    /// format name, and there are no elementary streams.
    pub fn recognized_only(format: &str) -> Self {
        let mut general = Stream::new(StreamKind::General);
        general.push("Format", format);
        Self { general, container: ContainerInfo::default(), streams: Vec::new() }
    }
}
