//! Shared fixtures for the render-media integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Read};
use std::rc::Rc;

use fos_dom::{EventType, NodeId};
use fos_media::{HTMLMediaElement, MediaError, MediaErrorCode, PlaybackEngine, SourceKind};
use fos_render_media::{ByteRange, FileResource, MemoryFile, RenderError};

pub const MP4: &[u8] = b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00isomiso2avc1mp41";
pub const MKV: &[u8] = b"\x1A\x45\xDF\xA3\x9F\x42\x86\x81\x01\x42\xF7\x81\x01\x42\xF2\x81";

pub type Results = Rc<RefCell<Vec<Result<NodeId, RenderError>>>>;

/// Callback that records every invocation
pub fn recorder() -> (Results, impl FnOnce(Result<NodeId, RenderError>) + 'static) {
    let results: Results = Rc::default();
    let sink = Rc::clone(&results);
    (results, move |result| sink.borrow_mut().push(result))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// File that counts how often it was opened
pub struct CountingFile {
    inner: MemoryFile,
    pub opens: Rc<Cell<usize>>,
}

impl CountingFile {
    pub fn new(inner: MemoryFile) -> Self {
        Self {
            inner,
            opens: Rc::default(),
        }
    }
}

impl FileResource for CountingFile {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn length(&self) -> Option<u64> {
        self.inner.length()
    }

    fn open_read_stream(&self, range: Option<ByteRange>) -> io::Result<Box<dyn Read>> {
        self.opens.set(self.opens.get() + 1);
        self.inner.open_read_stream(range)
    }
}

/// File whose reads always fail
pub struct BrokenFile(pub &'static str);

impl FileResource for BrokenFile {
    fn name(&self) -> &str {
        self.0
    }

    fn open_read_stream(&self, _range: Option<ByteRange>) -> io::Result<Box<dyn Read>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read denied"))
    }
}

/// How the scripted engine answers a source kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    /// Metadata as soon as bytes arrive
    Play,
    /// `error` on the first bytes
    Fail,
    /// Report playback at the given time, then fail
    ProgressThenFail(f64),
    /// Never answer
    Silent,
}

#[derive(Debug, Default)]
struct Attached {
    script: Option<Script>,
    received: bool,
    settled: bool,
}

/// Engine that answers per source kind from a script and logs every call
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    scripts: HashMap<&'static str, Script>,
    reject_play: bool,
    attached: HashMap<NodeId, Attached>,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script for a source label: `stream`, `media-source` or `blob`
    pub fn on(mut self, label: &'static str, script: Script) -> Self {
        self.scripts.insert(label, script);
        self
    }

    pub fn rejecting_play(mut self) -> Self {
        self.reject_play = true;
        self
    }

    pub fn log_handle(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.log)
    }
}

impl PlaybackEngine for ScriptedEngine {
    fn attach(&mut self, node: NodeId, _media: &mut HTMLMediaElement, source: SourceKind) -> Vec<EventType> {
        self.log.borrow_mut().push(format!("attach {}", source.label()));
        let script = self.scripts.get(source.label()).copied();
        self.attached.insert(
            node,
            Attached {
                script,
                ..Default::default()
            },
        );
        Vec::new()
    }

    fn append(&mut self, node: NodeId, media: &mut HTMLMediaElement, chunk: &[u8]) -> Vec<EventType> {
        let mut events = Vec::new();
        let Some(attached) = self.attached.get_mut(&node) else {
            return events;
        };
        if chunk.is_empty() || attached.settled {
            return events;
        }
        if !attached.received {
            attached.received = true;
            events.push(EventType::LoadStart);
        }

        match attached.script.unwrap_or(Script::Fail) {
            Script::Play => {
                attached.settled = true;
                events.push(EventType::LoadedMetadata);
            }
            Script::Fail => {
                attached.settled = true;
                media.fail(MediaErrorCode::SrcNotSupported, "scripted failure");
                events.push(EventType::Error);
            }
            Script::ProgressThenFail(time) => {
                attached.settled = true;
                media.current_time = time;
                events.push(EventType::Progress);
                media.fail(MediaErrorCode::Decode, "decode error mid-stream");
                events.push(EventType::Error);
            }
            Script::Silent => {}
        }
        events
    }

    fn end_of_stream(&mut self, _node: NodeId, _media: &mut HTMLMediaElement) -> Vec<EventType> {
        Vec::new()
    }

    fn play(&mut self, _node: NodeId, media: &mut HTMLMediaElement) -> Result<(), MediaError> {
        self.log.borrow_mut().push("play".to_string());
        if self.reject_play {
            return Err(MediaError::NotAllowed("autoplay blocked by policy".into()));
        }
        media.play()
    }

    fn detach(&mut self, node: NodeId, _media: &mut HTMLMediaElement) {
        if self.attached.remove(&node).is_some() {
            self.log.borrow_mut().push("detach".to_string());
        }
    }
}

/// Log entries starting with `attach`
pub fn attaches(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
    log.borrow().iter().filter(|l| l.starts_with("attach")).cloned().collect()
}
