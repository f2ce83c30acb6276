//! Media Host
//!
//! Owns the document, the media element state and the playback engine,
//! and runs render jobs on a cooperative loop. `render` and `append`
//! validate their arguments synchronously and queue a job; the embedder
//! turns the loop with `tick` (or `run_until_idle`), and every job reports
//! through its callback exactly once.

use std::collections::HashMap;
use std::fmt;

use fos_dom::{Document, Event, EventType, ListenerId, NodeId};
use fos_media::{BlobStore, Capabilities, HTMLMediaElement, HeadlessEngine, MediaKind, PlaybackEngine};

use crate::classify::{extension_of, ContentCategory, ElementKind};
use crate::context::RenderContext;
use crate::dispatcher::{Outcome, StrategyDispatcher};
use crate::error::{RenderError, RenderErrorKind, ValidationError};
use crate::file::FileResource;
use crate::options::RenderOptions;
use crate::sniff::{sniff, Sniffed};
use crate::static_render::{render_document, render_image};

/// Completion callback of a render
pub type RenderCallback = Box<dyn FnOnce(Result<NodeId, RenderError>)>;

/// Existing element a render goes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    Element(NodeId),
    /// Simple selector (`tag`, `#id`, `.class`), first match wins
    Selector(String),
}

impl From<NodeId> for RenderTarget {
    fn from(id: NodeId) -> Self {
        Self::Element(id)
    }
}

impl From<&str> for RenderTarget {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for RenderTarget {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(id) => write!(f, "{id}"),
            Self::Selector(selector) => f.write_str(selector),
        }
    }
}

/// One-shot callback; consuming it is the only way to call it
struct Completion(RenderCallback);

impl Completion {
    fn fire(self, result: Result<NodeId, RenderError>) {
        (self.0)(result)
    }
}

#[derive(Debug, Clone, Copy)]
enum Placement {
    Existing,
    /// Created by `append`; removed again if the render fails
    Appended,
}

enum Stage {
    Pending,
    Dispatching(StrategyDispatcher),
    /// Succeeded; the adapter still feeds the rest of the resource
    Draining(StrategyDispatcher),
    Done,
}

struct RenderJob {
    file: Box<dyn FileResource>,
    extension: String,
    category: ContentCategory,
    options: RenderOptions,
    node: NodeId,
    placement: Placement,
    stage: Stage,
    completion: Option<Completion>,
}

impl RenderJob {
    fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    /// Run one unit of work. False if the job is only waiting for events.
    fn step(&mut self, cx: &mut RenderContext<'_>) -> bool {
        match &mut self.stage {
            Stage::Dispatching(dispatcher) | Stage::Draining(dispatcher) if dispatcher.is_superseded(cx) => {
                self.supersede(cx);
                true
            }
            Stage::Pending => {
                self.begin(cx);
                true
            }
            Stage::Dispatching(dispatcher) => dispatcher.pump(cx),
            Stage::Draining(dispatcher) => {
                if !dispatcher.pump(cx) {
                    self.stage = Stage::Done;
                }
                true
            }
            Stage::Done => false,
        }
    }

    fn begin(&mut self, cx: &mut RenderContext<'_>) {
        let category = match self.category {
            ContentCategory::Unknown => match sniff(self.file.as_ref()) {
                Ok(Sniffed::Text) => ContentCategory::Document,
                Ok(Sniffed::Binary) => {
                    let extension = self.extension.clone();
                    return self.finish(Err(RenderErrorKind::UnsupportedType { extension }), cx);
                }
                Err(e) => return self.finish(Err(e.into()), cx),
            },
            category => category,
        };

        match category {
            ContentCategory::Image => {
                self.stage = Stage::Done;
                let result = render_image(self.file.as_ref(), &self.extension, self.node, cx);
                self.finish(result, cx);
            }
            ContentCategory::Document | ContentCategory::Unknown => {
                self.stage = Stage::Done;
                let result = render_document(self.file.as_ref(), &self.extension, self.node, cx);
                self.finish(result, cx);
            }
            _ => {
                let mut dispatcher = StrategyDispatcher::new(
                    self.node,
                    &self.extension,
                    category,
                    self.options,
                    cx.capabilities,
                );
                match dispatcher.start(self.file.as_ref(), cx) {
                    Outcome::Pending => self.stage = Stage::Dispatching(dispatcher),
                    Outcome::Succeeded => {
                        self.stage = Stage::Draining(dispatcher);
                        self.finish(Ok(()), cx);
                    }
                    Outcome::Failed(kind) => self.finish(Err(kind), cx),
                }
            }
        }
    }

    /// Deliver an event; true if it belonged to this job
    fn handle_event(&mut self, event: &Event, reached: &[ListenerId], cx: &mut RenderContext<'_>) -> bool {
        let Stage::Dispatching(dispatcher) = &mut self.stage else {
            return false;
        };
        if !dispatcher.listens_to(reached) {
            return false;
        }

        match dispatcher.handle_event(event, reached, self.file.as_ref(), cx) {
            Outcome::Pending => {}
            Outcome::Succeeded => {
                if let Stage::Dispatching(dispatcher) = std::mem::replace(&mut self.stage, Stage::Done) {
                    self.stage = Stage::Draining(dispatcher);
                }
                self.finish(Ok(()), cx);
            }
            Outcome::Failed(kind) => self.finish(Err(kind), cx),
        }
        true
    }

    /// Another render took over the element. Stop feeding it and report
    /// to the caller if this render had not finished yet; the element and
    /// its new source are left alone.
    fn supersede(&mut self, cx: &mut RenderContext<'_>) {
        let (Stage::Dispatching(mut dispatcher) | Stage::Draining(mut dispatcher)) =
            std::mem::replace(&mut self.stage, Stage::Done)
        else {
            return;
        };
        dispatcher.release(cx);
        tracing::debug!(file = self.file.name(), node = %self.node, "element has a new source, render released");
        self.finish(Err(RenderErrorKind::Superseded), cx);
    }

    /// The element left the document. Free the render's resources and drop
    /// the callback unfired.
    fn retire(&mut self, cx: &mut RenderContext<'_>) {
        if let Stage::Dispatching(dispatcher) | Stage::Draining(dispatcher) = &mut self.stage {
            dispatcher.release(cx);
        }
        self.stage = Stage::Done;
        if self.completion.take().is_some() {
            tracing::debug!(file = self.file.name(), node = %self.node, "element discarded, render abandoned");
        }
    }

    fn finish(&mut self, result: Result<(), RenderErrorKind>, cx: &mut RenderContext<'_>) {
        let Some(completion) = self.completion.take() else {
            return;
        };
        let name = self.file.name();

        let result = match result {
            Ok(()) => {
                tracing::info!(file = name, node = %self.node, "rendered");
                Ok(self.node)
            }
            Err(kind) => {
                self.stage = Stage::Done;
                let keep = matches!(kind, RenderErrorKind::Superseded);
                if matches!(self.placement, Placement::Appended) && !keep {
                    cx.media.remove(&self.node);
                    if let Err(e) = cx.document.destroy_node(self.node) {
                        tracing::debug!(node = %self.node, error = %e, "could not remove failed element");
                    }
                }
                let err = RenderError::new(name, kind);
                tracing::warn!(node = %self.node, error = %err, "render failed");
                Err(err)
            }
        };
        completion.fire(result);
    }
}

/// Document plus the machinery that renders files into it
pub struct MediaHost {
    document: Document,
    media: HashMap<NodeId, HTMLMediaElement>,
    engine: Box<dyn PlaybackEngine>,
    blobs: BlobStore,
    capabilities: Capabilities,
    jobs: Vec<RenderJob>,
}

impl MediaHost {
    /// Host with the headless engine and full capabilities
    pub fn new(document: Document) -> Self {
        Self::with_engine(document, HeadlessEngine::new(), Capabilities::default())
    }

    pub fn with_engine(
        document: Document,
        engine: impl PlaybackEngine + 'static,
        capabilities: Capabilities,
    ) -> Self {
        let blobs = BlobStore::new(document.url());
        Self {
            document,
            media: HashMap::new(),
            engine: Box::new(engine),
            blobs,
            capabilities,
            jobs: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Media state of a `<video>`/`<audio>` element that has been rendered into
    pub fn media_element(&self, node: NodeId) -> Option<&HTMLMediaElement> {
        self.media.get(&node)
    }

    pub fn media_element_mut(&mut self, node: NodeId) -> Option<&mut HTMLMediaElement> {
        self.media.get_mut(&node)
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Render `file` into an existing element, whose tag must be the one
    /// the file's extension calls for.
    pub fn render<F, C>(
        &mut self,
        file: F,
        target: impl Into<RenderTarget>,
        options: RenderOptions,
        callback: C,
    ) -> Result<(), ValidationError>
    where
        F: FileResource + 'static,
        C: FnOnce(Result<NodeId, RenderError>) + 'static,
    {
        let extension = checked_extension(&file)?;
        let category = ContentCategory::classify(&extension);
        let kind = category.element_kind(&extension);

        let target: RenderTarget = target.into();
        let node = match &target {
            RenderTarget::Element(id) => *id,
            RenderTarget::Selector(selector) => self
                .document
                .query_selector(selector)
                .ok_or_else(|| ValidationError::TargetNotFound(target.to_string()))?,
        };
        if !self.document.contains(node) {
            return Err(ValidationError::TargetNotFound(target.to_string()));
        }
        let found = self
            .document
            .tag_name(node)
            .ok_or(ValidationError::NotAnElement(node))?;
        if found != kind.tag_name() {
            return Err(ValidationError::TagMismatch {
                extension,
                found: found.to_string(),
                expected: kind.tag_name(),
            });
        }

        self.enqueue(file, extension, category, kind, node, Placement::Existing, options, callback);
        Ok(())
    }

    /// Create the element the file calls for, append it to `parent` and
    /// render into it.
    pub fn append<F, C>(
        &mut self,
        file: F,
        parent: NodeId,
        options: RenderOptions,
        callback: C,
    ) -> Result<(), ValidationError>
    where
        F: FileResource + 'static,
        C: FnOnce(Result<NodeId, RenderError>) + 'static,
    {
        let extension = checked_extension(&file)?;
        if !self.document.contains(parent) {
            return Err(ValidationError::TargetNotFound(parent.to_string()));
        }
        let parent_tag = self
            .document
            .tag_name(parent)
            .ok_or(ValidationError::NotAnElement(parent))?;
        if matches!(parent_tag, "video" | "audio") {
            return Err(ValidationError::InvalidParent {
                tag: parent_tag.to_string(),
            });
        }

        let category = ContentCategory::classify(&extension);
        let kind = category.element_kind(&extension);
        let node = self.document.create_element(kind.tag_name());
        if let Err(e) = self.document.append_child(parent, node) {
            tracing::debug!(parent = %parent, error = %e, "append rejected");
            let tag = parent_tag_name(&self.document, parent);
            if let Err(e) = self.document.destroy_node(node) {
                tracing::debug!(node = %node, error = %e, "could not free rejected element");
            }
            return Err(ValidationError::InvalidParent { tag });
        }

        self.enqueue(file, extension, category, kind, node, Placement::Appended, options, callback);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn enqueue<F, C>(
        &mut self,
        file: F,
        extension: String,
        category: ContentCategory,
        kind: ElementKind,
        node: NodeId,
        placement: Placement,
        options: RenderOptions,
        callback: C,
    ) where
        F: FileResource + 'static,
        C: FnOnce(Result<NodeId, RenderError>) + 'static,
    {
        self.prepare_element(node, kind, &options);
        tracing::debug!(file = file.name(), node = %node, ?category, "render queued");
        self.jobs.push(RenderJob {
            file: Box::new(file),
            extension,
            category,
            options,
            node,
            placement,
            stage: Stage::Pending,
            completion: Some(Completion(Box::new(callback))),
        });
    }

    /// Reflect the options on a media element, before any adapter attaches
    fn prepare_element(&mut self, node: NodeId, kind: ElementKind, options: &RenderOptions) {
        let media_kind = match kind {
            ElementKind::Video => MediaKind::Video,
            ElementKind::Audio => MediaKind::Audio,
            _ => return,
        };
        let media = self
            .media
            .entry(node)
            .or_insert_with(|| HTMLMediaElement::new(media_kind));
        media.controls = options.controls;
        media.muted = options.muted;
        media.autoplay = options.autoplay;

        if let Some(element) = self.document.element_mut(node) {
            element.attrs.set_flag("controls", options.controls);
            element.attrs.set_flag("muted", options.muted);
            element.attrs.set_flag("autoplay", options.autoplay);
        }
    }

    /// One loop turn: every job does one unit of work, then all queued
    /// events are delivered. Returns false if nothing happened.
    pub fn tick(&mut self) -> bool {
        let mut jobs = std::mem::take(&mut self.jobs);
        let mut progressed = false;

        let mut cx = RenderContext {
            document: &mut self.document,
            media: &mut self.media,
            engine: self.engine.as_mut(),
            blobs: &mut self.blobs,
            capabilities: self.capabilities,
        };

        for job in jobs.iter_mut() {
            if !cx.document.contains(job.node) {
                job.retire(&mut cx);
                progressed = true;
            }
        }
        jobs.retain(|job| !job.is_done());
        cx.forget_discarded();

        for job in jobs.iter_mut() {
            progressed |= job.step(&mut cx);
        }

        while let Some(event) = cx.document.next_event() {
            progressed = true;
            let reached = cx.document.listeners().listeners_for(event.target, event.event_type);
            let mut claimed = false;
            for job in jobs.iter_mut() {
                claimed |= job.handle_event(&event, &reached, &mut cx);
            }
            if !claimed && event.event_type == EventType::Error {
                let message = cx.error_message(event.target).unwrap_or_default();
                tracing::warn!(node = %event.target, error = %message, "media error after render completed");
            }
        }

        jobs.retain(|job| !job.is_done());
        jobs.append(&mut self.jobs);
        self.jobs = jobs;
        progressed
    }

    /// Turn the loop until no job can make progress. Returns the number of
    /// turns taken.
    pub fn run_until_idle(&mut self) -> usize {
        let mut turns = 0;
        while self.tick() {
            turns += 1;
        }
        turns
    }

    /// Renders that have not finished feeding their element
    pub fn pending_renders(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty() && !self.document.has_pending_events()
    }
}

fn checked_extension(file: &dyn FileResource) -> Result<String, ValidationError> {
    if file.name().is_empty() {
        return Err(ValidationError::MissingName);
    }
    Ok(extension_of(file.name()))
}

fn parent_tag_name(document: &Document, parent: NodeId) -> String {
    document.tag_name(parent).unwrap_or_default().to_string()
}
