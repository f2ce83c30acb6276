//! Strategy Dispatcher
//!
//! Drives the playback strategies for one audio/video render in priority
//! order. Every attempt attaches one adapter and listens on the element;
//! an `error` event falls back to the next strategy, `loadedmetadata`
//! ends the render successfully.
//!
//! ```text
//! Idle --Start--> Attempting(0) --error--> FallingBack(0) --Start--> Attempting(1) ...
//!                      |                                                  |
//!               loadedmetadata                                     error (last)
//!                      v                                                  v
//!                  Succeeded                                       FatallyFailed
//! ```

use fos_dom::{Event, EventType, ListenerId, NodeId};
use fos_media::{Capabilities, MediaError};

use crate::adapters::{self, PlaybackAdapter, Strategy};
use crate::classify::{is_direct_stream_eligible, ContentCategory};
use crate::context::RenderContext;
use crate::error::RenderErrorKind;
use crate::file::FileResource;
use crate::options::RenderOptions;
use crate::session::PlaybackSession;

/// Strategies to try for a media file, strongest first
pub fn strategy_plan(extension: &str, category: ContentCategory, caps: Capabilities) -> Vec<Strategy> {
    if !category.is_streaming() {
        return vec![Strategy::BlobUrl];
    }

    let mut plan = Vec::with_capacity(3);
    if !caps.media_source || is_direct_stream_eligible(extension) {
        plan.push(Strategy::DirectStream);
    }
    if caps.media_source {
        plan.push(Strategy::MediaSource);
    }
    plan.push(Strategy::BlobUrl);
    plan
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchState {
    Idle,
    Attempting(usize),
    /// Attempt `n` failed and its adapter is being torn down
    FallingBack(usize),
    Succeeded,
    FatallyFailed,
}

#[derive(Debug)]
pub(crate) enum Signal {
    Start,
    /// `loadstart`
    BeganLoading,
    /// `progress`
    Progress,
    /// `loadedmetadata`
    Playable,
    /// `error`
    Failed,
    AutoplayRejected(MediaError),
}

impl Signal {
    fn from_event(event_type: EventType) -> Option<Self> {
        match event_type {
            EventType::LoadStart => Some(Self::BeganLoading),
            EventType::Progress => Some(Self::Progress),
            EventType::LoadedMetadata => Some(Self::Playable),
            EventType::Error => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Attach(usize),
    Autoplay,
    Capture,
    Succeed,
    FallBack,
    Fail,
    Ignore,
}

/// Transition function of the fallback machine
pub(crate) fn transition(state: DispatchState, signal: &Signal, plan_len: usize) -> (DispatchState, Action) {
    use DispatchState::*;

    match (state, signal) {
        (Idle, Signal::Start) if plan_len > 0 => (Attempting(0), Action::Attach(0)),
        (Idle, Signal::Start) => (FatallyFailed, Action::Fail),
        (FallingBack(i), Signal::Start) => (Attempting(i + 1), Action::Attach(i + 1)),
        (Attempting(i), Signal::BeganLoading) => (Attempting(i), Action::Autoplay),
        (Attempting(i), Signal::Progress) => (Attempting(i), Action::Capture),
        (Attempting(_), Signal::Playable) => (Succeeded, Action::Succeed),
        (Attempting(i), Signal::Failed) if i + 1 < plan_len => (FallingBack(i), Action::FallBack),
        (Attempting(_), Signal::Failed | Signal::AutoplayRejected(_)) => (FatallyFailed, Action::Fail),
        (state, _) => (state, Action::Ignore),
    }
}

/// Result of feeding the dispatcher
#[derive(Debug)]
pub(crate) enum Outcome {
    Pending,
    Succeeded,
    Failed(RenderErrorKind),
}

pub(crate) struct StrategyDispatcher {
    extension: String,
    options: RenderOptions,
    plan: Vec<Strategy>,
    state: DispatchState,
    session: PlaybackSession,
    adapter: Option<Box<dyn PlaybackAdapter>>,
    attempted: Vec<Strategy>,
    /// Source generation of the element for the current attempt
    generation: u32,
}

impl StrategyDispatcher {
    pub fn new(
        element: NodeId,
        extension: &str,
        category: ContentCategory,
        options: RenderOptions,
        caps: Capabilities,
    ) -> Self {
        let plan = strategy_plan(extension, category, caps);
        tracing::debug!(node = %element, extension, ?plan, "strategy plan");
        Self {
            extension: extension.to_string(),
            options,
            plan,
            state: DispatchState::Idle,
            session: PlaybackSession::new(element),
            adapter: None,
            attempted: Vec::new(),
            generation: 0,
        }
    }

    pub fn start(&mut self, file: &dyn FileResource, cx: &mut RenderContext<'_>) -> Outcome {
        self.step(Signal::Start, file, cx)
    }

    /// Feed the active adapter. False once it has nothing left to send.
    pub fn pump(&mut self, cx: &mut RenderContext<'_>) -> bool {
        let node = self.session.element();
        self.adapter.as_mut().is_some_and(|adapter| adapter.pump(node, cx))
    }

    /// Handle a DOM event that reached the listeners in `reached`
    pub fn handle_event(
        &mut self,
        event: &Event,
        reached: &[ListenerId],
        file: &dyn FileResource,
        cx: &mut RenderContext<'_>,
    ) -> Outcome {
        if !self.session.owns(reached) {
            return Outcome::Pending;
        }
        if event.generation != self.generation {
            tracing::trace!(node = %event.target, event = %event.event_type, "stale event ignored");
            return Outcome::Pending;
        }
        match Signal::from_event(event.event_type) {
            Some(signal) => self.step(signal, file, cx),
            None => Outcome::Pending,
        }
    }

    /// Whether `reached` includes one of this render's listeners
    pub fn listens_to(&self, reached: &[ListenerId]) -> bool {
        self.session.owns(reached)
    }

    /// True once the element carries a source this render did not attach
    pub fn is_superseded(&self, cx: &RenderContext<'_>) -> bool {
        self.adapter.is_some()
            && cx
                .media
                .get(&self.session.element())
                .is_none_or(|media| media.generation != self.generation)
    }

    /// Drop the current attempt without touching the element's source
    pub fn release(&mut self, cx: &mut RenderContext<'_>) {
        self.session.unlisten_all(cx.document);
        if let Some(mut adapter) = self.adapter.take() {
            adapter.release(cx);
        }
        self.session.complete();
    }

    fn step(&mut self, signal: Signal, file: &dyn FileResource, cx: &mut RenderContext<'_>) -> Outcome {
        let mut signal = signal;
        loop {
            let (next, action) = transition(self.state, &signal, self.plan.len());
            let previous = std::mem::replace(&mut self.state, next);
            let node = self.session.element();

            match action {
                Action::Ignore => return Outcome::Pending,
                Action::Capture => {
                    if let Some(media) = cx.media.get(&node) {
                        self.session.capture_position(media.current_time);
                    }
                    return Outcome::Pending;
                }
                Action::Autoplay => {
                    if !self.options.autoplay {
                        return Outcome::Pending;
                    }
                    // An errored element has its `error` event queued behind
                    // this one; that event decides the attempt.
                    if cx.media.get(&node).is_some_and(|m| m.error.is_some()) {
                        return Outcome::Pending;
                    }
                    match cx.play(node) {
                        Ok(()) => return Outcome::Pending,
                        Err(e) => {
                            tracing::debug!(node = %node, error = %e, "autoplay rejected");
                            signal = Signal::AutoplayRejected(e);
                        }
                    }
                }
                Action::Attach(index) => {
                    let mut adapter = adapters::build(self.plan[index], &self.extension, &self.options);
                    tracing::debug!(node = %node, strategy = %adapter.strategy(), attempt = index + 1, "attaching strategy");
                    self.attempted.push(adapter.strategy());
                    self.session.listen(cx.document);

                    let attached = adapter.attach(file, node, cx);
                    self.adapter = Some(adapter);
                    self.generation = cx.media.get(&node).map_or(0, |m| m.generation);

                    if let Err(kind) = attached {
                        self.state = DispatchState::FatallyFailed;
                        return self.fail(kind, cx);
                    }
                    return Outcome::Pending;
                }
                Action::FallBack => {
                    let DispatchState::Attempting(index) = previous else {
                        return Outcome::Pending;
                    };
                    let message = cx.error_message(node).unwrap_or_default();
                    tracing::warn!(
                        node = %node,
                        from = %self.plan[index],
                        to = %self.plan[index + 1],
                        error = %message,
                        "strategy failed, falling back"
                    );
                    self.teardown(cx);
                    self.session.advance();
                    signal = Signal::Start;
                }
                Action::Succeed => {
                    self.session.unlisten_all(cx.document);
                    if let Some(position) = self.session.take_restore() {
                        if let Some(media) = cx.media.get_mut(&node) {
                            media.seek(position);
                        }
                    }
                    self.session.complete();
                    tracing::info!(
                        node = %node,
                        strategy = %self.plan[self.session.strategy_index()],
                        "media playable"
                    );
                    return Outcome::Succeeded;
                }
                Action::Fail => {
                    let kind = match (signal, previous) {
                        (Signal::AutoplayRejected(e), _) => RenderErrorKind::AutoplayRejected(e),
                        (_, DispatchState::Attempting(index)) => RenderErrorKind::Playback {
                            strategy: self.plan[index],
                            message: cx
                                .error_message(node)
                                .unwrap_or_else(|| "media error".to_string()),
                        },
                        _ => RenderErrorKind::Playback {
                            strategy: Strategy::BlobUrl,
                            message: "no playback strategy available".to_string(),
                        },
                    };
                    return self.fail(kind, cx);
                }
            }
        }
    }

    fn fail(&mut self, kind: RenderErrorKind, cx: &mut RenderContext<'_>) -> Outcome {
        tracing::debug!(node = %self.session.element(), attempted = ?self.attempted, error = %kind, "render failed");
        self.teardown(cx);
        self.session.complete();
        Outcome::Failed(kind)
    }

    fn teardown(&mut self, cx: &mut RenderContext<'_>) {
        self.session.unlisten_all(cx.document);
        if let Some(mut adapter) = self.adapter.take() {
            adapter.detach(self.session.element(), cx);
        }
    }
}
