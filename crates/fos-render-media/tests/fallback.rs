//! Fallback machine tests driven by a scripted playback engine
//!
//! Strategy order, position carry-over, autoplay and the single-fire
//! completion guarantee.

mod common;

use common::*;
use fos_dom::Document;
use fos_render_media::*;

fn host(engine: ScriptedEngine, media_source: bool) -> MediaHost {
    init_tracing();
    MediaHost::with_engine(Document::default(), engine, Capabilities::new(media_source))
}

fn settle(host: &mut MediaHost) {
    host.run_until_idle();
    // Further turns must not produce anything new
    for _ in 0..3 {
        host.tick();
    }
}

// ============================================================================
// STRATEGY ORDER
// ============================================================================

#[test]
fn test_clip_mp4_without_media_source_skips_to_blob() {
    let engine = ScriptedEngine::new().on("stream", Script::Fail).on("blob", Script::Play);
    let log = engine.log_handle();
    let mut host = host(engine, false);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert_eq!(attaches(&log), vec!["attach stream", "attach blob"]);
    let results = results.borrow();
    assert_eq!(results.len(), 1);
    let node = *results[0].as_ref().unwrap();
    assert_eq!(host.document().tag_name(node), Some("video"));
    assert!(host.document().get_attribute(node, "src").unwrap().starts_with("blob:"));
}

#[test]
fn test_first_strategy_depends_on_extension() {
    for (name, media_source, first) in [
        ("clip.mp4", true, "attach stream"),
        ("clip.webm", true, "attach media-source"),
        ("clip.webm", false, "attach stream"),
        ("song.mp3", true, "attach media-source"),
        ("song.m4a", true, "attach stream"),
        ("film.mov", true, "attach blob"),
    ] {
        let engine = ScriptedEngine::new()
            .on("stream", Script::Play)
            .on("media-source", Script::Play)
            .on("blob", Script::Play);
        let log = engine.log_handle();
        let mut host = host(engine, media_source);
        let body = host.document().body();

        let (results, callback) = recorder();
        host.append(MemoryFile::new(name, MP4.to_vec()), body, RenderOptions::default(), callback)
            .unwrap();
        settle(&mut host);

        assert_eq!(attaches(&log), vec![first], "{name} (mse: {media_source})");
        assert!(results.borrow()[0].is_ok());
    }
}

#[test]
fn test_fallback_never_repeats_a_strategy() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::Fail)
        .on("media-source", Script::Fail)
        .on("blob", Script::Play);
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.m4v", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert_eq!(attaches(&log), vec!["attach stream", "attach media-source", "attach blob"]);
    assert_eq!(log.borrow().iter().filter(|l| *l == "detach").count(), 2);
    assert!(results.borrow()[0].is_ok());
}

// ============================================================================
// EXACTLY-ONCE COMPLETION
// ============================================================================

#[test]
fn test_callback_once_when_first_succeeds() {
    let engine = ScriptedEngine::new().on("stream", Script::Play).on("media-source", Script::Fail);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.repeat(8)), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert_eq!(results.borrow().len(), 1);
    assert!(results.borrow()[0].is_ok());
    assert!(host.is_idle());
}

#[test]
fn test_callback_once_when_last_succeeds() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::Fail)
        .on("media-source", Script::Fail)
        .on("blob", Script::Play);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert_eq!(results.borrow().len(), 1);
    assert!(results.borrow()[0].is_ok());
}

#[test]
fn test_callback_once_when_all_fail() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::Fail)
        .on("media-source", Script::Fail)
        .on("blob", Script::Fail);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    let results = results.borrow();
    assert_eq!(results.len(), 1);
    let err = results[0].as_ref().unwrap_err();
    assert!(matches!(
        err.kind(),
        RenderErrorKind::Playback { strategy: Strategy::BlobUrl, message } if message == "scripted failure"
    ));
    assert!(err.to_string().starts_with("Error rendering file \"clip.mp4\""));

    // The appended element and its blob URL are gone again
    assert!(host.document().tree().children(body).is_empty());
    assert!(host.blobs().is_empty());
}

#[test]
fn test_silent_engine_leaves_render_pending() {
    let engine = ScriptedEngine::new().on("media-source", Script::Silent);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.webm", MKV.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert!(results.borrow().is_empty());
    assert_eq!(host.pending_renders(), 1);
    assert!(!host.is_idle());
}

// ============================================================================
// POSITION CARRY-OVER
// ============================================================================

#[test]
fn test_position_reapplied_after_fallback() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::ProgressThenFail(42.5))
        .on("media-source", Script::Play);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    let node = *results.borrow()[0].as_ref().unwrap();
    let media = host.media_element(node).unwrap();
    assert_eq!(media.current_time, 42.5);
    assert!(media.error.is_none());
}

#[test]
fn test_no_position_is_fabricated() {
    let engine = ScriptedEngine::new().on("stream", Script::Fail).on("media-source", Script::Play);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    let node = *results.borrow()[0].as_ref().unwrap();
    assert_eq!(host.media_element(node).unwrap().current_time, 0.0);
}

// ============================================================================
// AUTOPLAY
// ============================================================================

#[test]
fn test_autoplay_starts_playback() {
    let engine = ScriptedEngine::new().on("stream", Script::Play);
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    let opts = RenderOptions::default().with_autoplay(true).with_muted(true);
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, opts, callback).unwrap();
    settle(&mut host);

    let node = *results.borrow()[0].as_ref().unwrap();
    let media = host.media_element(node).unwrap();
    assert!(!media.paused);
    assert!(media.autoplay && media.muted && media.controls);
    assert!(log.borrow().contains(&"play".to_string()));
    assert_eq!(host.document().get_attribute(node, "autoplay"), Some(""));
    assert_eq!(host.document().get_attribute(node, "muted"), Some(""));
}

#[test]
fn test_autoplay_rejection_is_fatal() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::Play)
        .on("media-source", Script::Play)
        .rejecting_play();
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    let opts = RenderOptions::default().with_autoplay(true);
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, opts, callback).unwrap();
    settle(&mut host);

    let results = results.borrow();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0].as_ref().unwrap_err().kind(),
        RenderErrorKind::AutoplayRejected(_)
    ));
    // No fallback after a rejection
    assert_eq!(attaches(&log), vec!["attach stream"]);
}

#[test]
fn test_no_play_without_autoplay() {
    let engine = ScriptedEngine::new().on("stream", Script::Play).rejecting_play();
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("clip.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    assert!(results.borrow()[0].is_ok());
    assert!(!log.borrow().contains(&"play".to_string()));
}

// ============================================================================
// LENGTH GUARD
// ============================================================================

#[test]
fn test_oversize_rejected_before_any_read() {
    let engine = ScriptedEngine::new().on("blob", Script::Play);
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let file = CountingFile::new(MemoryFile::new("film.mov", vec![0u8; 64]));
    let opens = file.opens.clone();
    let (results, callback) = recorder();
    let opts = RenderOptions::default().with_max_resource_length(10);
    host.append(file, body, opts, callback).unwrap();
    settle(&mut host);

    assert_eq!(opens.get(), 0);
    assert!(attaches(&log).is_empty());
    let results = results.borrow();
    let err = results[0].as_ref().unwrap_err();
    assert!(matches!(err.kind(), RenderErrorKind::ResourceTooLarge { length: 64, max: 10 }));
    assert!(err.to_string().contains("File length too large for Blob URL approach: 64 (max: 10)"));
}

#[test]
fn test_oversize_after_stream_failures() {
    let engine = ScriptedEngine::new().on("media-source", Script::Fail);
    let mut host = host(engine, true);
    let body = host.document().body();

    let file = CountingFile::new(MemoryFile::new("clip.webm", MKV.repeat(4)));
    let opens = file.opens.clone();
    let (results, callback) = recorder();
    let opts = RenderOptions::default().with_max_resource_length(10);
    host.append(file, body, opts, callback).unwrap();
    settle(&mut host);

    // Only the media source attempt opened the file
    assert_eq!(opens.get(), 1);
    assert!(matches!(
        results.borrow()[0].as_ref().unwrap_err().kind(),
        RenderErrorKind::ResourceTooLarge { .. }
    ));
}

#[test]
fn test_unknown_length_is_never_rejected() {
    let engine = ScriptedEngine::new().on("blob", Script::Play);
    let mut host = host(engine, true);
    let body = host.document().body();

    let file = MemoryFile::new("film.mov", vec![1u8; 64]).without_length();
    let (results, callback) = recorder();
    let opts = RenderOptions::default().with_max_resource_length(10);
    host.append(file, body, opts, callback).unwrap();
    settle(&mut host);

    assert!(results.borrow()[0].is_ok());
}

// ============================================================================
// READ ERRORS
// ============================================================================

#[test]
fn test_read_errors_fall_through_to_final_error() {
    let engine = ScriptedEngine::new();
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(BrokenFile("clip.mp4"), body, RenderOptions::default(), callback).unwrap();
    settle(&mut host);

    assert_eq!(attaches(&log), vec!["attach stream", "attach media-source"]);
    let results = results.borrow();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0].as_ref().unwrap_err().kind(), RenderErrorKind::Io(_)));
}

// ============================================================================
// ELEMENT REUSE AND DISCARD
// ============================================================================

#[test]
fn test_new_render_overtakes_unfinished_one() {
    let engine = ScriptedEngine::new()
        .on("stream", Script::Silent)
        .on("media-source", Script::Play);
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (first, callback) = recorder();
    host.append(MemoryFile::new("a.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    host.tick();
    let node = host.document().tree().children(body)[0];

    let (second, callback) = recorder();
    host.render(MemoryFile::new("b.webm", MKV.to_vec()), node, RenderOptions::default(), callback)
        .unwrap();
    settle(&mut host);

    let first = first.borrow();
    assert_eq!(first.len(), 1);
    assert!(matches!(first[0].as_ref().unwrap_err().kind(), RenderErrorKind::Superseded));
    assert_eq!(*second.borrow()[0].as_ref().unwrap(), node);

    // The overtaken render leaves the element and its new source alone
    assert!(host.document().contains(node));
    assert_eq!(attaches(&log), vec!["attach stream", "attach media-source"]);
    assert!(!log.borrow().contains(&"detach".to_string()));
    assert!(host.is_idle());
}

#[test]
fn test_discarded_element_retires_its_render() {
    let engine = ScriptedEngine::new().on("stream", Script::Silent);
    let log = engine.log_handle();
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("a.mp4", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    host.tick();
    let node = host.document().tree().children(body)[0];
    assert_eq!(host.pending_renders(), 1);

    host.document_mut().destroy_node(node).unwrap();
    settle(&mut host);

    assert!(results.borrow().is_empty());
    assert_eq!(host.pending_renders(), 0);
    assert!(host.is_idle());
    assert!(host.media_element(node).is_none());
    assert_eq!(log.borrow().last().map(String::as_str), Some("detach"));
}

#[test]
fn test_discarded_element_revokes_its_blob_url() {
    let engine = ScriptedEngine::new().on("blob", Script::Silent);
    let mut host = host(engine, true);
    let body = host.document().body();

    let (results, callback) = recorder();
    host.append(MemoryFile::new("film.mov", MP4.to_vec()), body, RenderOptions::default(), callback)
        .unwrap();
    host.tick();
    assert_eq!(host.blobs().len(), 1);

    let node = host.document().tree().children(body)[0];
    host.document_mut().destroy_node(node).unwrap();
    settle(&mut host);

    assert!(results.borrow().is_empty());
    assert!(host.blobs().is_empty());
    assert!(host.is_idle());
}
