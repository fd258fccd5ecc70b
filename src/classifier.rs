//! Decides which stack frames belong to the logging facility itself.
//!
//! The call-site resolver walks outward from its own invocation and must
//! step over every frame that is part of the facility (this crate, the
//! unwinder, the `tracing` dispatch machinery and the standard library glue
//! between them) before it reaches application code.

use crate::frame::Frame;
use regex::Regex;
use std::sync::LazyLock;

/// Source paths of facility frames.
///
/// Dependencies only count when they sit in a registry checkout
/// (`registry/src/<index>/backtrace-0.3.74/src/...`) or a `vendor/`
/// directory, and the standard library only under
/// `library/{std,core,alloc}/src`, so an application directory that
/// happens to share a crate's name stays visible.
static FACILITY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    let own_src = regex::escape(&format!("{}/src/", env!("CARGO_MANIFEST_DIR")));
    Regex::new(&format!(
        r"(?:[/\\]registry[/\\]src[/\\][^/\\]+[/\\](?:tracing-enrich|backtrace|tracing|tracing-core|tracing-subscriber)-\d+\.\d+\.\d+[^/\\]*|[/\\]vendor[/\\](?:tracing-enrich|backtrace|tracing|tracing-core|tracing-subscriber)(?:-\d+\.\d+\.\d+[^/\\]*)?)[/\\]src[/\\]|[/\\]library[/\\](?:std|core|alloc)[/\\]src[/\\]|^{own_src}"
    ))
    .expect("facility path regex is built from constants and must be valid")
});

/// Demangled symbols of this crate, including trait impls on its own types
/// (`<tracing_enrich::layer::EnrichLayer as ...>::on_event`). Covers frames
/// whose debug info carries a relative or remapped path.
static FACILITY_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<?tracing_enrich::")
        .expect("facility symbol regex is a compile-time constant and must be valid")
});

/// Predicate over stack frames: `true` when the frame must be skipped while
/// searching for the application's call site.
pub trait FrameClassifier: Send + Sync {
    fn is_internal(&self, frame: &Frame) -> bool;
}

impl<F> FrameClassifier for F
where
    F: Fn(&Frame) -> bool + Send + Sync,
{
    fn is_internal(&self, frame: &Frame) -> bool {
        self(frame)
    }
}

/// Default classifier recognising this crate and the machinery it is
/// reached through.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacilityClassifier;

impl FacilityClassifier {
    pub fn is_internal_path(path: &str) -> bool {
        FACILITY_PATH.is_match(path)
    }

    pub fn is_internal_symbol(symbol: &str) -> bool {
        FACILITY_SYMBOL.is_match(symbol)
    }
}

impl FrameClassifier for FacilityClassifier {
    fn is_internal(&self, frame: &Frame) -> bool {
        Self::is_internal_path(&frame.file)
            || frame
                .symbol
                .as_deref()
                .is_some_and(Self::is_internal_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_sources_are_internal() {
        let own = format!("{}/src/logger.rs", env!("CARGO_MANIFEST_DIR"));
        assert!(FacilityClassifier::is_internal_path(&own));
        assert!(FacilityClassifier::is_internal_path(
            "/home/u/.cargo/registry/src/index.crates.io-6f17d22bba15001f/tracing-enrich-0.1.0/src/pipeline.rs"
        ));
    }

    #[test]
    fn test_machinery_is_internal() {
        assert!(FacilityClassifier::is_internal_path(
            "/home/u/.cargo/registry/src/index.crates.io-6f17d22bba15001f/backtrace-0.3.74/src/backtrace/mod.rs"
        ));
        assert!(FacilityClassifier::is_internal_path(
            "/home/u/.cargo/registry/src/index.crates.io-6f17d22bba15001f/tracing-core-0.1.33/src/dispatcher.rs"
        ));
        assert!(FacilityClassifier::is_internal_path(
            "/rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/std/src/thread/local.rs"
        ));
        assert!(FacilityClassifier::is_internal_path(
            r"C:\Users\u\.cargo\registry\src\index\tracing-subscriber-0.3.19\src\layer\layered.rs"
        ));
        assert!(FacilityClassifier::is_internal_path("/build/app/vendor/tracing-core/src/dispatcher.rs"));
    }

    #[test]
    fn test_application_sources_are_not_internal() {
        assert!(!FacilityClassifier::is_internal_path("/home/u/app/pkg/service.rs"));
        assert!(!FacilityClassifier::is_internal_path("src/main.rs"));
        assert!(!FacilityClassifier::is_internal_path("/home/u/my-tracing-enrich-fork-tests/main.rs"));
        assert!(!FacilityClassifier::is_internal_path("/home/u/tracing-tools/src/lib.rs"));
        assert!(!FacilityClassifier::is_internal_path("/home/u/tracing/src/main.rs"));
        assert!(!FacilityClassifier::is_internal_path("/home/u/backtrace/src/lib.rs"));
        assert!(!FacilityClassifier::is_internal_path(r"D:\code\tracing-subscriber\src\main.rs"));
        assert!(!FacilityClassifier::is_internal_path("/home/u/library/stdlib/src/lib.rs"));
        let own_tests = format!("{}/tests/callsite.rs", env!("CARGO_MANIFEST_DIR"));
        assert!(!FacilityClassifier::is_internal_path(&own_tests));
    }

    #[test]
    fn test_symbol_signal() {
        let classifier = FacilityClassifier;
        let relative = Frame::new("src/pipeline.rs", 12)
            .with_symbol("tracing_enrich::pipeline::Pipeline::run");
        assert!(classifier.is_internal(&relative));

        let trait_impl = Frame::new("src/layer.rs", 40).with_symbol(
            "<tracing_enrich::layer::EnrichLayer as tracing_subscriber::layer::Layer<S>>::on_event",
        );
        assert!(classifier.is_internal(&trait_impl));

        let app = Frame::new("src/main.rs", 7)
            .with_symbol("<app::Service as core::fmt::Display>::fmt");
        assert!(!classifier.is_internal(&app));
    }

    #[test]
    fn test_impls_on_std_types_are_application_code() {
        let classifier = FacilityClassifier;
        let on_option = Frame::new("/home/u/app/src/ext.rs", 12)
            .with_symbol("<core::option::Option<T> as app::ext::LogMissing>::log_missing");
        assert!(!classifier.is_internal(&on_option));

        let on_vec = Frame::new("/home/u/app/src/ext.rs", 30)
            .with_symbol("<alloc::vec::Vec<T> as app::ext::Report>::report");
        assert!(!classifier.is_internal(&on_vec));

        let std_glue = Frame::new(
            "/rustc/90b35a6239c3d8bdabc530a6a0816f7ff89a0aaf/library/core/src/ops/function.rs",
            250,
        )
        .with_symbol("core::ops::function::FnOnce::call_once");
        assert!(classifier.is_internal(&std_glue));
    }

    #[test]
    fn test_closure_classifier() {
        let only_wrappers = |frame: &Frame| frame.file.ends_with("wrapper.rs");
        assert!(only_wrappers.is_internal(&Frame::new("lib/wrapper.rs", 3)));
        assert!(!only_wrappers.is_internal(&Frame::new("lib/main.rs", 3)));
    }
}
