use std::cell::OnceCell;
use std::fmt;

/// One entry of a call stack, as far as call-site resolution cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Source file as reported by debug info.
    pub file: String,
    pub line: u32,
    /// Demangled symbol name, when the unwinder could resolve one.
    pub symbol: Option<String>,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Random access to a call stack, innermost frame first.
///
/// `frame(0)` is the point where the stack was taken. `None` means the
/// stack is exhausted.
pub trait FrameSource {
    fn frame(&self, skip: usize) -> Option<&Frame>;
}

impl FrameSource for Vec<Frame> {
    fn frame(&self, skip: usize) -> Option<&Frame> {
        self.get(skip)
    }
}

/// Frames of the live call stack, captured with the `backtrace` crate.
///
/// Inlined functions are flattened into their own frames and frames without
/// a source location are dropped. The unwinder's own frames are cut from the
/// top, so index 0 is the frame of [`StackFrames::capture`] itself and
/// index 1 its caller.
///
/// Only the walk happens at capture time. Symbols are resolved on demand,
/// one physical frame at a time, up to the deepest index requested.
#[derive(Debug, Clone, Default)]
pub struct StackFrames {
    raw: Vec<backtrace::Frame>,
    resolved: Vec<OnceCell<Vec<Frame>>>,
}

impl StackFrames {
    /// Walk at most `limit` physical frames of the current thread's stack.
    #[inline(never)]
    pub fn capture(limit: usize) -> Self {
        let mut raw = Vec::new();
        backtrace::trace(|frame| {
            raw.push(frame.clone());
            raw.len() < limit
        });
        let resolved = raw.iter().map(|_| OnceCell::new()).collect();
        Self { raw, resolved }
    }

    /// Number of frames; resolves the whole stack.
    pub fn len(&self) -> usize {
        self.frames().count()
    }

    pub fn is_empty(&self) -> bool {
        self.frames().next().is_none()
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.raw
            .iter()
            .zip(&self.resolved)
            .flat_map(|(raw, cell)| cell.get_or_init(|| resolve(raw)))
            .skip_while(|frame| frame.symbol.as_deref().map_or(true, is_unwinder_symbol))
    }
}

impl FrameSource for StackFrames {
    fn frame(&self, skip: usize) -> Option<&Frame> {
        self.frames().nth(skip)
    }
}

/// Source-located frames of one physical frame, innermost inlined call
/// first.
fn resolve(raw: &backtrace::Frame) -> Vec<Frame> {
    let mut frames = Vec::new();
    backtrace::resolve_frame(raw, |symbol| {
        let (Some(file), Some(line)) = (symbol.filename(), symbol.lineno()) else {
            return;
        };
        frames.push(Frame {
            file: file.to_string_lossy().into_owned(),
            line,
            symbol: symbol.name().map(|n| format!("{n:#}")),
        });
    });
    frames
}

fn is_unwinder_symbol(name: &str) -> bool {
    name.trim_start_matches('<').starts_with("backtrace::")
}
