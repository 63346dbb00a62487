//! Raw stack capture and lazy symbolic resolution.

use std::ffi::c_void;
use std::fmt;

use once_cell::sync::OnceCell;

/// Extra raw frames traced beyond `max_depth` to make room for the
/// unwinder's and this crate's own frames before the marker is found.
const INTERNAL_HEADROOM: usize = 16;

/// One resolved frame of a captured stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    file: String,
    line: u32,
    function: String,
    program_counter: usize,
}

impl StackFrame {
    /// Source file path, empty when unknown
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, 0 when unknown
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Demangled function name, empty when unknown
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    fn resolve(program_counter: usize) -> Self {
        let mut frame = StackFrame {
            file: String::new(),
            line: 0,
            function: String::new(),
            program_counter,
        };
        let mut resolved = false;
        // Inlined calls report several symbols for one address; keep the innermost.
        backtrace::resolve(program_counter as *mut c_void, |symbol| {
            if resolved {
                return;
            }
            resolved = true;
            if let Some(name) = symbol.name() {
                frame.function = name.to_string();
            }
            if let Some(path) = symbol.filename() {
                frame.file = path.display().to_string();
            }
            frame.line = symbol.lineno().unwrap_or(0);
        });
        frame
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let function = if self.function.is_empty() {
            "<unknown>"
        } else {
            &self.function
        };
        write!(f, "{}", function)?;
        if !self.file.is_empty() {
            write!(f, " at {}:{}", self.file, self.line)?;
        }
        Ok(())
    }
}

/// Program counters recorded at capture time plus their memoized resolution.
pub(crate) struct Stack {
    pcs: Vec<usize>,
    frames: OnceCell<Vec<StackFrame>>,
}

impl Stack {
    /// Capture the current stack.
    ///
    /// Drops this function's own frame and then `skip` more frames (the
    /// crate's public entry points), keeping at most `max_depth`.
    #[inline(never)]
    pub(crate) fn capture(skip: usize, max_depth: usize) -> Stack {
        let marker = Stack::capture as usize;
        let limit = max_depth + skip + INTERNAL_HEADROOM;
        let mut raw = Vec::with_capacity(limit);
        let mut marker_at = None;

        backtrace::trace(|frame| {
            if marker_at.is_none() && frame.symbol_address() as usize == marker {
                marker_at = Some(raw.len());
            }
            raw.push(frame.ip() as usize);
            raw.len() < limit
        });

        let start = match marker_at {
            Some(index) if index + 1 + skip < raw.len() => index + 1 + skip,
            _ => {
                tracing::warn!(
                    traced = raw.len(),
                    "apperr capture marker not found, keeping full stack"
                );
                0
            }
        };
        let pcs: Vec<usize> = raw.into_iter().skip(start).take(max_depth).collect();
        tracing::trace!(depth = pcs.len(), skip = start, "apperr stack captured");

        Stack {
            pcs,
            frames: OnceCell::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pcs.len()
    }

    pub(crate) fn frames(&self) -> &[StackFrame] {
        self.frames.get_or_init(|| {
            let frames: Vec<StackFrame> =
                self.pcs.iter().copied().map(StackFrame::resolve).collect();
            tracing::trace!(frames = frames.len(), "apperr stack resolved");
            frames
        })
    }
}
