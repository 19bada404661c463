//! Stack growth for deeply recursive compiler passes.
//!
//! The parser's precedence cascade and the lowering walk both recurse once
//! per nesting level of the source. Pathological inputs (a thousand nested
//! parentheses, long `elif` chains) would overflow the default thread stack,
//! so the recursive entry points run inside [`ensure_sufficient_stack`].
//!
//! On native targets the stack is grown with `stacker`; on `wasm32` the
//! closure is simply invoked.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `wasm32` manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
