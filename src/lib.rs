//! GlossCore: Vocabulary Annotation Engine
//!
//! A Rust/WASM implementation of the reader's vocabulary highlighting pipeline.
//! Every UI surface (editor preview, presentation view, vocabulary
//! cross-reference) calls the same pure functions instead of keeping its own
//! copy of the matcher.
//!
//! # Architecture
//!
//! ## Highlight Components
//! - `tokenizer.rs` - Tokenizer: word/punctuation/whitespace split with trailing-mark merge
//! - `pattern.rs` - Pattern compiler: term + variants → ordered word-sequence parts
//! - `matcher.rs` - SpanMatcher: longest-term priority, first-claim-wins ownership
//! - `grouper.rs` - Phrase grouper: same-owner runs → `MatchSpan`
//! - `engine.rs` - `compute_highlights` + memoizing `HighlightCortex`
//! - `change.rs` - Fingerprint-based change detection for the cortex cache
//!
//! ## Scope Components
//! - `resolver.rs` - Local + shared vocabulary merge with exclusions
//! - `library.rs` - In-memory vocabulary library (exclusion hooks, search, stats)
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { computeHighlights, resolveScope } from 'glosscore';
//!
//! await init();
//!
//! const view = resolveScope(3, corpus, ['light']);
//! const result = computeHighlights(
//!   "She will explain this fact in detail.",
//!   view.effective_entries,
//! );
//!
//! console.log(result.tokens);  // word / punctuation / whitespace segments
//! console.log(result.spans);   // { entry_id, start, end, first_token, last_token }
//! ```

pub mod highlight;
pub mod scope;

// Public exports - Highlight
pub use highlight::*;

// Public exports - Scope
pub use scope::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("glosscore v{}", env!("CARGO_PKG_VERSION"))
}
