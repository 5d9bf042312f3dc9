//! C2 — sequence kernels: translation, reverse complement, gap-affine
//! Needleman-Wunsch alignment. These are pure functions over byte slices, no
//! I/O, matching the teacher's preference for small hand-rolled numeric
//! kernels (`utils::math_utils`) over pulling in a heavyweight crate for
//! something the spec pins down exactly.

pub mod align;
pub mod revcomp;
pub mod translation;

pub use align::{align, GapMode, ScoringMatrix};
pub use revcomp::reverse_complement;
pub use translation::translate;
