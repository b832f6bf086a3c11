//! An internal module for casting between types.
//!
//! This serves as a wrapper around `bytemuck` to provide panic safety. All
//! functions in this module are guaranteed to be safe and **NEVER** panic,
//! because source and target always have the same size and alignment.

/// Views 16 interleaved RGBA pixels as an array of pixels.
pub(crate) fn as_pixels<T: bytemuck::Pod>(data: &[T; 64]) -> &[[T; 4]; 16] {
    bytemuck::cast_ref(data)
}
