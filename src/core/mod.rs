//! Core timeline logic: coordinate math, hit-testing, mouse interaction and
//! notch sourcing. Nothing here touches the GPU.

pub mod interaction;
pub mod notch_source;
pub mod transform;
