pub mod annotated;
pub mod beat;
pub mod scene_state;
pub mod template;
