pub mod renderer;
pub mod selector;
