pub(crate) mod color;
pub(crate) mod font;
pub(crate) mod loader;
