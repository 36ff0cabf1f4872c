pub(crate) mod blend;
pub(crate) mod order;
pub(crate) mod pipeline;
pub(crate) mod text;
