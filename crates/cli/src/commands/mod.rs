pub mod block;
pub mod contextualize;
pub mod template;
pub mod translate;
