pub mod crop;
pub mod speak;
pub mod text;
