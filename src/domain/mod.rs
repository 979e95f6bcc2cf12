pub mod category;
pub mod normalize;
pub mod record;
