pub mod extracted;
pub mod record;
