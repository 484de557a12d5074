pub mod avatar;
pub mod decode;
pub mod font;
pub mod store;
