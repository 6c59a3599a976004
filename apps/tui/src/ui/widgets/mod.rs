pub mod periodic;
pub mod popup;
