mod component;
mod layout;

pub use component::NetworkView;
