pub mod studio_client;
pub mod wardrobe_client;

pub use studio_client::StudioClient;
pub use wardrobe_client::WardrobeClient;
