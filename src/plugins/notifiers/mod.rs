// Notifier implementations
pub mod discord;

pub use discord::DiscordNotifier;
