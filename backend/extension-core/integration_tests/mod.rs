mod config;
mod helpers;
mod platform_handler;
mod processor;
mod token_cache;
mod token_provider;
