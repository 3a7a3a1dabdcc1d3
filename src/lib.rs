//! CollabDocs: document service, rich-text model and API client.
use actix_web::web;

pub mod client;
pub mod config;
pub mod models;
pub mod rich_text;
pub mod routes;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use config::Settings;
use utils::Storage;

// Shared state handed to every handler through web::Data
pub struct AppState {
    pub settings: Settings,
    pub storage: Storage,
}

impl AppState {
    pub fn new(settings: Settings) -> std::io::Result<Self> {
        let storage = Storage::open(&settings.storage_path)?;
        Ok(Self { settings, storage })
    }

    pub fn into_data(self) -> web::Data<AppState> {
        web::Data::new(self)
    }
}
