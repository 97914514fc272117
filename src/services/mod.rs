// Markwise services
// Persistence store, analysis client, model transport, and settings.

pub mod analysis_service;
pub mod gemini_client;
pub mod settings_engine;
pub mod storage_service;
