//! RPC method handler for the Markwise JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches a call to the repository, add flow, library
//! view, or settings engine held by `App`.

use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Value};

use crate::app::App;
use crate::managers::add_bookmark_flow::AddBookmarkFlow;
use crate::managers::bookmark_manager::BookmarkRepositoryTrait;
use crate::managers::library_view::{
    category_counts, embed_code, is_embed_request, render_embed_html, tag_counts, LibraryFilter,
    TimeWindow,
};
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{Bookmark, BookmarkFormData};

fn str_param<'p>(params: &'p Value, name: &str) -> Option<&'p str> {
    params.get(name).and_then(|v| v.as_str())
}

fn filter_from_params(params: &Value) -> LibraryFilter {
    LibraryFilter {
        query: str_param(params, "query").map(str::to_string),
        category: str_param(params, "category").map(str::to_string),
        tag: str_param(params, "tag").map(str::to_string),
        window: params
            .get("recent_days")
            .and_then(|v| v.as_u64())
            .map(|d| TimeWindow::LastDays(d.min(u64::from(u32::MAX)) as u32))
            .unwrap_or_default(),
    }
}

fn counts_json(counts: Vec<(String, usize)>) -> Value {
    json!(counts
        .into_iter()
        .map(|(name, count)| json!({"name": name, "count": count}))
        .collect::<Vec<_>>())
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// The lock on `app` is never held across the analysis call.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Bookmarks ───
        "bookmark.list" => {
            let filter = filter_from_params(params);
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.repository().list().map_err(|e| e.to_string())?;
            let visible: Vec<&Bookmark> = filter.apply(&bookmarks, Utc::now());
            serde_json::to_value(visible).map_err(|e| e.to_string())
        }
        "bookmark.get" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmark = a
                .repository()
                .get(id)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("bookmark not found: {}", id))?;
            serde_json::to_value(bookmark).map_err(|e| e.to_string())
        }
        "bookmark.create" => {
            let form: BookmarkFormData =
                serde_json::from_value(params.clone()).map_err(|e| format!("invalid form: {}", e))?;
            let mut flow = AddBookmarkFlow::new();
            flow.begin_analysis(&form.url).map_err(|e| e.to_string())?;
            flow.complete_analysis(form).map_err(|e| e.to_string())?;
            let bookmark = flow.finish(Utc::now()).map_err(|e| e.to_string())?;

            let a = app.lock().map_err(|e| e.to_string())?;
            a.repository().create(bookmark.clone()).map_err(|e| e.to_string())?;
            serde_json::to_value(bookmark).map_err(|e| e.to_string())
        }
        "bookmark.update" => {
            let bookmark: Bookmark = serde_json::from_value(
                params.get("bookmark").cloned().ok_or("missing bookmark")?,
            )
            .map_err(|e| format!("invalid bookmark: {}", e))?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.repository().update(bookmark).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.delete" => {
            let id = str_param(params, "id").ok_or("missing id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            a.repository().remove(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "bookmark.analyze" => {
            let url = str_param(params, "url").ok_or("missing url")?;
            let analyzer = {
                let a = app.lock().map_err(|e| e.to_string())?;
                a.analyzer.clone()
            };
            let mut flow = AddBookmarkFlow::new();
            let form = flow
                .analyze(analyzer.as_ref(), url)
                .await
                .map_err(|e| e.to_string())?
                .clone();
            Ok(json!({
                "form": form,
                "degraded": form.is_degraded(),
                "notice": flow.notice(),
            }))
        }

        // ─── Library ───
        "library.categories" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.repository().list().map_err(|e| e.to_string())?;
            Ok(counts_json(category_counts(&bookmarks)))
        }
        "library.tags" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.repository().list().map_err(|e| e.to_string())?;
            Ok(counts_json(tag_counts(&bookmarks)))
        }

        // ─── Embed ───
        "embed.html" => {
            // A front end forwarding its page query only gets the embed view for embed=true.
            if let Some(query) = str_param(params, "query") {
                if !is_embed_request(query) {
                    return Err("embed mode not requested (missing embed=true)".to_string());
                }
            }
            let a = app.lock().map_err(|e| e.to_string())?;
            let bookmarks = a.repository().list().map_err(|e| e.to_string())?;
            Ok(json!({"html": render_embed_html(&bookmarks)}))
        }
        "embed.code" => {
            let page_url = str_param(params, "page_url").ok_or("missing page_url")?;
            Ok(json!({"code": embed_code(page_url)}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key").ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
