use axum::Json;
use serde::Serialize;

use crate::nav;

#[derive(Debug, Serialize)]
pub struct NavigationEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// GET /api/v1/navigation
/// The fixed section order the shell scrolls through, with menu labels.
pub async fn navigation_handler() -> Json<Vec<NavigationEntry>> {
    Json(
        nav::MENU
            .iter()
            .map(|(id, label)| NavigationEntry { id, label })
            .collect(),
    )
}
