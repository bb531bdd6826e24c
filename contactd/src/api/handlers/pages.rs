//! Handlers for the server-rendered pages.

use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::{
    AppState,
    errors::{Error, Result},
    pages::Page,
};

fn render(state: &AppState, page: Page) -> Result<Html<String>> {
    state.pages.render(page).map(Html).map_err(|e| Error::Internal {
        operation: format!("render {page} page: {e:#}"),
    })
}

#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, Page::Home)
}

#[instrument(skip_all)]
pub async fn services(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, Page::Services)
}

#[instrument(skip_all)]
pub async fn about(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, Page::About)
}

/// The contact form
#[instrument(skip_all)]
pub async fn contact(State(state): State<AppState>) -> Result<Html<String>> {
    render(&state, Page::Contact)
}
