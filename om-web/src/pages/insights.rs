//! Investigations index and article pages

use axum::extract::{Path, State};
use axum::response::Html;
use serde::Serialize;

use om_common::articles::{self, Article, ARTICLES};

use super::PageResult;
use crate::AppState;

#[derive(Serialize)]
struct InsightListPage {
    title: &'static str,
    articles: &'static [Article],
}

/// GET /insights
pub async fn insight_list(State(state): State<AppState>) -> PageResult {
    let page = InsightListPage {
        title: "Investigations",
        articles: ARTICLES,
    };
    Ok(Html(state.render("insights.html", &page)?))
}

#[derive(Serialize)]
struct InsightPage {
    title: &'static str,
    article: &'static Article,
    related: Vec<&'static Article>,
}

/// GET /insights/:slug
pub async fn insight_detail(State(state): State<AppState>, Path(slug): Path<String>) -> PageResult {
    let Some(article) = articles::find(&slug) else {
        return Err(state.not_found());
    };

    let page = InsightPage {
        title: article.title,
        article,
        related: articles::related(article),
    };
    Ok(Html(state.render("insight.html", &page)?))
}
