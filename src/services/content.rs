//! Blog post and LinkedIn post review service.

use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, notify};
use crate::db::ContentFilter;
use crate::model::{ContentItem, ContentKind};
use crate::state::AppState;
use crate::webhook::Event;
use crate::workflow::{self, Action};

fn event(item: &ContentItem, verb: &str, actor: &str) -> Event {
    Event::new(item.kind.entity_kind(), verb, item.id, actor)
        .with_data("status", item.status.as_str())
        .with_data("tags", item.tags.clone())
        .with_opt("title", item.title.clone())
        .with_opt("image_url", item.image_url.clone())
}

pub async fn list(state: &AppState, kind: ContentKind, filter: &ContentFilter) -> Result<Vec<ContentItem>, ServiceError> {
    Ok(state.store.list_content(kind, filter).await?)
}

pub async fn get(state: &AppState, kind: ContentKind, id: Uuid) -> Result<ContentItem, ServiceError> {
    state
        .store
        .get_content(kind, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(kind.entity_kind(), id))
}

pub async fn transition(
    state: &AppState,
    kind: ContentKind,
    id: Uuid,
    action: Action,
    actor: &str,
) -> Result<ContentItem, ServiceError> {
    let item = get(state, kind, id).await?;
    let patch = workflow::plan_content(&item, action, actor, OffsetDateTime::now_utc())?;
    let updated = state.store.update_content_status(kind, id, &patch).await?;

    info!(%id, kind = %kind.entity_kind(), %action, actor, status = %updated.status, "content reviewed");

    let event = event(&updated, action.past_tense(), actor).with_data("action", action.as_str());
    notify(state, event);
    Ok(updated)
}

pub async fn delete(state: &AppState, kind: ContentKind, id: Uuid, actor: &str) -> Result<(), ServiceError> {
    let item = get(state, kind, id).await?;
    state.store.delete_content(kind, id).await?;
    info!(%id, kind = %kind.entity_kind(), actor, "content deleted");
    notify(state, event(&item, "deleted", actor));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::StoreError;
    use crate::model::ContentStatus;
    use crate::state::test_helpers::{self, test_app, wait_for_webhooks};
    use crate::workflow::TransitionError;

    const ACTOR: &str = "editor@example.test";

    #[tokio::test]
    async fn approve_blog_post_records_reviewer() {
        let app = test_app();
        let id = app.store.seed_content(test_helpers::content_item(ContentKind::BlogPost));

        let item = transition(&app.state, ContentKind::BlogPost, id, Action::Approve, ACTOR).await.unwrap();
        assert_eq!(item.status, ContentStatus::Approved);
        assert_eq!(item.reviewed_by.as_deref(), Some(ACTOR));

        wait_for_webhooks(&app.state, 1).await;
        let posted = app.sink.posted();
        assert_eq!(posted[0].0, "https://hooks.test/content");
        assert_eq!(posted[0].1.event_type, "blog_post.approved");
    }

    #[tokio::test]
    async fn decline_then_reset_linkedin_post() {
        let app = test_app();
        let id = app.store.seed_content(test_helpers::content_item(ContentKind::LinkedinPost));

        let declined = transition(&app.state, ContentKind::LinkedinPost, id, Action::Reject, ACTOR).await.unwrap();
        assert_eq!(declined.status, ContentStatus::Rejected);

        let reset = transition(&app.state, ContentKind::LinkedinPost, id, Action::Reset, ACTOR).await.unwrap();
        assert_eq!(reset.status, ContentStatus::Unused);
        assert!(reset.reviewed_by.is_none());
        assert!(reset.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn kinds_do_not_cross() {
        let app = test_app();
        let id = app.store.seed_content(test_helpers::content_item(ContentKind::BlogPost));

        let err = get(&app.state, ContentKind::LinkedinPost, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn pause_is_unsupported_for_content() {
        let app = test_app();
        let id = app.store.seed_content(test_helpers::content_item(ContentKind::BlogPost));

        let err = transition(&app.state, ContentKind::BlogPost, id, Action::Pause, ACTOR).await.unwrap_err();
        assert!(matches!(err, ServiceError::Transition(TransitionError::Unsupported { .. })));
        assert_eq!(app.store.write_count(), 0);
    }

    #[tokio::test]
    async fn delete_removes_item() {
        let app = test_app();
        let id = app.store.seed_content(test_helpers::content_item(ContentKind::BlogPost));

        delete(&app.state, ContentKind::BlogPost, id, ACTOR).await.unwrap();
        assert!(list(&app.state, ContentKind::BlogPost, &ContentFilter::default()).await.unwrap().is_empty());
    }
}
