//! Acquisition requests

use validator::Validate;

use super::{acting_user, new_id, LibraryStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        authorize, BookRequest, NewBookRequest, NotificationKind, Operation, RequestStatus, User,
    },
};

impl LibraryStore {
    /// Requests submitted by the signed-in user
    pub fn user_requests(&self, actor: Option<&User>) -> Vec<BookRequest> {
        actor
            .map(|u| self.repository.requests.for_user(&u.id))
            .unwrap_or_default()
    }

    pub fn all_requests(&self, actor: Option<&User>) -> AppResult<Vec<BookRequest>> {
        authorize(actor, Operation::DecideRequest)?;
        Ok(self.repository.requests.iter().cloned().collect())
    }

    /// Ask the library to acquire a title
    pub fn request_book(
        &mut self,
        actor: Option<&User>,
        title: &str,
        author: &str,
        reason: &str,
    ) -> AppResult<BookRequest> {
        let user = acting_user(actor, Operation::RequestBook)?;
        let data = NewBookRequest::new(title, author, reason);
        data.validate()?;

        let request = BookRequest {
            id: new_id("request"),
            user_id: user.id.clone(),
            title: data.title,
            author: data.author,
            reason: data.reason,
            status: RequestStatus::Pending,
            created_at: self.now(),
            response_date: None,
        };
        self.repository
            .requests
            .collection_mut()
            .upsert(request.clone());

        self.notify(
            &user.id,
            NotificationKind::System,
            format!("Your request for \"{}\" has been submitted.", request.title),
        );
        let admin = self.notifications_config.admin_recipient.clone();
        self.notify(
            &admin,
            NotificationKind::System,
            format!("New book request: \"{}\" by {}.", request.title, user.name),
        );

        tracing::info!("Request {} submitted by user {}", request.id, user.id);
        Ok(request)
    }

    pub fn approve_book_request(
        &mut self,
        actor: Option<&User>,
        request_id: &str,
    ) -> AppResult<BookRequest> {
        self.decide_request(actor, request_id, RequestStatus::Approved)
    }

    pub fn reject_book_request(
        &mut self,
        actor: Option<&User>,
        request_id: &str,
    ) -> AppResult<BookRequest> {
        self.decide_request(actor, request_id, RequestStatus::Rejected)
    }

    fn decide_request(
        &mut self,
        actor: Option<&User>,
        request_id: &str,
        decision: RequestStatus,
    ) -> AppResult<BookRequest> {
        authorize(actor, Operation::DecideRequest)?;

        let request = self.repository.requests.get(request_id).ok_or_else(|| {
            AppError::NotFound(format!("Request with id {} not found", request_id))
        })?;
        if request.status != RequestStatus::Pending {
            tracing::warn!(
                "Request {} already {}, refusing {}",
                request_id,
                request.status,
                decision
            );
            return Err(AppError::BusinessRule(format!(
                "Request has already been {}",
                request.status
            )));
        }

        let now = self.now();
        let decided = self
            .repository
            .requests
            .collection_mut()
            .update(request_id, |r| {
                r.status = decision;
                r.response_date = Some(now);
            })
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("Request with id {} not found", request_id))
            })?;

        self.notify(
            &decided.user_id,
            NotificationKind::RequestResponse,
            format!(
                "Your request for \"{}\" has been {}.",
                decided.title, decision
            ),
        );

        tracing::info!("Request {} {}", request_id, decision);
        Ok(decided)
    }
}
