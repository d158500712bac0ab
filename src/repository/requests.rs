//! Acquisition request collection

use std::ops::Deref;

use super::Collection;
use crate::models::{BookRequest, RequestStatus};

#[derive(Debug, Clone, Default)]
pub struct RequestsRepository {
    requests: Collection<BookRequest>,
}

impl RequestsRepository {
    pub fn new(requests: Collection<BookRequest>) -> Self {
        Self { requests }
    }

    pub(crate) fn collection_mut(&mut self) -> &mut Collection<BookRequest> {
        &mut self.requests
    }

    pub fn for_user(&self, user_id: &str) -> Vec<BookRequest> {
        self.requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn count_pending(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .count()
    }
}

impl Deref for RequestsRepository {
    type Target = Collection<BookRequest>;

    fn deref(&self) -> &Self::Target {
        &self.requests
    }
}
