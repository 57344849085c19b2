//! Memoizing wrapper around a [`ContentSource`].

use std::{cell::RefCell, future::Future};

use super::{
    source::{ContentFuture, ContentSource},
    types::{Education, Experience, Profile, Project},
};

/// Caches each successfully loaded section for the lifetime of the wrapper.
///
/// Failed loads are not cached, so the next command retries the inner source.
#[derive(Debug, Default)]
pub struct CachedContentSource<S> {
    inner: S,
    profile: RefCell<Option<Profile>>,
    experience: RefCell<Option<Vec<Experience>>>,
    education: RefCell<Option<Vec<Education>>>,
    projects: RefCell<Option<Vec<Project>>>,
}

impl<S: ContentSource> CachedContentSource<S> {
    /// Wraps `inner` with empty caches.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            profile: RefCell::new(None),
            experience: RefCell::new(None),
            education: RefCell::new(None),
            projects: RefCell::new(None),
        }
    }

    /// Wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops every cached section.
    pub fn invalidate(&self) {
        self.profile.borrow_mut().take();
        self.experience.borrow_mut().take();
        self.education.borrow_mut().take();
        self.projects.borrow_mut().take();
    }
}

async fn memoized<T, F>(slot: &RefCell<Option<T>>, load: F) -> Result<T, String>
where
    T: Clone,
    F: Future<Output = Result<T, String>>,
{
    if let Some(hit) = slot.borrow().clone() {
        return Ok(hit);
    }
    let value = load.await?;
    *slot.borrow_mut() = Some(value.clone());
    Ok(value)
}

impl<S: ContentSource> ContentSource for CachedContentSource<S> {
    fn profile(&self) -> ContentFuture<'_, Result<Profile, String>> {
        Box::pin(memoized(&self.profile, self.inner.profile()))
    }

    fn experience(&self) -> ContentFuture<'_, Result<Vec<Experience>, String>> {
        Box::pin(memoized(&self.experience, self.inner.experience()))
    }

    fn education(&self) -> ContentFuture<'_, Result<Vec<Education>, String>> {
        Box::pin(memoized(&self.education, self.inner.education()))
    }

    fn projects(&self) -> ContentFuture<'_, Result<Vec<Project>, String>> {
        Box::pin(memoized(&self.projects, self.inner.projects()))
    }
}
