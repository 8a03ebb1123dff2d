//! RAII lease on a pooled resource

use std::sync::Arc;

use crate::error::Result;
use crate::pool::Pool;
use crate::resource::Resource;

/// One acquired share of a pooled resource.
///
/// Dropping the lease releases the share on the current runtime. Call
/// [`Lease::release`] to release in place and observe the outcome, or
/// [`Lease::into_inner`] to take over the obligation to release.
pub struct Lease<R: Resource> {
    resource: Option<Arc<R>>,
    pool: Pool<R>,
}

impl<R: Resource> Lease<R> {
    pub(crate) fn new(pool: Pool<R>, resource: Arc<R>) -> Self {
        Self {
            resource: Some(resource),
            pool,
        }
    }

    /// The leased resource.
    pub fn resource(&self) -> &Arc<R> {
        self.resource.as_ref().expect("lease used after release")
    }

    /// The pool the resource came from.
    pub fn pool(&self) -> &Pool<R> {
        &self.pool
    }

    /// Release the resource now.
    ///
    /// # Errors
    /// Same as [`Pool::release`].
    pub async fn release(mut self) -> Result<()> {
        let resource = self.resource.take().expect("lease used after release");
        self.pool.release(&resource).await
    }

    /// Take the resource out of the lease without releasing it.
    ///
    /// The caller must hand it back with [`Pool::release`].
    #[must_use]
    pub fn into_inner(mut self) -> Arc<R> {
        self.resource.take().expect("lease used after release")
    }
}

impl<R: Resource> std::ops::Deref for Lease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.resource()
    }
}

impl<R: Resource> Drop for Lease<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release_detached(resource);
        }
    }
}

impl<R: Resource + std::fmt::Debug> std::fmt::Debug for Lease<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("resource", &self.resource)
            .finish()
    }
}
