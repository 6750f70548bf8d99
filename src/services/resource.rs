use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::{self, Shape};
use super::page::{ListParams, Page};
use crate::error::Error;
use crate::http::ApiClient;
use crate::types::Id;

/// A REST collection: its path and the body shape it answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    collection: String,
    shape: Shape,
}

impl Endpoint {
    /// Collection at `collection`, answering with raw bodies.
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            shape: Shape::Raw,
        }
    }

    /// Declare the success body shape.
    #[must_use]
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Collection path, relative to the base URL.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Success body shape.
    #[must_use]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Path of one record; the id is encoded as a single path segment.
    #[must_use]
    pub fn member(&self, id: &Id) -> String {
        format!("{}/{}", self.collection, urlencoding::encode(id.as_str()))
    }
}

/// CRUD service for one entity, every call going through [`ApiClient`].
///
/// `T` is the record type; [`Record`](super::Record) keeps the server row as-is.
pub struct ResourceService<T> {
    client: ApiClient,
    endpoint: Endpoint,
    _record: PhantomData<fn() -> T>,
}

// Manual Clone: avoid derive adding a `T: Clone` bound.
impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for ResourceService<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl<T: DeserializeOwned> ResourceService<T> {
    #[must_use]
    pub fn new(client: ApiClient, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Decodes `body` per the endpoint shape, notifying any failure once.
    fn decode<R: DeserializeOwned>(&self, path: &str, body: Value) -> Result<R, Error> {
        envelope::unwrap(self.endpoint.shape(), body).map_err(|e| self.client.reject_body(path, e))
    }

    /// # Errors
    ///
    /// Any [`ApiClient`] error. [`Error::Envelope`] if a wrapped body reports
    /// failure, [`Error::Request`] if the body does not match the endpoint shape.
    pub async fn list(&self, params: &ListParams) -> Result<Page<T>, Error> {
        let path = self.endpoint.collection();
        let body: Value = self.client.get_with_query(path, params).await?;
        self.decode(path, body)
    }

    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn get_by_id(&self, id: &Id) -> Result<T, Error> {
        let path = self.endpoint.member(id);
        let body: Value = self.client.get(&path).await?;
        self.decode(&path, body)
    }

    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<T, Error> {
        let path = self.endpoint.collection();
        let body: Value = self.client.post(path, payload).await?;
        self.decode(path, body)
    }

    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn update<P: Serialize + ?Sized>(&self, id: &Id, payload: &P) -> Result<T, Error> {
        let path = self.endpoint.member(id);
        let body: Value = self.client.put(&path, payload).await?;
        self.decode(&path, body)
    }

    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    pub async fn delete(&self, id: &Id) -> Result<(), Error> {
        let path = self.endpoint.member(id);
        let body: Value = self.client.delete(&path).await?;
        self.decode::<Value>(&path, body).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_path_encodes_id() {
        let endpoint = Endpoint::new("/empresas/5/contas");
        assert_eq!(endpoint.member(&Id::from(12u64)), "/empresas/5/contas/12");
        assert_eq!(endpoint.member(&Id::from("a/b c")), "/empresas/5/contas/a%2Fb%20c");
    }

    #[test]
    fn endpoint_defaults_to_raw() {
        let endpoint = Endpoint::new("/empresas");
        assert_eq!(endpoint.shape(), Shape::Raw);
        assert_eq!(endpoint.with_shape(Shape::Wrapped).shape(), Shape::Wrapped);
    }
}
