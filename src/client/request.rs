//! One outgoing request, built on the client's session.

use std::time::Duration;

use reqwest::blocking::{multipart::Form, RequestBuilder, Response};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use serde::Serialize;

use crate::error::Result;

/// Request under construction. Carries the client's default timeout until
/// the caller overrides it.
pub struct Request {
    builder: RequestBuilder,
    timeout: Option<Duration>,
    has_auth: bool,
    label: String,
}

impl Request {
    pub(crate) fn new(
        builder: RequestBuilder,
        timeout: Option<Duration>,
        has_auth: bool,
        label: String,
    ) -> Self {
        Self {
            builder,
            timeout,
            has_auth,
            label,
        }
    }

    /// Add query parameters. Repeated keys are sent repeatedly.
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    pub fn body(mut self, body: impl Into<reqwest::blocking::Body>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Add a header for this request only. Replacing the client's
    /// authorization is allowed but logged.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        if name == AUTHORIZATION && self.has_auth {
            tracing::warn!(
                "Overriding the Authorization header for {}; the workspace token will not be sent",
                self.label
            );
        }
        self.builder = self.builder.header(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Wait indefinitely; used for streams the caller cancels by dropping.
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Send and return the raw response; status is not checked here.
    pub fn send(self) -> Result<Response> {
        tracing::debug!("{}", self.label);
        let builder = match self.timeout {
            Some(timeout) => self.builder.timeout(timeout),
            None => self.builder,
        };
        Ok(builder.send()?)
    }
}
