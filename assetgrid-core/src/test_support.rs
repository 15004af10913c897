//! In-memory doubles for [`AssetSearch`] and [`Transport`] used by unit and
//! behaviour tests.

use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{BufRead, Cursor},
};

use crate::{
    AssetSearch, BoundingBox, Feature, Mapping, QueryError, Source, Transport, TransportError,
    Value,
};

/// Search whose result count is a function of the queried box.
///
/// Every feature it returns has the id `"{bbox}#{n}"`, so callers can tell
/// which query produced it. Calls are recorded in order.
pub struct StubSearch<F> {
    counts: F,
    calls: RefCell<Vec<BoundingBox>>,
    feature_types: RefCell<Vec<Vec<String>>>,
    fail_on: Option<usize>,
}

impl<F> std::fmt::Debug for StubSearch<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubSearch")
            .field("calls", &self.calls)
            .field("fail_on", &self.fail_on)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(BoundingBox) -> usize> StubSearch<F> {
    /// Answer each query with `counts(bbox)` features.
    pub const fn new(counts: F) -> Self {
        Self {
            counts,
            calls: RefCell::new(Vec::new()),
            feature_types: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Fail the call with the given zero-based index.
    #[must_use]
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Boxes queried so far, in order.
    pub fn calls(&self) -> Vec<BoundingBox> {
        self.calls.borrow().clone()
    }

    /// Feature-type filters received so far, one entry per call.
    pub fn feature_types(&self) -> Vec<Vec<String>> {
        self.feature_types.borrow().clone()
    }
}

impl<F: Fn(BoundingBox) -> usize> AssetSearch for StubSearch<F> {
    fn query_box(
        &self,
        source: &Source,
        bbox: BoundingBox,
        feature_types: &[String],
    ) -> Result<Vec<Feature>, QueryError> {
        let index = {
            let mut calls = self.calls.borrow_mut();
            calls.push(bbox);
            calls.len() - 1
        };
        self.feature_types.borrow_mut().push(feature_types.to_vec());
        if self.fail_on == Some(index) {
            return Err(TransportError::Network {
                url: source.url.clone(),
                message: format!("stub failure on call {index}"),
            }
            .into());
        }
        Ok(stub_features(bbox, (self.counts)(bbox)))
    }
}

/// `count` property-only features tagged with `bbox`.
pub fn stub_features(bbox: BoundingBox, count: usize) -> Vec<Feature> {
    (0..count)
        .map(|n| {
            let properties =
                Mapping::from_iter([("FeatureId".to_owned(), Value::Text(n.to_string()))]);
            Feature::new(format!("{bbox}#{n}"), properties)
        })
        .collect()
}

/// Transport replaying queued responses and recording each request.
///
/// Sending with an empty queue fails with a network error.
#[derive(Debug, Default)]
pub struct StubTransport {
    replies: RefCell<VecDeque<Result<String, TransportError>>>,
    requests: RefCell<Vec<Vec<String>>>,
}

impl StubTransport {
    /// Create a transport with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn push_response(&self, body: impl Into<String>) {
        self.replies.borrow_mut().push_back(Ok(body.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, err: TransportError) {
        self.replies.borrow_mut().push_back(Err(err));
    }

    /// Operation fragments of every request sent, in order.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.borrow().clone()
    }
}

impl Transport for StubTransport {
    fn send(
        &self,
        source: &Source,
        operations: &[String],
    ) -> Result<Box<dyn BufRead + Send>, TransportError> {
        self.requests.borrow_mut().push(operations.to_vec());
        let reply = self.replies.borrow_mut().pop_front();
        match reply {
            Some(Ok(body)) => Ok(Box::new(Cursor::new(body.into_bytes()))),
            Some(Err(err)) => Err(err),
            None => Err(TransportError::Network {
                url: source.url.clone(),
                message: "no canned response queued".to_owned(),
            }),
        }
    }
}
