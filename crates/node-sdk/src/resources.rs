//! Resource table: the node's locally served resources, in activation order.
//!
//! The table is what gets advertised to the directory (as link-format) and
//! what answers requests addressed to the node itself.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use rd_protocol::{
    ContentFormat, LinkFormatDocument, Method, ProtocolError, Request, ResourceDescriptor,
    Response, ResponseCode, DEFAULT_MAX_PAYLOAD, WELL_KNOWN_CORE,
};

use crate::types::{ResourceContext, ResourceError, ResourceResult};

/// Implement this trait to serve a resource.
///
/// # Example
///
/// ```rust,no_run
/// use rd_node_sdk::{ContentFormat, Resource, ResourceContext, ResourceResult, Request, Response, ResponseCode};
///
/// struct Hello;
///
/// #[async_trait::async_trait]
/// impl Resource for Hello {
///     async fn handle(&self, _ctx: ResourceContext, _req: Request) -> ResourceResult {
///         Ok(Response::new(ResponseCode::CONTENT).with_payload(ContentFormat::TextPlain, "hi"))
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Resource: Send + Sync + 'static {
    async fn handle(&self, ctx: ResourceContext, request: Request) -> ResourceResult;
}

struct Entry {
    descriptor: ResourceDescriptor,
    handler: Arc<dyn Resource>,
}

/// Ordered set of activated resources.
///
/// ```rust,no_run
/// # use rd_node_sdk::ResourceTable;
/// let mut table = ResourceTable::new();
/// // table.activate("test/hello", Some("title=\"Hello\""), Hello)
/// //      .activate("actuators/toggle", Some("title=\"Red LED\";rt=\"Control\""), Toggle);
/// ```
#[derive(Clone)]
pub struct ResourceTable {
    entries: Vec<Arc<Entry>>,
    max_payload: usize,
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

/// `/a/b/` and `a/b` address the same resource.
fn normalize(path: &str) -> &str {
    path.trim_start_matches('/').trim_end_matches('/')
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload ceiling for requests and responses, `/.well-known/core`
    /// included.
    pub fn with_max_payload(mut self, bytes: usize) -> Self {
        self.max_payload = bytes;
        self
    }

    /// Activate a resource.  Re-activating a path replaces its handler and
    /// attributes but keeps its position.
    ///
    /// Returns `&mut Self` for method chaining.
    pub fn activate<R: Resource>(
        &mut self,
        path: &str,
        attributes: Option<&str>,
        handler: R,
    ) -> &mut Self {
        self.activate_boxed(path, attributes, Arc::new(handler))
    }

    /// Activate a pre-wrapped handler.
    pub fn activate_boxed(
        &mut self,
        path: &str,
        attributes: Option<&str>,
        handler: Arc<dyn Resource>,
    ) -> &mut Self {
        let path = normalize(path);
        let entry = Arc::new(Entry {
            descriptor: ResourceDescriptor::new(path, attributes),
            handler,
        });
        match self.entries.iter().position(|e| e.descriptor.path == path) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Descriptors in activation order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> + '_ {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn paths(&self) -> Vec<String> {
        self.iter().map(|d| d.path.clone()).collect()
    }

    /// Look up a handler by path (leading/trailing `/` ignored).
    pub fn get(&self, path: &str) -> Option<Arc<dyn Resource>> {
        let path = normalize(path);
        self.entries
            .iter()
            .find(|e| e.descriptor.path == path)
            .map(|e| e.handler.clone())
    }

    /// Serialize the table as a link-format document of at most `max_len` bytes.
    pub fn link_format(&self, max_len: usize) -> Result<LinkFormatDocument, ProtocolError> {
        rd_protocol::encode(self.iter(), max_len)
    }

    /// Answer a request addressed to this node.
    ///
    /// Never fails: unknown paths get `4.04`, handler errors their mapped
    /// code, and a panicking handler `5.00`.  Payloads over the ceiling are
    /// refused in either direction.
    pub async fn dispatch(&self, request: Request) -> Response {
        let path = normalize(&request.uri_path).to_string();

        if path == normalize(WELL_KNOWN_CORE) {
            return self.well_known_core(request.method);
        }

        let Some(handler) = self.get(&path) else {
            tracing::debug!(path = %path, "no resource at path");
            return Response::new(ResponseCode::NOT_FOUND);
        };

        if request.payload.len() > self.max_payload {
            let e = ResourceError::TooLarge(format!(
                "{} bytes, limit {}",
                request.payload.len(),
                self.max_payload
            ));
            tracing::debug!(path = %path, error = %e, "request payload refused");
            return Response::new(e.code());
        }

        let ctx = ResourceContext {
            path: path.clone(),
            query: request.uri_query.clone(),
        };

        let result = match AssertUnwindSafe(handler.handle(ctx, request))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(_panic) => {
                tracing::error!(path = %path, "resource handler panicked");
                return Response::new(ResponseCode::INTERNAL_SERVER_ERROR);
            }
        };

        let result = result.and_then(|response| {
            if response.payload.len() > self.max_payload {
                Err(ResourceError::Failed(format!(
                    "response of {} bytes exceeds limit {}",
                    response.payload.len(),
                    self.max_payload
                )))
            } else {
                Ok(response)
            }
        });

        match result {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "resource handler returned error");
                Response::new(e.code())
            }
        }
    }

    fn well_known_core(&self, method: Method) -> Response {
        if method != Method::Get {
            return Response::new(ResponseCode::METHOD_NOT_ALLOWED);
        }
        match self.link_format(self.max_payload) {
            Ok(doc) => Response::new(ResponseCode::CONTENT)
                .with_payload(ContentFormat::LinkFormat, doc.into_string()),
            Err(e) => {
                tracing::warn!(error = %e, "resource table does not fit in one response");
                Response::new(ResponseCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
