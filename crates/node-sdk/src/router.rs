//! Event router: turns local triggers into update requests scoped under the
//! session handle.

use std::net::SocketAddr;
use std::sync::Arc;

use rd_protocol::{ContentFormat, Method, ProtocolError, Request, ResponseCode, SessionHandle};

use crate::transport::Transport;
use crate::types::NodeError;

#[derive(Clone)]
pub struct EventRouter {
    transport: Arc<dyn Transport>,
    directory: SocketAddr,
    sub_path: String,
    max_uri_bytes: usize,
    max_payload_bytes: usize,
}

impl EventRouter {
    pub fn new(
        transport: Arc<dyn Transport>,
        directory: SocketAddr,
        sub_path: impl Into<String>,
        max_uri_bytes: usize,
        max_payload_bytes: usize,
    ) -> Self {
        let sub_path: String = sub_path.into();
        Self {
            transport,
            directory,
            sub_path: sub_path.trim_start_matches('/').to_string(),
            max_uri_bytes,
            max_payload_bytes,
        }
    }

    /// `PUT <handle>/<sub_path>` with `Button pressed (<counter>)!`.
    pub fn update_request(
        &self,
        handle: &SessionHandle,
        counter: u64,
    ) -> Result<Request, NodeError> {
        let path = handle.scoped_path(&self.sub_path, self.max_uri_bytes)?;
        let payload = format!("Button pressed ({counter})!");
        if payload.len() > self.max_payload_bytes {
            return Err(ProtocolError::BufferOverflow {
                needed: payload.len(),
                capacity: self.max_payload_bytes,
            }
            .into());
        }
        Ok(Request::new(Method::Put, path)
            .with_content_format(ContentFormat::TextPlain)
            .with_payload(payload))
    }

    /// Send one update and wait for its outcome.  Failures are returned to
    /// the caller, which decides whether they matter.
    pub async fn publish(
        &self,
        handle: &SessionHandle,
        counter: u64,
    ) -> Result<ResponseCode, NodeError> {
        let request = self.update_request(handle, counter)?;
        tracing::debug!(path = %request.uri_path, counter, "publishing update");
        let response = self.transport.send(request, self.directory).await?;
        Ok(response.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransportError;
    use rd_protocol::Response;

    struct Null;
    #[async_trait::async_trait]
    impl Transport for Null {
        async fn send(&self, _request: Request, _target: SocketAddr) -> Result<Response, TransportError> {
            Ok(Response::new(ResponseCode::CHANGED))
        }
    }

    fn router(max_uri: usize, max_payload: usize) -> EventRouter {
        EventRouter::new(
            Arc::new(Null),
            "[aaaa::1]:5683".parse().unwrap(),
            "actuators/button",
            max_uri,
            max_payload,
        )
    }

    #[test]
    fn update_request_shape() {
        let h = SessionHandle::new("/rd/12").unwrap();
        let req = router(40, 256).update_request(&h, 3).unwrap();
        assert_eq!(req.method, Method::Put);
        assert_eq!(req.uri_path, "/rd/12/actuators/button");
        assert_eq!(req.content_format, Some(ContentFormat::TextPlain));
        assert_eq!(req.payload, "Button pressed (3)!");
    }

    #[test]
    fn leading_slash_in_sub_path_is_ignored() {
        let r = EventRouter::new(
            Arc::new(Null),
            "127.0.0.1:5683".parse().unwrap(),
            "/actuators/button",
            40,
            256,
        );
        let h = SessionHandle::new("/rd/12").unwrap();
        assert_eq!(r.update_request(&h, 1).unwrap().uri_path, "/rd/12/actuators/button");
    }

    #[test]
    fn uri_limit_is_enforced() {
        let h = SessionHandle::new("/rd/12").unwrap();
        let err = router(10, 256).update_request(&h, 1).unwrap_err();
        assert!(matches!(err, NodeError::Protocol(ProtocolError::BufferOverflow { .. })));
    }

    #[test]
    fn payload_limit_is_enforced() {
        let h = SessionHandle::new("/rd/12").unwrap();
        let err = router(40, 8).update_request(&h, 1).unwrap_err();
        assert!(matches!(
            err,
            NodeError::Protocol(ProtocolError::BufferOverflow { needed: 19, capacity: 8 })
        ));
    }

    #[tokio::test]
    async fn publish_returns_response_code() {
        let h = SessionHandle::new("/rd/12").unwrap();
        let code = router(40, 256).publish(&h, 1).await.unwrap();
        assert_eq!(code, ResponseCode::CHANGED);
    }
}
