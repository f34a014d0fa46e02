//! `test/hello`: greeting, optionally truncated with `?len=<n>`.

use rd_node_sdk::{
    ContentFormat, Method, Request, Resource, ResourceContext, ResourceError, ResourceResult,
    Response, ResponseCode,
};

const GREETING: &str = "Hello World!";

pub struct Hello;

#[async_trait::async_trait]
impl Resource for Hello {
    async fn handle(&self, ctx: ResourceContext, request: Request) -> ResourceResult {
        if request.method != Method::Get {
            return Err(ResourceError::MethodNotAllowed);
        }

        let len = match ctx.query.iter().find_map(|q| q.strip_prefix("len=")) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| ResourceError::BadRequest(format!("len: '{raw}' is not a number")))?,
            None => GREETING.len(),
        };

        let text = &GREETING[..len.min(GREETING.len())];
        Ok(Response::new(ResponseCode::CONTENT).with_payload(ContentFormat::TextPlain, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(query: &[&str]) -> ResourceContext {
        ResourceContext {
            path: "test/hello".into(),
            query: query.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn full_greeting() {
        let resp = Hello
            .handle(ctx(&[]), Request::new(Method::Get, "/test/hello"))
            .await
            .unwrap();
        assert_eq!(resp.payload, "Hello World!");
        assert_eq!(resp.content_format, Some(ContentFormat::TextPlain));
    }

    #[tokio::test]
    async fn len_truncates() {
        let resp = Hello
            .handle(ctx(&["len=5"]), Request::new(Method::Get, "/test/hello"))
            .await
            .unwrap();
        assert_eq!(resp.payload, "Hello");

        let resp = Hello
            .handle(ctx(&["len=99"]), Request::new(Method::Get, "/test/hello"))
            .await
            .unwrap();
        assert_eq!(resp.payload, "Hello World!");
    }

    #[tokio::test]
    async fn bad_len_is_rejected() {
        let err = Hello
            .handle(ctx(&["len=abc"]), Request::new(Method::Get, "/test/hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn only_get_is_allowed() {
        let err = Hello
            .handle(ctx(&[]), Request::new(Method::Post, "/test/hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::MethodNotAllowed));
    }
}
