//! `get`: answer a request from the local resource table, without any
//! network involved.

use rd_node_sdk::{Method, Request, Response, ResourceTable};

/// Build the request and dispatch it to `table`.
pub async fn dispatch(
    table: &ResourceTable,
    method: Method,
    path: &str,
    query: &[String],
    payload: Option<&str>,
) -> Response {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let mut request = Request::new(method, path);
    for q in query {
        request = request.with_query(q.as_str());
    }
    if let Some(p) = payload {
        request = request.with_payload(p);
    }
    table.dispatch(request).await
}

/// `<code>` on the first line, then the payload if any.
pub fn render(response: &Response) -> String {
    if response.payload.is_empty() {
        response.code.to_string()
    } else {
        format!("{}\n{}", response.code, response.payload)
    }
}
