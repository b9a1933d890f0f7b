//! Page and error documents (errors follow RFC 7807).

use serde::{Deserialize, Serialize};

use crate::dto::Viewer;

/// A rendered page: which view produced it, its title, the viewer and the
/// view's context fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub view: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<Viewer>,
    #[serde(flatten)]
    pub context: T,
}

impl<T> PageResponse<T> {
    pub fn new(view: impl Into<String>, title: impl Into<String>, context: T) -> Self {
        Self {
            view: view.into(),
            title: title.into(),
            viewer: None,
            context,
        }
    }

    pub fn with_viewer(mut self, viewer: Option<Viewer>) -> Self {
        self.viewer = viewer;
        self
    }
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    pub title: String,

    pub status: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// The request path that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Context {
        count: u32,
    }

    #[test]
    fn test_page_context_is_flattened() {
        let page = PageResponse::new("posts:index", "Latest posts", Context { count: 3 });
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(
            value,
            json!({"view": "posts:index", "title": "Latest posts", "count": 3})
        );
    }

    #[test]
    fn test_problem_details_shape() {
        let body = ErrorResponse::not_found("post 7").with_instance("/posts/7/");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "about:blank");
        assert_eq!(value["status"], 404);
        assert_eq!(value["instance"], "/posts/7/");
    }
}
