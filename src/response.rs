/// A fully fetched indexer search response, as handed to the parser.
///
/// The HTTP transport lives outside this crate; by the time a response
/// reaches the parser its body has been read to completion. The request
/// URL is kept because protocol error classification inspects the query
/// string (presence of an `apikey=` parameter).
#[derive(Debug, Clone)]
pub struct IndexerResponse {
    request_url: String,
    status: u16,
    content_type: Option<String>,
    body: String,
}

impl IndexerResponse {
    /// Creates a response with status 200 and no declared content type.
    pub fn new(request_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            request_url: request_url.into(),
            status: 200,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Full request URI including the query string.
    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the response carries an HTTP-level error status.
    pub fn is_http_error(&self) -> bool {
        !(200..300).contains(&self.status)
    }

    /// Whether the declared content type indicates an XML body. Indexers
    /// are sloppy here (`text/xml`, `application/rss+xml`, charset
    /// suffixes), so this is a substring check, not an exact match.
    pub fn declares_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("xml"))
    }
}
