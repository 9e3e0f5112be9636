//! The session: credentials, host and impersonation shared by all requests.
//!
//! [`Session::send`] runs a request through a fixed pipeline:
//!
//! 1. check that credentials are configured;
//! 2. check that the request may be sent on behalf of the configured subuser;
//! 3. validate the parameters;
//! 4. build the [`HttpRequest`] (URL, headers, body);
//! 5. dispatch it through the [`Transport`];
//! 6. read pagination and rate-limit headers, then decode the model.
//!
//! Steps 1 to 4 never perform I/O, and a failed send leaves the session
//! untouched. Nothing is retried.

use tracing::{Instrument, debug, debug_span};
use url::Url;

use crate::{
    Authentication, Encoded, Error, HttpRequest, HyperTransport, Pagination, RateLimit, Request,
    Response, Result, Transport, header,
};

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "https://api.sendgrid.com";

/// Shared configuration for sending requests.
///
/// Configuration changes go through `&mut self` setters, so they cannot race
/// with an in-flight [`Session::send`], which only borrows the session.
/// Concurrent sends on a shared `&Session` are independent.
///
/// # Example
///
/// ```ignore
/// use sendkit::{Session, api::suppression::{RetrieveSuppressions, SuppressionKind}};
///
/// let session = Session::builder().api_key("SG.xxxx").build()?;
/// let bounces = session
///     .send(&RetrieveSuppressions::new(SuppressionKind::Bounces))
///     .await?;
/// for entry in &bounces.model {
///     println!("{} bounced at {}", entry.email, entry.created);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Session<T = HyperTransport> {
    transport: T,
    host: String,
    authentication: Option<Authentication>,
    on_behalf_of: Option<String>,
}

impl Session<HyperTransport> {
    /// Create a session with the default transport and host.
    #[must_use]
    pub fn new(authentication: Authentication) -> Self {
        Self::with_transport(HyperTransport::new()).authenticated(authentication)
    }

    /// Create a session builder using the default transport.
    #[must_use]
    pub fn builder() -> SessionBuilder<HyperTransport> {
        SessionBuilder::new(HyperTransport::new())
    }
}

impl<T> Session<T> {
    /// Create an unauthenticated session on the default host.
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            host: DEFAULT_HOST.to_string(),
            authentication: None,
            on_behalf_of: None,
        }
    }

    fn authenticated(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Change the base URL.
    ///
    /// The host may carry a path prefix; request paths are appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `host` is not an absolute URL. The
    /// session is unchanged on error.
    pub fn set_host(&mut self, host: impl AsRef<str>) -> Result<()> {
        let host = host.as_ref();
        Url::parse(host)?;
        self.host = host.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Configured credentials.
    #[must_use]
    pub const fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    /// Replace or clear the credentials.
    pub fn set_authentication(&mut self, authentication: Option<Authentication>) {
        self.authentication = authentication;
    }

    /// Subuser the session impersonates, if any.
    #[must_use]
    pub fn on_behalf_of(&self) -> Option<&str> {
        self.on_behalf_of.as_deref()
    }

    /// Start or stop impersonating a subuser.
    pub fn set_on_behalf_of(&mut self, subuser: Option<String>) {
        self.on_behalf_of = subuser;
    }

    /// Run the checks and build the HTTP request, without dispatching it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationMissing`],
    /// [`Error::ImpersonationNotAllowed`], [`Error::Validation`],
    /// [`Error::Encoding`] or [`Error::InvalidUrl`], in pipeline order.
    pub fn prepare<R: Request + ?Sized>(&self, request: &R) -> Result<HttpRequest> {
        let authentication = self
            .authentication
            .as_ref()
            .ok_or(Error::AuthenticationMissing)?;

        if let Some(subuser) = &self.on_behalf_of
            && !request.supports_impersonation()
        {
            return Err(Error::ImpersonationNotAllowed {
                subuser: subuser.clone(),
            });
        }

        request.validate_parameters()?;

        let path = request.path();
        if !path.starts_with('/') {
            return Err(Error::encoding(format!("path must start with '/': {path}")));
        }

        let mut target = format!("{}{path}", self.host);
        let mut body = None;
        match request.encode_parameters()? {
            Encoded::Empty => {}
            Encoded::Query(query) => {
                target.push(if path.contains('?') { '&' } else { '?' });
                target.push_str(&query);
            }
            Encoded::Body {
                content_type,
                bytes,
            } => body = Some((content_type, bytes)),
        }
        let url = Url::parse(&target)?;

        let mut builder = HttpRequest::builder(request.method(), url)
            .header(header::AUTHORIZATION, authentication.authorization_header())
            .header(header::ACCEPT, request.accept_type().as_str());
        if let Some((content_type, _)) = &body {
            builder = builder.header(header::CONTENT_TYPE, content_type.as_str());
        }
        // Credentials and impersonation come from the session only.
        let extra = request.headers();
        builder = builder.headers(extra.iter().filter(|(name, _)| {
            !name.eq_ignore_ascii_case(header::AUTHORIZATION)
                && !name.eq_ignore_ascii_case(header::ON_BEHALF_OF)
        }));
        if let Some(subuser) = &self.on_behalf_of {
            builder = builder.header(header::ON_BEHALF_OF, subuser.as_str());
        }
        if let Some((_, bytes)) = body {
            builder = builder.body(bytes);
        }

        Ok(builder.build())
    }
}

impl<T: Transport> Session<T> {
    /// Send a request and decode its response.
    ///
    /// The request is only borrowed and can be sent again.
    ///
    /// # Errors
    ///
    /// Configuration, validation and encoding errors are reported before any
    /// I/O (see [`Session::prepare`]). Transport failures are returned as
    /// reported by the transport. A non-2xx status yields [`Error::Http`] and
    /// a body that does not match the model yields [`Error::Decoding`].
    pub async fn send<R: Request + ?Sized>(&self, request: &R) -> Result<Response<R::Model>> {
        let span = debug_span!("send", method = %request.method(), path = %request.path());

        async move {
            let http_request = self.prepare(request)?;
            debug!(url = %http_request.url(), "request built");

            let response = self.transport.execute(http_request).await?;
            let (status, headers, body) = response.into_parts();
            let pagination = Pagination::from_headers(&headers);
            let rate_limit = RateLimit::from_headers(&headers);
            debug!(
                status,
                has_pagination = pagination.is_some(),
                remaining = rate_limit.map(|limit| limit.remaining),
                "response received"
            );

            if !(200..300).contains(&status) {
                return Err(Error::Http {
                    status,
                    body,
                    rate_limit,
                });
            }

            let model = request.decode(&body)?;
            debug!("response decoded");

            Ok(Response {
                model,
                pagination,
                rate_limit,
                status,
                headers,
            })
        }
        .instrument(span)
        .await
    }
}

/// Builder for [`Session`].
#[derive(Debug, Clone)]
pub struct SessionBuilder<T> {
    transport: T,
    host: Option<String>,
    authentication: Option<Authentication>,
    on_behalf_of: Option<String>,
}

impl<T> SessionBuilder<T> {
    /// Start a builder with the given transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            host: None,
            authentication: None,
            on_behalf_of: None,
        }
    }

    /// Use another transport.
    #[must_use]
    pub fn transport<U>(self, transport: U) -> SessionBuilder<U> {
        SessionBuilder {
            transport,
            host: self.host,
            authentication: self.authentication,
            on_behalf_of: self.on_behalf_of,
        }
    }

    /// Set the base URL.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the credentials.
    #[must_use]
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Authenticate with an API key.
    #[must_use]
    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.authentication(Authentication::api_key(key))
    }

    /// Authenticate with a username and password.
    #[must_use]
    pub fn credential(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.authentication(Authentication::credential(username, password))
    }

    /// Impersonate a subuser.
    #[must_use]
    pub fn on_behalf_of(mut self, subuser: impl Into<String>) -> Self {
        self.on_behalf_of = Some(subuser.into());
        self
    }

    /// Build the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the host is not an absolute URL.
    pub fn build(self) -> Result<Session<T>> {
        let mut session = Session::with_transport(self.transport);
        if let Some(host) = self.host {
            session.set_host(host)?;
        }
        session.authentication = self.authentication;
        session.on_behalf_of = self.on_behalf_of;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::Serialize;

    use super::*;
    use crate::{ContentType, Method, Page, Validatable, ValidationError};

    #[derive(Debug, Serialize)]
    struct Note {
        text: String,
    }

    impl Validatable for Note {
        fn validate(&self) -> std::result::Result<(), ValidationError> {
            if self.text.is_empty() {
                Err(ValidationError::invalid_value("text", "must not be empty"))
            } else {
                Ok(())
            }
        }
    }

    struct PostNote {
        path: &'static str,
        note: Note,
        impersonation: bool,
    }

    impl Request for PostNote {
        type Params = Note;
        type Model = ();

        fn method(&self) -> Method {
            Method::Post
        }

        fn path(&self) -> String {
            self.path.to_string()
        }

        fn parameters(&self) -> Option<&Note> {
            Some(&self.note)
        }

        fn headers(&self) -> crate::Headers {
            [("X-Request-Source", "tests")].into_iter().collect()
        }

        fn supports_impersonation(&self) -> bool {
            self.impersonation
        }
    }

    struct ListPage {
        path: &'static str,
        page: Page,
    }

    impl Request for ListPage {
        type Params = Page;
        type Model = Vec<String>;

        fn method(&self) -> Method {
            Method::Get
        }

        fn path(&self) -> String {
            self.path.to_string()
        }

        fn parameters(&self) -> Option<&Page> {
            Some(&self.page)
        }
    }

    struct Spoofing;

    impl Request for Spoofing {
        type Params = ();
        type Model = ();

        fn method(&self) -> Method {
            Method::Get
        }

        fn path(&self) -> String {
            "/v3/subusers".to_string()
        }

        fn headers(&self) -> crate::Headers {
            [
                ("authorization", "Bearer other"),
                ("X-Trace", "1"),
                ("on-behalf-of", "someone-else"),
            ]
            .into_iter()
            .collect()
        }

        fn supports_impersonation(&self) -> bool {
            false
        }
    }

    fn note(text: &str) -> PostNote {
        PostNote {
            path: "/v3/notes",
            note: Note {
                text: text.to_string(),
            },
            impersonation: true,
        }
    }

    fn session() -> Session<()> {
        SessionBuilder::new(())
            .api_key("SG.key")
            .build()
            .expect("session")
    }

    #[test]
    fn missing_authentication_comes_first() {
        let mut session = session();
        session.set_authentication(None);
        session.set_on_behalf_of(Some("foo".to_string()));

        let mut request = note("");
        request.impersonation = false;

        assert!(matches!(
            session.prepare(&request),
            Err(Error::AuthenticationMissing)
        ));
    }

    #[test]
    fn impersonation_checked_before_validation() {
        let mut session = session();
        session.set_on_behalf_of(Some("foo".to_string()));

        let mut request = note("");
        request.impersonation = false;

        match session.prepare(&request) {
            Err(Error::ImpersonationNotAllowed { subuser }) => assert_eq!(subuser, "foo"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validation_failure_is_propagated() {
        let err = session().prepare(&note("")).expect_err("empty note");
        assert_eq!(
            err.validation(),
            Some(&ValidationError::invalid_value("text", "must not be empty"))
        );
    }

    #[test]
    fn body_request_headers_in_order() {
        let mut session = session();
        session.set_on_behalf_of(Some("foo".to_string()));

        let request = session.prepare(&note("hello")).expect("prepare");

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.url().as_str(), "https://api.sendgrid.com/v3/notes");
        assert_eq!(
            request.headers().iter().collect::<Vec<_>>(),
            vec![
                ("Authorization", "Bearer SG.key"),
                ("Accept", "application/json"),
                ("Content-Type", ContentType::Json.as_str()),
                ("X-Request-Source", "tests"),
                ("On-Behalf-Of", "foo"),
            ]
        );
        assert_eq!(request.body(), Some(&Bytes::from(r#"{"text":"hello"}"#)));
    }

    #[test]
    fn query_is_appended_to_path() {
        let session = session();

        let request = session
            .prepare(&ListPage {
                path: "/v3/items",
                page: Page::new(4, 8),
            })
            .expect("prepare");
        assert_eq!(
            request.url().as_str(),
            "https://api.sendgrid.com/v3/items?limit=4&offset=8"
        );
        assert!(request.header("Content-Type").is_none());
        assert!(request.body().is_none());

        let request = session
            .prepare(&ListPage {
                path: "/v3/items?sort=asc",
                page: Page::new(4, 8),
            })
            .expect("prepare");
        assert_eq!(
            request.url().as_str(),
            "https://api.sendgrid.com/v3/items?sort=asc&limit=4&offset=8"
        );
    }

    #[test]
    fn host_path_prefix_is_kept() {
        let mut session = session();
        session
            .set_host("http://127.0.0.1:9000/proxy/")
            .expect("host");

        let request = session.prepare(&note("hi")).expect("prepare");
        assert_eq!(request.url().as_str(), "http://127.0.0.1:9000/proxy/v3/notes");
    }

    #[test]
    fn invalid_host_leaves_session_unchanged() {
        let mut session = session();
        assert!(matches!(
            session.set_host("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert_eq!(session.host(), DEFAULT_HOST);
    }

    #[test]
    fn relative_path_is_an_encoding_error() {
        let mut request = note("hi");
        request.path = "v3/notes";
        assert!(matches!(
            session().prepare(&request),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn basic_credentials() {
        let session = SessionBuilder::new(())
            .credential("user", "pass")
            .build()
            .expect("session");
        let request = session.prepare(&note("hi")).expect("prepare");
        assert_eq!(request.header("authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn endpoint_headers_cannot_replace_session_headers() {
        let request = session().prepare(&Spoofing).expect("prepare");
        assert_eq!(
            request.headers().iter().collect::<Vec<_>>(),
            vec![
                ("Authorization", "Bearer SG.key"),
                ("Accept", "application/json"),
                ("X-Trace", "1"),
            ]
        );
    }
}
