//! HTTP client for the FinTrack backend.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Sessions are cookie-based: either log in through the client (the cookie
//! jar keeps the session) or pass an existing session cookie to the builder.

/// Default backend location.
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Endpoint paths.
mod paths {
    /// Session check.
    pub(super) const AUTH_STATUS: &str = "/auth/status";
    /// Current user profile.
    pub(super) const ME: &str = "/me";
    /// Login.
    pub(super) const LOGIN: &str = "/login";
    /// Registration.
    pub(super) const REGISTER: &str = "/register";
    /// Logout.
    pub(super) const LOGOUT: &str = "/logout";
    /// Account collection.
    pub(super) const ACCOUNTS: &str = "/accounts";
    /// Transaction collection.
    pub(super) const TRANSACTIONS: &str = "/transactions";
    /// Converted dashboard totals.
    pub(super) const DASHBOARD: &str = "/api/currency/dashboard";
    /// Weekly income/expense series.
    pub(super) const WEEKLY_CHART: &str = "/api/weekly-chart";
    /// Report collection.
    pub(super) const REPORTS: &str = "/api/reports";
    /// Report generation.
    pub(super) const GENERATE_REPORT: &str = "/api/reports/generate";
    /// Report PDF download.
    pub(super) const DOWNLOAD_REPORT: &str = "/api/reports/download";
    /// CSV import.
    pub(super) const IMPORT_CSV: &str = "/import-csv";
}

/// Multipart field name the import endpoint expects.
const IMPORT_FIELD: &str = "file";

/// Converts a failed response body into an error.
fn error_from_body(status: u16, body: String) -> crate::error::FintrackError {
    match serde_json::from_str::<crate::models::ErrorDetail>(&body) {
        Ok(detail) => crate::error::FintrackError::Server {
            status,
            detail: detail.message(),
        },
        Err(_) => crate::error::FintrackError::Api {
            status,
            message: body,
        },
    }
}

/// Reads an upload body, refusing anything over the import ceiling.
fn read_capped_upload(file: &crate::file::SelectedFile) -> crate::error::Result<Vec<u8>> {
    file.read_capped(crate::validation::MAX_FILE_SIZE)
}

/// Rejects a form that has issues.
fn ensure_valid_form(issues: Vec<String>) -> crate::error::Result<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        tracing::debug!(count = issues.len(), "form rejected before request");
        Err(crate::error::FintrackError::InvalidForm(issues))
    }
}

/// Generates a FinTrack client (async or blocking) with builder, methods, and tests.
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        request_type: $req_type:ty,
        response_type: $resp_type:ty,
        form_type: $form_type:ty,
        part_type: $part_type:ty,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug, Default)]
        pub struct $builder {
            /// Base URL override.
            base_url: Option<String>,
            /// Existing session cookie, sent with every request.
            session_cookie: Option<SecretString>,
        }

        impl $builder {
            /// Overrides the backend base URL (default `http://localhost:8000`).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Reuses an existing session, given as a raw `Cookie` header
            /// value such as `session=abc123`.
            #[inline]
            #[must_use]
            pub fn session_cookie<T: Into<String>>(mut self, cookie: T) -> Self {
                self.session_cookie = Some(SecretString::from(cookie.into()));
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Url`] if the base URL does not parse,
            /// [`FintrackError::InvalidConfig`] if the cookie is not a valid
            /// header value, or [`FintrackError::Http`] if the HTTP client
            /// fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let base_url = self
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned())
                    .trim_end_matches('/')
                    .to_owned();
                let parsed = Url::parse(&base_url)?;
                drop(parsed);
                tracing::debug!(base_url = %base_url, "building client");

                let mut headers = HeaderMap::new();
                drop(headers.insert(ACCEPT, HeaderValue::from_static("application/json")));
                if let Some(cookie) = self.session_cookie {
                    let mut value = HeaderValue::from_str(cookie.expose_secret()).map_err(|err| {
                        FintrackError::InvalidConfig(format!("invalid session cookie: {err}"))
                    })?;
                    value.set_sensitive(true);
                    drop(headers.insert(COOKIE, value));
                }

                let http = <$http_type>::builder()
                    .cookie_store(true)
                    .default_headers(headers)
                    .build()?;

                Ok($client { http, base_url })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Backend base URL without a trailing slash.
            base_url: String,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub fn builder() -> $builder {
                $builder::default()
            }

            /// Returns the backend base URL.
            #[inline]
            #[must_use]
            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            /// Checks whether the current session is authenticated.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn auth_status(&self) -> Result<AuthStatus> {
                let url = self.endpoint(paths::AUTH_STATUS, &[])?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Returns the logged-in user's profile.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails, the session is not
            /// authenticated, or the response cannot be deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn me(&self) -> Result<UserProfile> {
                let url = self.endpoint(paths::ME, &[])?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Logs in; the session cookie is kept in the client's cookie jar.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::InvalidForm`] without sending a request
            /// if the email is malformed or the password is empty; otherwise
            /// any request or server error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn login(&self, request: &LoginRequest) -> Result<ApiMessage> {
                ensure_valid_form(credentials::login_issues(&request.email, &request.password))?;
                tracing::debug!(email = %request.email, "logging in");
                let url = self.endpoint(paths::LOGIN, &[])?;
                self.execute(self.http.post(url).json(request)) $( .$await_ext )?
            }

            /// Registers a new user.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::InvalidForm`] without sending a request
            /// if the name, email or password breaks a rule; otherwise any
            /// request or server error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn register(&self, request: &RegisterRequest) -> Result<ApiMessage> {
                ensure_valid_form(credentials::registration_issues(request))?;
                let url = self.endpoint(paths::REGISTER, &[])?;
                self.execute(self.http.post(url).json(request)) $( .$await_ext )?
            }

            /// Ends the current session.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn logout(&self) -> Result<ApiMessage> {
                let url = self.endpoint(paths::LOGOUT, &[])?;
                self.execute(self.http.post(url)) $( .$await_ext )?
            }

            /// Lists the user's accounts.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn accounts(&self) -> Result<Vec<Account>> {
                let url = self.endpoint(paths::ACCOUNTS, &[])?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Creates an account.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::InvalidForm`] without sending a request
            /// if a field is missing or the balance is out of range; otherwise
            /// any request or server error.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn create_account(&self, account: &NewAccount) -> Result<ApiMessage> {
                ensure_valid_form(credentials::account_issues(account))?;
                let url = self.endpoint(paths::ACCOUNTS, &[])?;
                self.execute(self.http.post(url).json(account)) $( .$await_ext )?
            }

            /// Replaces an account's details.
            ///
            /// # Errors
            ///
            /// Same as [`Self::create_account`].
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn update_account(
                &self,
                id: AccountId,
                account: &NewAccount,
            ) -> Result<ApiMessage> {
                ensure_valid_form(credentials::account_issues(account))?;
                let body = AccountUpdate::from(account.clone());
                let url = self.endpoint(&format!("{}/{id}", paths::ACCOUNTS), &[])?;
                self.execute(self.http.put(url).json(&body)) $( .$await_ext )?
            }

            /// Deletes an account; the backend re-checks the password.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the server refuses.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn delete_account(&self, id: AccountId, password: &str) -> Result<ApiMessage> {
                let body = DeleteAccountRequest {
                    password: password.to_owned(),
                };
                let url = self.endpoint(&format!("{}/{id}", paths::ACCOUNTS), &[])?;
                self.execute(self.http.delete(url).json(&body)) $( .$await_ext )?
            }

            /// Lists the user's transactions, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn transactions(&self) -> Result<Vec<TransactionRecord>> {
                let url = self.endpoint(paths::TRANSACTIONS, &[])?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Fetches dashboard totals converted to `base_currency`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(base_currency = %base_currency))]
            pub $($async_kw)? fn dashboard(&self, base_currency: &str) -> Result<DashboardResponse> {
                let url = self.endpoint(paths::DASHBOARD, &[("base_currency", base_currency)])?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Fetches the backend's weekly series for the last `weeks` weeks.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all, fields(weeks = weeks, base_currency = %base_currency))]
            pub $($async_kw)? fn weekly_chart(
                &self,
                weeks: u32,
                base_currency: &str,
            ) -> Result<WeeklyChartResponse> {
                let weeks_text = weeks.to_string();
                let url = self.endpoint(
                    paths::WEEKLY_CHART,
                    &[("weeks", weeks_text.as_str()), ("base_currency", base_currency)],
                )?;
                self.execute(self.http.get(url)) $( .$await_ext )?
            }

            /// Lists generated reports, newest first.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the response cannot be
            /// deserialized.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn reports(&self) -> Result<Vec<ReportRecord>> {
                let url = self.endpoint(paths::REPORTS, &[])?;
                let list: ReportList = self.execute(self.http.get(url)) $( .$await_ext )? ?;
                Ok(list.reports)
            }

            /// Generates (or regenerates) the report for `month`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the server refuses.
            #[inline]
            #[tracing::instrument(skip_all, fields(month = %month))]
            pub $($async_kw)? fn generate_report(&self, month: ReportMonth) -> Result<ApiMessage> {
                let url = self.endpoint(paths::GENERATE_REPORT, &[])?;
                let body = GenerateReportRequest { month };
                self.execute(self.http.post(url).json(&body)) $( .$await_ext )?
            }

            /// Downloads the PDF report for `month`.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or no report exists.
            #[inline]
            #[tracing::instrument(skip_all, fields(month = %month))]
            pub $($async_kw)? fn download_report(&self, month: ReportMonth) -> Result<Vec<u8>> {
                let month_text = month.to_string();
                let url = self.endpoint(paths::DOWNLOAD_REPORT, &[("month", month_text.as_str())])?;
                let response = self.http.get(url).send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if !status.is_success() {
                    let body = response.text() $( .$await_ext )? .unwrap_or_default();
                    return Err(error_from_body(status.as_u16(), body));
                }
                let bytes = response.bytes() $( .$await_ext )? ?;
                tracing::trace!(len = bytes.len(), "downloaded report");
                Ok(bytes.to_vec())
            }

            /// Deletes a report.
            ///
            /// # Errors
            ///
            /// Returns an error if the request fails or the server refuses.
            #[inline]
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn delete_report(&self, id: ReportId) -> Result<ApiMessage> {
                let url = self.endpoint(&format!("{}/{id}", paths::REPORTS), &[])?;
                self.execute(self.http.delete(url)) $( .$await_ext )?
            }

            /// Uploads a CSV file as multipart field `file`.
            ///
            /// No client-side validation is performed here; see
            /// [`crate::upload::UploadController`] for the guarded flow.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Io`] if the file cannot be read,
            /// [`FintrackError::Validation`] if it has grown past
            /// [`crate::validation::MAX_FILE_SIZE`], [`FintrackError::Server`] with the backend's
            /// `detail` if the import is rejected, or a transport error.
            #[inline]
            #[tracing::instrument(skip_all, fields(name = %file.name(), size = file.size_bytes()))]
            pub $($async_kw)? fn import_csv(&self, file: &SelectedFile) -> Result<ImportSummary> {
                let bytes = read_upload(file) $( .$await_ext )? ?;
                let part = <$part_type>::bytes(bytes)
                    .file_name(file.name().to_owned())
                    .mime_str(file.mime_type().unwrap_or("text/csv"))?;
                let form = <$form_type>::new().part(IMPORT_FIELD, part);
                let url = self.endpoint(paths::IMPORT_CSV, &[])?;
                tracing::debug!("uploading CSV");
                self.execute(self.http.post(url).multipart(form)) $( .$await_ext )?
            }

            /// Builds an absolute endpoint URL with query parameters.
            fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
                let mut url = Url::parse(&format!("{}{path}", self.base_url))?;
                if !query.is_empty() {
                    _ = url.query_pairs_mut().extend_pairs(query);
                }
                Ok(url)
            }

            /// Sends a request and deserializes a JSON response.
            #[tracing::instrument(skip_all)]
            $($async_kw)? fn execute<Resp: serde::de::DeserializeOwned>(
                &self,
                request: $req_type,
            ) -> Result<Resp> {
                let response: $resp_type = request.send() $( .$await_ext )? ?;
                let status = response.status();
                tracing::debug!(status = %status, url = %response.url(), "received response");
                let body = response.text() $( .$await_ext )? ?;
                if !status.is_success() {
                    tracing::debug!(status = status.as_u16(), "API error");
                    return Err(error_from_body(status.as_u16(), body));
                }
                tracing::trace!(body_len = body.len(), "parsing response body");
                let json = if body.trim().is_empty() { "{}" } else { body.as_str() };
                serde_json::from_str(json).map_err(FintrackError::from)
            }
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn builder_defaults_to_localhost() {
                let client = $client::builder().build().unwrap();
                assert_eq!(client.base_url(), DEFAULT_BASE_URL);
            }

            #[test]
            fn builder_custom_base_url_drops_trailing_slash() {
                let client = $client::builder()
                    .base_url("http://localhost:8080/")
                    .build()
                    .unwrap();
                assert_eq!(client.base_url(), "http://localhost:8080");
            }

            #[test]
            fn builder_rejects_bad_url() {
                let result = $client::builder().base_url("not a url").build();
                assert!(matches!(result, Err(FintrackError::Url(_))));
            }

            #[test]
            fn builder_rejects_bad_cookie() {
                let result = $client::builder().session_cookie("a\nb").build();
                assert!(matches!(result, Err(FintrackError::InvalidConfig(_))));
            }

            #[test]
            fn endpoint_encodes_query() {
                let client = $client::builder().build().unwrap();
                let url = client
                    .endpoint("/api/weekly-chart", &[("weeks", "8"), ("base_currency", "SEK")])
                    .unwrap();
                assert_eq!(
                    url.as_str(),
                    "http://localhost:8000/api/weekly-chart?weeks=8&base_currency=SEK"
                );
            }
        }
    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the FinTrack backend.

    use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        DEFAULT_BASE_URL, IMPORT_FIELD, ensure_valid_form, error_from_body, paths,
        read_capped_upload,
    };
    use crate::credentials;
    use crate::error::{FintrackError, Result};
    use crate::file::SelectedFile;
    use crate::models::{
        Account, AccountId, AccountUpdate, ApiMessage, AuthStatus, DashboardResponse,
        DeleteAccountRequest, GenerateReportRequest, ImportSummary, LoginRequest, NewAccount,
        RegisterRequest, ReportId, ReportList, ReportMonth, ReportRecord, TransactionRecord,
        UserProfile, WeeklyChartResponse,
    };

    /// Reads the upload body on the blocking pool.
    async fn read_upload(file: &SelectedFile) -> Result<Vec<u8>> {
        let owned = file.clone();
        tokio::task::spawn_blocking(move || read_capped_upload(&owned))
            .await
            .map_err(|err| FintrackError::Io(std::io::Error::other(err)))?
    }

    define_client! {
        client_name: FinTrackClient,
        builder_name: FinTrackClientBuilder,
        http_type: reqwest::Client,
        request_type: reqwest::RequestBuilder,
        response_type: reqwest::Response,
        form_type: reqwest::multipart::Form,
        part_type: reqwest::multipart::Part,
        client_doc: "Async client for the FinTrack backend.\n\nUse [`FinTrackClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinTrackClient`].",
        async_kw: async,
        await_kw: await,
    }

    impl crate::upload::ImportTransport for FinTrackClient {
        #[inline]
        fn upload(
            &self,
            file: &SelectedFile,
        ) -> impl Future<Output = Result<ImportSummary>> + Send {
            self.import_csv(file)
        }
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the FinTrack backend.

    use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue};
    use secrecy::{ExposeSecret as _, SecretString};
    use url::Url;

    use super::{
        DEFAULT_BASE_URL, IMPORT_FIELD, ensure_valid_form, error_from_body, paths,
        read_capped_upload as read_upload,
    };
    use crate::credentials;
    use crate::error::{FintrackError, Result};
    use crate::file::SelectedFile;
    use crate::models::{
        Account, AccountId, AccountUpdate, ApiMessage, AuthStatus, DashboardResponse,
        DeleteAccountRequest, GenerateReportRequest, ImportSummary, LoginRequest, NewAccount,
        RegisterRequest, ReportId, ReportList, ReportMonth, ReportRecord, TransactionRecord,
        UserProfile, WeeklyChartResponse,
    };

    define_client! {
        client_name: FinTrackBlockingClient,
        builder_name: FinTrackBlockingClientBuilder,
        http_type: reqwest::blocking::Client,
        request_type: reqwest::blocking::RequestBuilder,
        response_type: reqwest::blocking::Response,
        form_type: reqwest::blocking::multipart::Form,
        part_type: reqwest::blocking::multipart::Part,
        client_doc: "Blocking (synchronous) client for the FinTrack backend.\n\nUse [`FinTrackBlockingClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`FinTrackBlockingClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{FinTrackClient, FinTrackClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{FinTrackBlockingClient, FinTrackBlockingClientBuilder};
