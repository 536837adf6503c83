use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::fmt::{self, Display};
use std::time::Duration;

use crate::model::{Channel, ChannelData, Node, RawChannelData};
use crate::prompt::{CredentialPrompt, resolve_credentials};
use crate::series::format_time;
use crate::util::{join_ids, urljoin, wire_bool};

/// Header carrying the session token on every authenticated request.
pub const AUTH_HEADER: &str = "X-Authentication-Token";

/// Session credential returned by `GetSession`. Valid for this process only.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token as the header mapping the service expects.
    pub fn header(&self) -> (&'static str, &str) {
        (AUTH_HEADER, &self.0)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    host: String,
    timeout: Option<Duration>,
    http: HttpClient,
}

#[derive(Debug, serde::Deserialize)]
struct SessionReply {
    #[serde(rename = "Token")]
    token: String,
}

#[derive(Debug, serde::Deserialize)]
struct NodeListReply {
    #[serde(rename = "GetNodeListResult")]
    result: Vec<Node>,
}

#[derive(Debug, serde::Deserialize)]
struct ChannelListReply {
    #[serde(rename = "GetChannelListResult")]
    result: Vec<Channel>,
}

#[derive(Debug, serde::Deserialize)]
struct DataReply {
    #[serde(rename = "GetDataResult")]
    result: RawChannelData,
}

#[derive(Debug, serde::Deserialize)]
struct MultiChannelReply {
    #[serde(rename = "GetDataMultiChannelResult")]
    result: Vec<RawChannelData>,
}

impl Client {
    /// Creates a client for the service rooted at `host`,
    /// e.g. `http://restservice-neon1.niwa.co.nz/NeonRESTService.svc`.
    ///
    /// Requests carry no timeout unless one is set with [`Client::with_timeout`].
    pub fn new(host: impl Into<String>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("neonrest/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("neonrest")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(None::<Duration>)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            host: host.into(),
            timeout: None,
            http,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Exchanges username/password for a session token.
    ///
    /// Missing credentials are requested from `prompt`.
    pub fn get_session(
        &self,
        username: Option<String>,
        password: Option<String>,
        prompt: &mut dyn CredentialPrompt,
    ) -> Result<AuthToken> {
        let (username, password) = resolve_credentials(username, password, prompt)?;
        let reply: SessionReply = self.neon_request(
            "GetSession",
            &[("u", username.as_str()), ("p", password.as_str())],
            None,
        )?;
        Ok(AuthToken(reply.token))
    }

    pub fn get_node_list(&self, token: &AuthToken) -> Result<Vec<Node>> {
        let reply: NodeListReply = self.neon_request("GetNodeList", &[], Some(token))?;
        Ok(reply.result)
    }

    /// Lists the channels of `node_id`, in the order the service reports them.
    pub fn get_channel_list(
        &self,
        token: &AuthToken,
        node_id: impl Display,
        show_inactive: bool,
    ) -> Result<Vec<Channel>> {
        let page = format!("GetChannelList/{}", node_id);
        let reply: ChannelListReply = self.neon_request(
            &page,
            &[("ShowInactive", wire_bool(show_inactive))],
            Some(token),
        )?;
        Ok(reply.result)
    }

    /// Samples of one channel between `start` and `end`.
    pub fn get_data(
        &self,
        token: &AuthToken,
        channel_id: impl Display,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
        dst_adjust: bool,
    ) -> Result<ChannelData> {
        let page = format!("GetData/{}", channel_id);
        let (start, end) = (format_time(start), format_time(end));
        let reply: DataReply = self.neon_request(
            &page,
            &[
                ("StartTime", start.as_str()),
                ("EndTime", end.as_str()),
                ("DSTAdjust", wire_bool(dst_adjust)),
            ],
            Some(token),
        )?;
        reply.result.into_channel_data()
    }

    /// Samples of several channels between `start` and `end`.
    ///
    /// One entry per channel in the reply, each with its samples converted, in reply order.
    pub fn get_data_multi_channel<T: Display>(
        &self,
        token: &AuthToken,
        channel_ids: &[T],
        start: &NaiveDateTime,
        end: &NaiveDateTime,
        dst_adjust: bool,
    ) -> Result<Vec<ChannelData>> {
        let channels = join_ids(channel_ids);
        let (start, end) = (format_time(start), format_time(end));
        let reply: MultiChannelReply = self.neon_request(
            "GetDataMultiChannel",
            &[
                ("Channels", channels.as_str()),
                ("StartTime", start.as_str()),
                ("EndTime", end.as_str()),
                ("DSTAdjust", wire_bool(dst_adjust)),
            ],
            Some(token),
        )?;
        reply
            .result
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                d.into_channel_data()
                    .with_context(|| format!("channel entry #{} of GetDataMultiChannel", i))
            })
            .collect()
    }

    fn request(&self, url: &str, token: Option<&AuthToken>) -> RequestBuilder {
        let mut req = self.http.get(url);
        if let Some(token) = token {
            let (name, value) = token.header();
            req = req.header(name, value);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req
    }

    fn neon_request<TResp: DeserializeOwned>(
        &self,
        page: &str,
        query: &[(&str, &str)],
        token: Option<&AuthToken>,
    ) -> Result<TResp> {
        let url = urljoin(&self.host, page);
        tracing::debug!(page, "NEON request");

        let resp = self
            .request(&url, token)
            .query(query)
            .send()
            .with_context(|| format!("could not connect (url={})", url))?;

        let status = resp.status();
        let text = resp
            .text()
            .with_context(|| format!("failed to read response body (url={})", url))?;
        if !status.is_success() {
            bail!(
                "NEON request failed: HTTP {} for url ({})\n{}",
                status,
                url,
                text
            );
        }

        serde_json::from_str::<TResp>(&text)
            .with_context(|| format!("failed to parse NEON JSON (url={}, status={})", url, status))
    }
}
