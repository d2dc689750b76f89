//! Protected-endpoint resolution.
//!
//! Each mediated endpoint advertises a registry folder URL; the folder holds
//! a small `index.xml` descriptor whose `protectedEndpoint` child carries the
//! access URL clients should use. The resolver fetches that descriptor
//! either from a filesystem mirror or from the registry over HTTP, once per
//! endpoint per run. Every failure degrades to an empty resolution; the
//! reporting run itself is never aborted from here.
//!
//! The host-rewrite helpers are index-counting splices, not parse-based URL
//! surgery; their behavior on malformed input (fall back to the original
//! string) is inherited and pinned by tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::events::Event;
use url::Url;

use crate::catalog::EndpointId;
use crate::error::SoascapeError;
use crate::runlog::RunLog;

/// Index of the `n`-th occurrence of `delimiter` in `s`, or `None` when the
/// string has fewer than `n` occurrences (or `n` is zero).
pub fn nth_index_of(s: &str, delimiter: char, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let mut remaining = n;
    for (idx, ch) in s.char_indices() {
        if ch == delimiter {
            remaining -= 1;
            if remaining == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Replaces the host and leading path segments of `url_path` with
/// `alternate`: everything beyond the N-th `/` of `url_path` is spliced onto
/// the override, where N is the number of `/` characters in the override
/// itself. When `url_path` has fewer slashes than that, the whole of
/// `url_path` is appended (inherited splice behavior, kept).
pub fn replace_host(alternate: &str, url_path: &str) -> String {
    let count = alternate.matches('/').count();
    let addon = match nth_index_of(url_path, '/', count) {
        Some(idx) => url_path.get(idx + 1..).unwrap_or(url_path),
        None => url_path,
    };
    format!("{alternate}{addon}")
}

/// Strips scheme and host from an absolute URL: the substring from the first
/// `/` at least three characters past the first `:`. Returns the input
/// unchanged when no such pattern exists.
pub fn remove_host(url_path: &str) -> String {
    let Some(colon) = url_path.find(':') else {
        return url_path.to_string();
    };
    if url_path.len() - colon < 4 {
        return url_path.to_string();
    }
    let Some(tail) = url_path.get(colon + 3..) else {
        return url_path.to_string();
    };
    match tail.find('/') {
        Some(offset) => url_path[colon + 3 + offset..].to_string(),
        None => url_path.to_string(),
    }
}

/// Strategy for turning a registry folder URL into a local folder path in
/// filesystem mode. Selected by run configuration, never probed from the
/// environment.
pub trait LocalPathMapper: Send + Sync {
    /// Folder URL to local folder path string. The result may still be
    /// URL-encoded; the resolver decodes it before opening.
    fn map(&self, folder_url: &str) -> String;
}

/// Treats the folder URL directly as a local path (standalone invocation).
pub struct DirectPathMapper;

impl LocalPathMapper for DirectPathMapper {
    fn map(&self, folder_url: &str) -> String {
        folder_url.replace('/', std::path::MAIN_SEPARATOR_STR)
    }
}

/// Maps the URL's path (host removed) under a virtual-to-physical root
/// (hosted invocation).
pub struct VirtualRootMapper {
    root: PathBuf,
}

impl VirtualRootMapper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LocalPathMapper for VirtualRootMapper {
    fn map(&self, folder_url: &str) -> String {
        let relative = remove_host(folder_url);
        let mut path = self.root.to_string_lossy().into_owned();
        if !path.ends_with(std::path::MAIN_SEPARATOR) {
            path.push(std::path::MAIN_SEPARATOR);
        }
        path.push_str(relative.trim_start_matches('/'));
        path.replace('/', std::path::MAIN_SEPARATOR_STR)
    }
}

/// Credential configuration for HTTP-mode fetches, resolved lazily once per
/// run before the first network call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CredentialConfig {
    /// Rely on the caller's ambient identity; no explicit header is sent.
    #[default]
    Ambient,
    Basic {
        user: String,
        password: String,
        domain: String,
    },
}

impl CredentialConfig {
    /// Builds the `Authorization` header value, or `None` for ambient mode.
    /// An empty user id is invalid configuration and terminal for HTTP-mode
    /// resolution.
    pub fn authorization_header(&self) -> Result<Option<String>, SoascapeError> {
        match self {
            CredentialConfig::Ambient => Ok(None),
            CredentialConfig::Basic {
                user,
                password,
                domain,
            } => {
                if user.is_empty() {
                    return Err(SoascapeError::Endpoint(
                        "basic credentials require a user id".into(),
                    ));
                }
                let identity = if domain.is_empty() {
                    user.clone()
                } else {
                    format!("{domain}\\{user}")
                };
                let token = BASE64.encode(format!("{identity}:{password}"));
                Ok(Some(format!("Basic {token}")))
            }
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct HttpSettings {
    /// Explicit trust-all TLS policy, scoped to this resolver's agent only.
    pub insecure_skip_verify: bool,
    pub credentials: CredentialConfig,
}

/// Resolver configuration: one mode for the whole run.
#[derive(Clone, Debug)]
pub enum ResolverSettings {
    FileSystem { virtual_root: Option<PathBuf> },
    Http(HttpSettings),
}

enum Mode {
    FileSystem {
        mapper: Box<dyn LocalPathMapper>,
    },
    Http {
        settings: HttpSettings,
        agent: Option<ureq::Agent>,
        auth: CredentialState,
    },
}

enum CredentialState {
    Unresolved,
    Ready(Option<String>),
    Failed,
}

pub struct EndpointResolver {
    mode: Mode,
    alternate_host: Option<String>,
}

impl EndpointResolver {
    pub fn new(settings: ResolverSettings, alternate_host: Option<String>) -> Self {
        let mode = match settings {
            ResolverSettings::FileSystem { virtual_root } => Mode::FileSystem {
                mapper: match virtual_root {
                    Some(root) => Box::new(VirtualRootMapper::new(root)),
                    None => Box::new(DirectPathMapper) as Box<dyn LocalPathMapper>,
                },
            },
            ResolverSettings::Http(settings) => Mode::Http {
                settings,
                agent: None,
                auth: CredentialState::Unresolved,
            },
        };
        Self {
            mode,
            alternate_host,
        }
    }

    /// Filesystem mode with a caller-supplied path strategy.
    pub fn with_mapper(mapper: Box<dyn LocalPathMapper>, alternate_host: Option<String>) -> Self {
        Self {
            mode: Mode::FileSystem { mapper },
            alternate_host,
        }
    }

    /// Resolves the protected access URL behind one registry folder.
    /// Failures are logged and collapse to an empty string.
    pub fn resolve(&mut self, folder_url: &str, log: &mut RunLog) -> String {
        if folder_url.len() < 3 {
            return String::new();
        }

        let target = match self.alternate_host.as_deref() {
            Some(host) if !host.is_empty() => replace_host(host, folder_url),
            _ => folder_url.to_string(),
        };

        let loaded = match &mut self.mode {
            Mode::FileSystem { mapper } => load_local(mapper.as_ref(), &target),
            Mode::Http {
                settings,
                agent,
                auth,
            } => load_remote(settings, agent, auth, &target, log),
        };

        match loaded.and_then(|document| extract_protected_endpoint(&document)) {
            Ok(value) => value,
            Err(err) => {
                log.error(format!("failed reading index.xml from {folder_url}: {err}"));
                String::new()
            }
        }
    }
}

fn load_local(mapper: &dyn LocalPathMapper, folder_url: &str) -> Result<String, SoascapeError> {
    let encoded = format!("{}index.xml", mapper.map(folder_url));
    let decoded = percent_decode_str(&encoded).decode_utf8_lossy().into_owned();
    let path = PathBuf::from(decoded);
    fs::read_to_string(&path)
        .map_err(|err| SoascapeError::Endpoint(format!("{}: {err}", path.display())))
}

fn load_remote(
    settings: &HttpSettings,
    agent: &mut Option<ureq::Agent>,
    auth: &mut CredentialState,
    folder_url: &str,
    log: &mut RunLog,
) -> Result<String, SoascapeError> {
    let header = match auth {
        CredentialState::Ready(header) => header.clone(),
        CredentialState::Failed => {
            return Err(SoascapeError::Endpoint(
                "credentials unavailable for this run".into(),
            ));
        }
        CredentialState::Unresolved => match settings.credentials.authorization_header() {
            Ok(header) => {
                *auth = CredentialState::Ready(header.clone());
                header
            }
            Err(err) => {
                // Reported once; HTTP-mode resolution stays down for the run.
                log.error(format!("ERR: unable to resolve credentials: {err}"));
                *auth = CredentialState::Failed;
                return Err(SoascapeError::Endpoint(
                    "credentials unavailable for this run".into(),
                ));
            }
        },
    };

    if agent.is_none() {
        *agent = Some(build_agent(settings)?);
    }
    let Some(agent) = agent else {
        return Err(SoascapeError::Endpoint("http agent unavailable".into()));
    };

    let target = Url::parse(&format!("{folder_url}index.xml")).map_err(|err| {
        SoascapeError::Endpoint(format!("invalid registry url {folder_url}: {err}"))
    })?;

    let mut request = agent.get(target.as_str());
    if let Some(value) = &header {
        request = request.set("Authorization", value);
    }
    let response = request
        .call()
        .map_err(|err| SoascapeError::Endpoint(err.to_string()))?;
    response
        .into_string()
        .map_err(|err| SoascapeError::Endpoint(err.to_string()))
}

fn build_agent(settings: &HttpSettings) -> Result<ureq::Agent, SoascapeError> {
    let mut builder = ureq::AgentBuilder::new();
    if settings.insecure_skip_verify {
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|err| SoascapeError::Endpoint(format!("tls connector: {err}")))?;
        builder = builder.tls_connector(Arc::new(connector));
    }
    Ok(builder.build())
}

/// Text of the root element's immediate `protectedEndpoint` child, or empty
/// when absent.
fn extract_protected_endpoint(document: &str) -> Result<String, SoascapeError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut capturing = false;
    let mut value = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if depth == 1 && start.local_name().as_ref() == b"protectedEndpoint" {
                    capturing = true;
                    value.clear();
                }
                depth += 1;
            }
            Event::Text(text) if capturing => {
                value = text.unescape()?.into_owned();
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if capturing && depth == 1 {
                    return Ok(value);
                }
            }
            Event::Empty(start) => {
                if depth == 1 && start.local_name().as_ref() == b"protectedEndpoint" {
                    return Ok(String::new());
                }
            }
            Event::Eof => return Ok(String::new()),
            _ => {}
        }
    }
}

/// Write-once resolution results, keyed by endpoint identity. Populated in
/// one upfront pass and read-only for the rest of the run.
#[derive(Debug, Default)]
pub struct EndpointResolutionCache {
    entries: BTreeMap<EndpointId, String>,
}

impl EndpointResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a resolution; an existing entry is never overwritten.
    pub fn record(&mut self, endpoint: EndpointId, protected_url: String) {
        self.entries.entry(endpoint).or_insert(protected_url);
    }

    pub fn protected_url(&self, endpoint: EndpointId) -> &str {
        self.entries
            .get(&endpoint)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
