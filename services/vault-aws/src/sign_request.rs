// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use http::HeaderValue;
use http::Method;
use iamsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use iamsign_core::time::{format_date, format_iso8601, now, DateTime};
use iamsign_core::{Error, RequestDescriptor, Result};
use log::debug;

use crate::constants::*;
use crate::{Config, Credential};

/// SigningContext binds a signature to a point in time and a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// Signing time, read once per signing call.
    pub time: DateTime,
    /// Region of the credential scope.
    pub region: String,
    /// Service of the credential scope, `sts` for GetCallerIdentity.
    pub service: String,
}

impl SigningContext {
    /// Create a context for the STS service.
    pub fn new(time: DateTime, region: &str) -> Self {
        Self {
            time,
            region: region.to_string(),
            service: STS_SERVICE.to_string(),
        }
    }

    /// Override the service name.
    pub fn with_service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    /// Timestamp in `yyyymmddThhmmssZ` form, as sent in `X-Amz-Date`.
    pub fn timestamp(&self) -> String {
        format_iso8601(self.time)
    }

    /// Date portion of the timestamp: `yyyymmdd`.
    pub fn date(&self) -> String {
        format_date(self.time)
    }

    /// Credential scope: `20230101/us-east-1/sts/aws4_request`.
    pub fn credential_scope(&self) -> String {
        credential_scope(&self.date(), &self.region, &self.service)
    }
}

/// Canonical form of a request together with its signed header list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// The canonical request string.
    pub canonical: String,
    /// Lowercase, sorted, semicolon-joined header names.
    pub signed_headers: String,
}

/// Build the canonical request.
///
/// Every header present on `req` is signed. Names are lower-cased and
/// sorted here, values only get surrounding whitespace trimmed. Path and
/// query are taken verbatim.
///
/// ```text
/// POST
/// /
///
/// content-type:application/x-www-form-urlencoded; charset=utf-8
/// host:sts.amazonaws.com
/// x-amz-date:20230101T000000Z
///
/// content-type;host;x-amz-date
/// <hex sha256 of body>
/// ```
pub fn canonical_request(req: &RequestDescriptor) -> CanonicalRequest {
    let mut headers = req
        .headers
        .iter()
        .map(|(k, v)| {
            (
                k.to_ascii_lowercase(),
                v.trim_matches(|c: char| c == ' ' || c == '\t'),
            )
        })
        .collect::<Vec<_>>();
    headers.sort_by(|a, b| a.0.cmp(&b.0));

    let signed_headers = headers
        .iter()
        .map(|(k, _)| k.as_str())
        .collect::<Vec<_>>()
        .join(";");

    // 256 is specially chosen to avoid reallocation for most requests.
    let mut s = String::with_capacity(256);
    s.push_str(req.method.as_str());
    s.push('\n');
    s.push_str(&req.path);
    s.push('\n');
    s.push_str(&req.query);
    s.push('\n');
    for (k, v) in &headers {
        s.push_str(k);
        s.push(':');
        s.push_str(v);
        s.push('\n');
    }
    s.push('\n');
    s.push_str(&signed_headers);
    s.push('\n');
    s.push_str(&hex_sha256(&req.body));

    CanonicalRequest {
        canonical: s,
        signed_headers,
    }
}

/// Scope: `<date>/<region>/<service>/aws4_request`
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}")
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20230101T000000Z
/// 20230101/us-east-1/sts/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(ctx: &SigningContext, scope: &str, creq: &CanonicalRequest) -> String {
    format!(
        "{ALGORITHM}\n{}\n{scope}\n{}",
        ctx.timestamp(),
        hex_sha256(creq.canonical.as_bytes())
    )
}

/// Derive the scoped signing key from the secret key.
///
/// The key is rebuilt on every call and must not outlive it.
pub fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, service.as_bytes());
    // Sign request
    hmac_sha256(&sign_service, SCOPE_TERMINATOR.as_bytes())
}

/// Lowercase hex HMAC-SHA256 of the string to sign.
pub fn calculate_signature(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

/// Value of the `Authorization` header.
pub fn authorization_header(
    access_key_id: &str,
    scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}

/// RequestSigner produces signed STS GetCallerIdentity requests.
///
/// It only keeps non-secret settings; credentials are passed on every call
/// and nothing derived from them survives the call.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    region: String,
    regional_endpoint: bool,
    server_id_header_value: Option<String>,

    time: Option<DateTime>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new(DEFAULT_REGION)
    }
}

impl RequestSigner {
    /// Create a signer for the given region against the global STS endpoint.
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            regional_endpoint: false,
            server_id_header_value: None,

            time: None,
        }
    }

    /// Create a signer from login config.
    pub fn from_config(cfg: &Config) -> Self {
        let mut signer = Self::new(&cfg.region);
        signer.regional_endpoint = cfg.use_regional_endpoint();
        signer.server_id_header_value = cfg.server_id_header_value.clone();
        signer
    }

    /// Send `X-Vault-AWS-IAM-Server-ID` with the given value.
    ///
    /// The header is signed, so the verifier can check that the request was
    /// meant for it.
    pub fn with_server_id_header(mut self, value: &str) -> Self {
        self.server_id_header_value = Some(value.to_string());
        self
    }

    /// Target `sts.{region}.amazonaws.com` instead of the global endpoint.
    ///
    /// `cn-` regions use `sts.{region}.amazonaws.com.cn`.
    pub fn with_regional_endpoint(mut self) -> Self {
        self.regional_endpoint = true;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Configured region.
    ///
    /// Only the regional endpoint signs for it; the global endpoint always
    /// signs for `us-east-1`.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Resolve the STS endpoint and the region it expects in the scope.
    ///
    /// The global endpoint only accepts `us-east-1` scopes, whatever region
    /// is configured.
    fn endpoint(&self) -> Result<StsEndpoint> {
        if !self.regional_endpoint {
            return Ok(StsEndpoint {
                url: STS_GLOBAL_ENDPOINT.to_string(),
                host: STS_GLOBAL_HOST.to_string(),
                signing_region: DEFAULT_REGION.to_string(),
            });
        }

        let region = self.region.as_str();
        if region.is_empty() {
            return Err(Error::config_invalid("regional STS endpoint requires region"));
        }
        let host = if region.starts_with("cn-") {
            format!("sts.{region}.amazonaws.com.cn")
        } else {
            format!("sts.{region}.amazonaws.com")
        };
        Ok(StsEndpoint {
            url: format!("https://{host}/"),
            host,
            signing_region: region.to_string(),
        })
    }

    /// Build the unsigned GetCallerIdentity request.
    ///
    /// The server id header is part of the template so it gets covered by
    /// the signature.
    pub fn request_template(&self) -> Result<RequestDescriptor> {
        self.template_for(&self.endpoint()?)
    }

    fn template_for(&self, endpoint: &StsEndpoint) -> Result<RequestDescriptor> {
        let mut req =
            RequestDescriptor::new(Method::POST, &endpoint.url, GET_CALLER_IDENTITY_BODY)?;
        req.headers.insert(CONTENT_TYPE, FORM_CONTENT_TYPE);
        req.headers.insert(HOST, endpoint.host.as_str());

        if let Some(v) = non_empty(&self.server_id_header_value) {
            HeaderValue::from_str(v).map_err(|e| {
                Error::request_invalid("server id header value is not a valid header value")
                    .with_source(e)
            })?;
            req.headers.insert(X_VAULT_AWS_IAM_SERVER_ID, v);
        }

        Ok(req)
    }

    /// Sign a GetCallerIdentity request at the current time.
    pub fn sign(&self, cred: &Credential) -> Result<RequestDescriptor> {
        let now = self.time.unwrap_or_else(now);
        self.sign_at(cred, now)
    }

    /// Sign a GetCallerIdentity request at the given time.
    ///
    /// The same timestamp feeds `X-Amz-Date` and the credential scope.
    pub fn sign_at(&self, cred: &Credential, time: DateTime) -> Result<RequestDescriptor> {
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }

        let endpoint = self.endpoint()?;
        let ctx = SigningContext::new(time, &endpoint.signing_region);
        let mut req = self.template_for(&endpoint)?;

        // Every header below is added before canonicalization so it is signed.
        req.headers.insert(X_AMZ_DATE, ctx.timestamp());
        if let Some(token) = non_empty(&cred.session_token) {
            HeaderValue::from_str(token).map_err(|e| {
                Error::request_invalid("session token is not a valid header value").with_source(e)
            })?;
            req.headers.insert(X_AMZ_SECURITY_TOKEN, token);
        }

        let creq = canonical_request(&req);
        debug!("calculated signed headers: {}", creq.signed_headers);

        let scope = ctx.credential_scope();
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(&ctx, &scope, &creq);
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            &cred.secret_access_key,
            &ctx.date(),
            &ctx.region,
            &ctx.service,
        );
        let signature = calculate_signature(&signing_key, &string_to_sign);

        req.headers.insert(
            AUTHORIZATION,
            authorization_header(
                &cred.access_key_id,
                &scope,
                &creq.signed_headers,
                &signature,
            ),
        );

        Ok(req)
    }
}

struct StsEndpoint {
    url: String,
    host: String,
    signing_region: String,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|v| !v.is_empty())
}
