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

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use http::header;
use http::Method;
use iamsign_core::hash::base64_encode;
use iamsign_core::utils::Redact;
use iamsign_core::{Context, Error, RequestDescriptor, Result};
use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::{Config, Credential, RequestSigner};

/// Body of an `iam` login against Vault's AWS auth method.
///
/// Vault replays the described request against STS, so every field must
/// match the signed request exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginPayload {
    /// HTTP method of the signed request, sent as is.
    pub iam_http_request_method: String,
    /// Base64 of the signed request URL.
    pub iam_request_url: String,
    /// Base64 of the JSON object `{"Header-Name": ["value"]}`.
    pub iam_request_headers: String,
    /// Base64 of the signed request body.
    pub iam_request_body: String,
    /// Role to log in against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl LoginPayload {
    /// Encode a signed GetCallerIdentity request.
    ///
    /// Fails with [`iamsign_core::ErrorKind::RequestInvalid`] if the body is
    /// not valid UTF-8.
    pub fn from_signed_request(req: &RequestDescriptor, role: Option<&str>) -> Result<Self> {
        let body = req.body_str()?;
        let headers = serde_json::to_vec(&req.headers)?;

        Ok(Self {
            iam_http_request_method: req.method.to_string(),
            iam_request_url: base64_encode(req.url.as_bytes()),
            iam_request_headers: base64_encode(&headers),
            iam_request_body: base64_encode(body.as_bytes()),
            role: role.filter(|v| !v.is_empty()).map(|v| v.to_string()),
        })
    }
}

/// Build `POST {address}/v1/auth/{mount_point}/login` carrying the payload.
pub fn build_login_request(cfg: &Config, payload: &LoginPayload) -> Result<http::Request<Bytes>> {
    let body = serde_json::to_vec(payload)?;

    let req = http::Request::builder()
        .method(Method::POST)
        .uri(cfg.login_url())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Bytes::from(body))?;
    Ok(req)
}

/// Response of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Issued token and its properties.
    pub auth: Option<AuthInfo>,
    /// Warnings attached by the server.
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

/// Token issued by Vault after the identity was verified.
#[derive(Clone, Default, Deserialize)]
pub struct AuthInfo {
    /// The token to use for subsequent requests.
    pub client_token: String,
    /// Accessor of the token.
    #[serde(default)]
    pub accessor: String,
    /// Policies attached to the token.
    #[serde(default)]
    pub policies: Vec<String>,
    /// Token policies, without identity policies.
    #[serde(default)]
    pub token_policies: Vec<String>,
    /// Metadata like `account_id` and `auth_type`.
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    /// Lease duration in seconds.
    #[serde(default)]
    pub lease_duration: u64,
    /// Whether the token can be renewed.
    #[serde(default)]
    pub renewable: bool,
}

impl Debug for AuthInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("client_token", &Redact::from(&self.client_token))
            .field("accessor", &self.accessor)
            .field("policies", &self.policies)
            .field("token_policies", &self.token_policies)
            .field("metadata", &self.metadata)
            .field("lease_duration", &self.lease_duration)
            .field("renewable", &self.renewable)
            .finish()
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

/// IamLogin authenticates against Vault with a signed GetCallerIdentity
/// request.
#[derive(Debug, Clone)]
pub struct IamLogin {
    config: Config,
    signer: RequestSigner,
}

impl IamLogin {
    /// Create a new login from config.
    pub fn new(config: Config) -> Self {
        let signer = RequestSigner::from_config(&config);
        Self { config, signer }
    }

    /// Replace the request signer.
    pub fn with_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// Config in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sign a fresh request and encode it as login payload.
    pub fn payload(&self, cred: &Credential) -> Result<LoginPayload> {
        let signed = self.signer.sign(cred)?;
        LoginPayload::from_signed_request(&signed, self.config.role.as_deref())
    }

    /// Log in and return the issued token.
    ///
    /// Rejections by the server are reported as
    /// [`iamsign_core::ErrorKind::CredentialDenied`] and never retried.
    pub async fn login(&self, ctx: &Context, cred: &Credential) -> Result<AuthInfo> {
        let payload = self.payload(cred)?;
        let req = build_login_request(&self.config, &payload)?;
        debug!("sending aws iam login request to {}", req.uri());

        let resp = ctx.http_send(req).await?;
        let status = resp.status();
        if !status.is_success() {
            let reason = match serde_json::from_slice::<ErrorResponse>(resp.body()) {
                Ok(v) if !v.errors.is_empty() => v.errors.join("; "),
                _ => String::from_utf8_lossy(resp.body()).to_string(),
            };
            let message = format!("login failed with status {status}: {reason}");
            debug!("{message}");

            return Err(if matches!(status.as_u16(), 400 | 401 | 403) {
                Error::credential_denied(message)
            } else {
                Error::unexpected(message)
            });
        }

        let resp: LoginResponse = serde_json::from_slice(resp.body())?;
        if let Some(warnings) = &resp.warnings {
            for w in warnings {
                debug!("login warning: {w}");
            }
        }
        resp.auth
            .ok_or_else(|| Error::unexpected("login response carries no auth block"))
    }
}
