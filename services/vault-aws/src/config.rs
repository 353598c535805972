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

use iamsign_core::Context;
use log::debug;

use crate::constants::*;

/// Config for Vault AWS IAM login.
///
/// Credentials are never part of the config, callers hand them over on
/// every signing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `address` of the Vault server, loaded from:
    ///
    /// - env value: [`VAULT_ADDR`]
    /// - default to: `https://127.0.0.1:8200`
    pub address: String,
    /// `mount_point` the AWS auth method is mounted on, loaded from:
    ///
    /// - env value: [`VAULT_AWS_MOUNT_POINT`]
    /// - default to: `aws`
    pub mount_point: String,
    /// `role` to log in against, loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VAULT_AWS_ROLE`]
    ///
    /// Vault falls back to the friendly name of the IAM principal when no
    /// role is given.
    pub role: Option<String>,
    /// `region` used for the regional STS endpoint and its credential
    /// scope, loaded from:
    ///
    /// - env value: [`AWS_REGION`]
    /// - default to: `us-east-1`
    pub region: String,
    /// `server_id_header_value` sent as `X-Vault-AWS-IAM-Server-ID`, loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`VAULT_AWS_IAM_SERVER_ID`]
    pub server_id_header_value: Option<String>,
    /// `sts_regional_endpoints` selects the STS endpoint, loaded from:
    ///
    /// - env value: [`AWS_STS_REGIONAL_ENDPOINTS`]
    /// - default to `legacy`
    ///
    /// `legacy` talks to `sts.amazonaws.com` and always signs for
    /// `us-east-1`, `regional` to `sts.{region}.amazonaws.com`.
    pub sts_regional_endpoints: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_VAULT_ADDR.to_string(),
            mount_point: DEFAULT_MOUNT_POINT.to_string(),
            role: None,
            region: DEFAULT_REGION.to_string(),
            server_id_header_value: None,
            sts_regional_endpoints: "legacy".to_string(),
        }
    }
}

impl Config {
    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if let Some(v) = envs.get(VAULT_ADDR) {
            self.address = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = envs.get(VAULT_AWS_MOUNT_POINT) {
            self.mount_point = v.trim_matches('/').to_string();
        }
        if let Some(v) = envs.get(VAULT_AWS_ROLE) {
            self.role.get_or_insert_with(|| v.to_string());
        }
        if let Some(v) = envs.get(AWS_REGION) {
            self.region = v.to_string();
        }
        if let Some(v) = envs.get(VAULT_AWS_IAM_SERVER_ID) {
            self.server_id_header_value
                .get_or_insert_with(|| v.to_string());
        }
        if let Some(v) = envs.get(AWS_STS_REGIONAL_ENDPOINTS) {
            self.sts_regional_endpoints = v.to_string();
        }

        debug!(
            "loaded config: address {}, mount point {}, region {}",
            self.address, self.mount_point, self.region
        );
        self
    }

    /// Whether the regional STS endpoint should be used.
    pub fn use_regional_endpoint(&self) -> bool {
        self.sts_regional_endpoints == "regional"
    }

    /// Login endpoint for the configured mount point.
    pub fn login_url(&self) -> String {
        format!(
            "{}/v1/auth/{}/login",
            self.address.trim_end_matches('/'),
            self.mount_point.trim_matches('/')
        )
    }
}
