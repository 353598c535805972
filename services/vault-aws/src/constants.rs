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

// The fixed STS request that proves the caller's identity.
pub const STS_GLOBAL_ENDPOINT: &str = "https://sts.amazonaws.com/";
pub const STS_GLOBAL_HOST: &str = "sts.amazonaws.com";
pub const STS_SERVICE: &str = "sts";
pub const GET_CALLER_IDENTITY_BODY: &str = "Action=GetCallerIdentity&Version=2011-06-15";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

// SigV4 protocol constants.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const DEFAULT_REGION: &str = "us-east-1";

// Headers in the casing they are transmitted with.
pub const CONTENT_TYPE: &str = "Content-Type";
pub const HOST: &str = "Host";
pub const AUTHORIZATION: &str = "Authorization";
pub const X_AMZ_DATE: &str = "X-Amz-Date";
pub const X_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";
pub const X_VAULT_AWS_IAM_SERVER_ID: &str = "X-Vault-AWS-IAM-Server-ID";

// Vault login defaults.
pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";
pub const DEFAULT_MOUNT_POINT: &str = "aws";

// Env values used by the login configuration.
pub const VAULT_ADDR: &str = "VAULT_ADDR";
pub const VAULT_AWS_MOUNT_POINT: &str = "VAULT_AWS_MOUNT_POINT";
pub const VAULT_AWS_ROLE: &str = "VAULT_AWS_ROLE";
pub const VAULT_AWS_IAM_SERVER_ID: &str = "VAULT_AWS_IAM_SERVER_ID";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_STS_REGIONAL_ENDPOINTS: &str = "AWS_STS_REGIONAL_ENDPOINTS";
