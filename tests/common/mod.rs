// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared fixtures for the integration tests

#![allow(dead_code)]

use configle_analyzer::{ConfigAnalyzer, Diagnostic, MessageKind, Schema};

/// Schema in the host application's JSON shape
pub const SCHEMA_JSON: &str = r#"{
    "containers": [
        {"value": "server", "title": "Server", "suggestions": [
            {"value": "main", "title": "Main server"},
            {"value": "backup", "title": "Backup server"}
        ]},
        {"value": "database", "title": "Database"}
    ],
    "keys": [
        {"value": "port", "title": "Port", "assign": {"type": "int", "default": "80", "condition": "between:1,65535"}},
        {"value": "retries", "title": "Retries", "assign": {"type": "int", "condition": "between:0,300"}},
        {"value": "net", "title": "Network", "type": "namespace", "suggestions": [
            {"value": "timeout", "title": "Timeout", "assign": {"type": "float", "example": "1.5,3,10"}},
            {"value": "host", "title": "Host", "assign": {"type": "string"}}
        ]},
        {"value": "proto", "title": "Protocol", "assign": {"condition": "in:a,b,c"}},
        {"value": "debug", "title": "Debug", "assign": {"type": "bool", "default": "false"}},
        {"value": "iface", "title": "Interfaces", "type": "namespace", "suggestions": [
            {"value": "name", "title": "Interface", "type": "variable", "suggestions": [
                {"value": "mtu", "title": "MTU", "assign": {"type": "int"}}
            ]}
        ]}
    ]
}"#;

pub fn schema() -> Schema {
    Schema::from_json_str(SCHEMA_JSON).expect("fixture schema is valid")
}

pub fn analyzer() -> ConfigAnalyzer {
    ConfigAnalyzer::new(schema())
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<MessageKind> {
    diagnostics.iter().map(|diagnostic| diagnostic.message).collect()
}
