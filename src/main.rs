// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use agent_identity::config::{EnvMap, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV};
use agent_identity::identity::{bootstrap_identity, BootstrapIdentityOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing(env: &EnvMap) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so stdout carries only the trust config
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if env.get(LOG_FORMAT_ENV) == Some("json") {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

#[tokio::main]
async fn main() {
    let options = BootstrapIdentityOptions::from_env();
    init_tracing(&options.env);

    let result = bootstrap_identity(options).await;

    if let Some(tx_hash) = result.transaction_hash {
        tracing::info!(%tx_hash, did_register = result.did_register, "Registration submitted");
    }
    for warning in &result.warnings {
        tracing::warn!(%warning, "Identity bootstrap warning");
    }

    let Some(trust) = result.trust else {
        tracing::info!("No trust config produced");
        return;
    };

    match serde_json::to_string_pretty(&trust) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize trust config");
            std::process::exit(1);
        }
    }
}
