//! Line-delimited JSON request loop
//!
//! One request object per input line, one response object per output line:
//!
//! ```text
//! {"op":"metadata"}
//! {"op":"schema","type":"azidentity_http_request"}
//! {"op":"open","type":"azidentity_environment_variable","config":{"key":"HOME"}}
//! {"op":"call","function":"unsafe_parse_jwt","args":["eyJ..."]}
//! ```

use azidentity_core::framework::Diagnostics;
use azidentity_core::{AzidentityProvider, HttpError, SettingsError};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Http(#[from] HttpError),
}

pub type PluginResult<T> = Result<T, PluginError>;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Metadata,
    Schema {
        #[serde(rename = "type")]
        type_name: String,
    },
    FunctionDefinition {
        function: String,
    },
    Open {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default)]
        config: Value,
    },
    Call {
        function: String,
        #[serde(default)]
        args: Vec<Value>,
    },
}

fn diagnostics_response(diagnostics: Diagnostics) -> PluginResult<Value> {
    Ok(json!({ "diagnostics": serde_json::to_value(diagnostics)? }))
}

async fn handle(provider: &AzidentityProvider, request: Request) -> PluginResult<Value> {
    match request {
        Request::Metadata => Ok(serde_json::to_value(provider.metadata())?),
        Request::Schema { type_name } => match provider.resource_schema(&type_name) {
            Ok(schema) => Ok(json!({ "schema": serde_json::to_value(schema)? })),
            Err(diagnostics) => diagnostics_response(diagnostics),
        },
        Request::FunctionDefinition { function } => match provider.function_definition(&function) {
            Ok(definition) => Ok(json!({ "definition": serde_json::to_value(definition)? })),
            Err(diagnostics) => diagnostics_response(diagnostics),
        },
        Request::Open { type_name, config } => {
            Ok(serde_json::to_value(provider.open(&type_name, config).await)?)
        }
        Request::Call { function, args } => match provider.call(&function, args).await {
            Ok(result) => Ok(json!({ "result": result })),
            Err(diagnostics) => diagnostics_response(diagnostics),
        },
    }
}

/// Answer requests from `reader` until end of input
pub async fn serve<R, W>(provider: &AzidentityProvider, reader: R, mut writer: W) -> PluginResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle(provider, request).await?,
            Err(e) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_error("Invalid request", e.to_string());
                diagnostics_response(diagnostics)?
            }
        };

        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}
