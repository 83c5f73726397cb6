//! # Rest.li CLI
//!
//! Command-line utilities for encoding, decoding and debugging Rest.li
//! requests.

use anyhow::{bail, Context, Result};
use restli_client::{RestliClient, RestliClientConfig};
use restli_core::{
    build_rest_url, decode, encode, encode_query_params_for_get_requests, reduced_decode,
    RestliRequest, Value,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "encode" => {
            let raw = required(&args, 2, "restli encode <json>");
            let value = parse_json(raw)?;
            println!("{}", encode(&value));
        }
        "decode" => {
            let raw = required(&args, 2, "restli decode <encoded>");
            let decoded = decode(raw).context("Failed to decode")?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        "reduced-decode" => {
            let raw = required(&args, 2, "restli reduced-decode <encoded>");
            let decoded = reduced_decode(raw).context("Failed to decode")?;
            println!("{}", serde_json::to_string_pretty(&decoded)?);
        }
        "query" => {
            let raw = required(&args, 2, "restli query <json-object>");
            let value = parse_json(raw)?;
            let Some(params) = value.as_object() else {
                bail!("query parameters must be a JSON object");
            };
            println!("{}", encode_query_params_for_get_requests(Some(params)));
        }
        "url" => {
            let path = required(&args, 2, "restli url <path> [path-keys-json] [version]");
            let path_keys = args.get(3).map(|raw| parse_json(raw)).transpose()?;
            let version = args.get(4).map(String::as_str);

            let config = RestliClientConfig::from_env()?;
            let url = build_rest_url(
                &config.api_hosts(),
                path,
                path_keys.as_ref().and_then(Value::as_object),
                version,
            )?;
            println!("{url}");
        }
        "get" => {
            let path = required(&args, 2, "restli get <path> [version]");
            let token = env::var("RESTLI_ACCESS_TOKEN")
                .context("RESTLI_ACCESS_TOKEN must be set for 'get'")?;

            let mut request = RestliRequest::new(path.as_str(), token);
            if let Some(version) = args.get(3) {
                request = request.with_version(version.as_str());
            }

            let config = RestliClientConfig::from_env()?;
            let client = RestliClient::from_config(&config)?;
            let response = client.get(&request).await?;

            tracing::info!(status = response.status_code, url = %response.url, "GET completed");
            println!("{}", serde_json::to_string_pretty(&response.data.entity)?);
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, usage: &str) -> &'a String {
    if let Some(arg) = args.get(index) {
        return arg;
    }
    eprintln!("Usage: {usage}");
    std::process::exit(1);
}

/// Parse a JSON argument; anything that is not valid JSON is taken as a
/// plain string.
fn parse_json(raw: &str) -> Result<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(e) if e.is_syntax() || e.is_eof() => Ok(Value::String(raw.to_string())),
        Err(e) => Err(e).context("Failed to parse JSON argument"),
    }
}

fn print_help() {
    println!(
        r#"Rest.li CLI

USAGE:
    restli <COMMAND> [OPTIONS]

COMMANDS:
    encode <json>                          Encode a JSON value with the Rest.li grammar
    decode <encoded>                       Decode a Rest.li-encoded value
    reduced-decode <encoded>               Decode a header value (reduced escaping)
    query <json-object>                    Encode query parameters for a GET request
    url <path> [path-keys-json] [version]  Build a resource URL
    get <path> [version]                   Fetch an entity (token from RESTLI_ACCESS_TOKEN)
    help                                   Show this help message

ENVIRONMENT:
    RESTLI_ACCESS_TOKEN, RESTLI_VERSIONED_BASE_URL, RESTLI_NON_VERSIONED_BASE_URL,
    RESTLI_OAUTH_BASE_URL, RESTLI_TIMEOUT_SECS, RESTLI_CA_CERT_PATH, RUST_LOG

EXAMPLES:
    restli encode '{{"k1":"v1","k2":["a","b"]}}'
    restli decode "(k1:v1,k2:List(a,b))"
    restli url "/adAccounts/{{id}}" '{{"id":123}}' 202401
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_arguments() {
        assert_eq!(parse_json("[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(parse_json(r#"{"a":"b"}"#).unwrap(), json!({"a": "b"}));
    }

    #[test]
    fn bare_words_are_strings() {
        assert_eq!(
            parse_json("urn:li:person:1").unwrap(),
            json!("urn:li:person:1")
        );
    }
}
