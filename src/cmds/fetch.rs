use std::fs;
use std::io::Write;

use crate::cli::fetch::FetchOptions;
use crate::error::{AddContext, ProxyError};
use crate::http::Request;
use crate::proxy::OfflineProxy;
use crate::Result;

pub fn execute<W: Write>(
    options: FetchOptions,
    proxy: &OfflineProxy,
    writer: &mut W,
) -> Result<()> {
    let url = proxy.origin().join(&options.url).map_err(|err| {
        ProxyError::InvalidUrl(format!("Cannot resolve {}: {err}", options.url))
    })?;
    let mut request =
        Request::from_url(url, options.method).with_destination(options.destination);
    for header in &options.headers {
        let (name, value) = parse_header(header)?;
        request.set_header(name, value);
    }
    if let Some(data) = options.data {
        request = request.with_body(data.into_bytes());
    }
    let response = proxy.respond(&request)?;
    writeln!(writer, "HTTP {}", response.status)?;
    match options.output {
        Some(path) => {
            fs::write(&path, &response.body)
                .err_context(format!("Cannot write response body to {path}"))?;
            writeln!(writer, "Saved {} bytes to {path}", response.body.len())?;
        }
        None => {
            writer.write_all(&response.body)?;
            if !response.body.is_empty() && !response.body.ends_with(b"\n") {
                writeln!(writer)?;
            }
        }
    }
    Ok(())
}

fn parse_header(header: &str) -> Result<(&str, &str)> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(ProxyError::InvalidRequest(format!(
            "Header {header:?} is not in the form `Name: value`"
        ))
        .into()),
    }
}
