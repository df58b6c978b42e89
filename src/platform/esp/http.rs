use anyhow::{bail, Result};
use embedded_svc::http::client::Client;
use embedded_svc::http::Method;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::info;

use crate::weather::HttpFetch;

const TIMEOUT_MS: u64 = 15_000;
/// A five-day forecast runs to roughly 16 KB.
const MAX_BODY_BYTES: usize = 48 * 1024;

/// Blocking HTTPS GET over ESP-IDF with the certificate bundle.
pub struct EspHttp;

impl HttpFetch for EspHttp {
    fn get(&mut self, url: &str) -> Result<String> {
        let config = Configuration {
            timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&config)?;
        let mut client = Client::wrap(connection);
        let request = client.request(Method::Get, url, &[])?.submit()?;

        // The query string carries the API key.
        let path = url.split('?').next().unwrap_or(url);
        let status = request.status();
        info!("HTTP GET {} -> status {}", path, status);

        if status == 401 {
            bail!("API key rejected (HTTP 401)");
        }
        if status == 429 {
            bail!("API rate limited (HTTP 429)");
        }
        if status != 200 {
            bail!("HTTP error: status {}", status);
        }

        let mut body: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        let mut reader = request;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
            if body.len() > MAX_BODY_BYTES {
                bail!("Response too large (>{}KB)", MAX_BODY_BYTES / 1024);
            }
        }

        let text = String::from_utf8(body)?;
        if !text.trim_start().starts_with('{') {
            bail!("Response is not JSON");
        }
        Ok(text)
    }
}
