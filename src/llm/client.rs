use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::llm::types::*;
use log::debug;
use reqwest::blocking::Client;

const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Text generation against an Ollama server's `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OllamaClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: OLLAMA_BASE_URL.to_string(),
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.model.clone()).with_temperature(config.temperature)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the HTTP client, e.g. to set timeouts or proxy rules.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let payload = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        debug!("Requesting narrative from {} ({})", url, self.model);
        let res = self.client.post(&url).json(&payload).send()?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text()?;
            return Err(ReportError::Generation(format!(
                "Ollama API Error (status {}): {}",
                status, err_text
            )));
        }

        let body: GenerateResponse = res.json()?;
        if body.response.trim().is_empty() {
            return Err(ReportError::Generation(
                "Model returned an empty response".to_string(),
            ));
        }
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    #[test]
    fn test_builder() {
        let client = OllamaClient::new("llama3.2:1b")
            .with_base_url("http://example:11434/")
            .with_temperature(0.2);
        assert_eq!(client.model(), "llama3.2:1b");
        assert_eq!(client.base_url, "http://example:11434");
        assert_eq!(client.temperature, 0.2);
    }

    /// Answers exactly one request with `status` and `body`, returning the
    /// base URL and a handle yielding the raw request text.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });
        (base_url, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn local_client(base_url: &str) -> OllamaClient {
        OllamaClient::new("llama3.2:1b")
            .with_http_client(Client::builder().no_proxy().build().unwrap())
            .with_base_url(base_url)
    }

    #[test]
    fn test_generate_returns_response_field() {
        let (base_url, server) = serve_once("200 OK", r#"{"response":"Informe listo.","done":true}"#);
        let text = local_client(&base_url).generate("hola").unwrap();
        assert_eq!(text, "Informe listo.");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/generate "));
        assert!(request.contains(r#""model":"llama3.2:1b""#));
        assert!(request.contains(r#""stream":false"#));
        assert!(request.contains(r#""temperature":0.0"#));
    }

    #[test]
    fn test_error_status_is_generation_error() {
        let (base_url, server) = serve_once("500 Internal Server Error", r#"{"error":"model not found"}"#);
        let err = local_client(&base_url).generate("hola").unwrap_err();
        server.join().unwrap();
        match err {
            ReportError::Generation(message) => assert!(message.contains("model not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_response_is_generation_error() {
        let (base_url, server) = serve_once("200 OK", r#"{"response":"  ","done":true}"#);
        let err = local_client(&base_url).generate("hola").unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ReportError::Generation(_)));
    }
}
