//! # Download de Conteúdo
//!
//! Colaborador que, dado um URL, devolve o texto visível do `<body>` da
//! página: conteúdo de `<script>` é descartado e cada nó de texto é aparado e
//! unido aos demais por um único espaço.
//!
//! Qualquer falha (rede, status HTTP, corpo ilegível) vira string vazia, que o
//! chamador deve tratar como "sem conteúdo".

use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};

/// Fonte de texto a partir de um URL.
pub trait ContentSource: Send + Sync {
    /// Texto extraído da página, ou `""` em caso de falha.
    fn fetch_text(&self, url: &str) -> String;
}

/// Extrator de texto de HTML baseado em expressões regulares.
#[derive(Debug, Clone)]
pub struct HtmlText {
    body: Regex,
    script: Regex,
    tag: Regex,
}

impl HtmlText {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| AnalysisError::invalid_argument(format!("bad html pattern: {e}")))
        };
        Ok(Self {
            body: compile(r"(?is)<body\b[^>]*>(.*)</body\s*>")?,
            script: compile(r"(?is)<script\b[^>]*>.*?</script\s*>|<!--.*?-->")?,
            tag: compile(r"(?s)<[^>]*>")?,
        })
    }

    /// Texto dos nós do `<body>` (o documento inteiro se não houver `<body>`).
    pub fn extract(&self, html: &str) -> String {
        let body = self
            .body
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(html);
        let without_scripts = self.script.replace_all(body, " ");

        self.tag
            .split(&without_scripts)
            .map(|node| decode_entities(node.trim()))
            .filter(|node| !node.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Fonte HTTP (bloqueante) baseada em `ureq`.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    timeout: Duration,
    html: HtmlText,
}

impl HttpContentSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self { timeout, html: HtmlText::new()? })
    }

    fn download(&self, url: &str) -> std::result::Result<String, String> {
        let response = ureq::get(url).timeout(self.timeout).call().map_err(|e| e.to_string())?;
        if response.status() != 200 {
            return Err(format!("HTTP {}", response.status()));
        }
        response.into_string().map_err(|e| e.to_string())
    }
}

impl ContentSource for HttpContentSource {
    fn fetch_text(&self, url: &str) -> String {
        match self.download(url) {
            Ok(html) => {
                let text = self.html.extract(&html);
                debug!(url, bytes = html.len(), chars = text.len(), "content downloaded");
                text
            }
            Err(error) => {
                warn!(url, %error, "content fetch failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_body_text_skips_scripts() {
        let html = r#"<html><head><title>Ignored</title></head>
            <body>
              <h1> Amazon </h1>
              <script type="text/javascript">var x = "hidden";</script>
              <p>is a <b>company</b>.</p>
            </body></html>"#;
        let text = HtmlText::new().unwrap().extract(html);
        assert_eq!(text, "Amazon is a company .");
    }

    #[test]
    fn test_extract_without_body_and_entities() {
        let text = HtmlText::new().unwrap().extract("<div>Fish &amp; Chips</div>");
        assert_eq!(text, "Fish & Chips");
    }

    #[test]
    fn test_unreachable_url_yields_empty_text() {
        let source = HttpContentSource::new(Duration::from_millis(200)).unwrap();
        assert_eq!(source.fetch_text("http://127.0.0.1:9/nothing"), "");
        assert_eq!(source.fetch_text("not a url"), "");
    }
}
