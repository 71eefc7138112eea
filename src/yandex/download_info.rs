//! Download descriptor parsing and media URL composition
//!
//! The URL found in a `download-info` variant points at a small XML document:
//!
//! ```xml
//! <download-info>
//!   <host>s123.storage.example</host>
//!   <path>/rmusic/U2FsdGVk/...</path>
//!   <ts>0005f1a2b3c4</ts>
//!   <region>-1</region>
//!   <s>d41d8cd98f00b204e9800998ecf8427e</s>
//! </download-info>
//! ```

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{ExportError, Result};

/// Host, path, signature and timestamp needed to build a streamable URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadDescriptor {
    pub host: String,
    pub path: String,
    pub ts: String,
    pub region: Option<String>,
    pub s: String,
}

impl DownloadDescriptor {
    /// Parse the descriptor document; all four URL parts must be present
    pub fn parse(body: &str) -> Result<Self> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut descriptor = Self::default();
        let mut element: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    element = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                }
                Ok(Event::Text(text)) => {
                    let Some(name) = element.as_deref() else {
                        continue;
                    };
                    let value = text
                        .unescape()
                        .map_err(|e| ExportError::Descriptor(e.to_string()))?
                        .into_owned();
                    match name {
                        "host" => descriptor.host = value,
                        "path" => descriptor.path = value,
                        "ts" => descriptor.ts = value,
                        "region" => descriptor.region = Some(value),
                        "s" => descriptor.s = value,
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => element = None,
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ExportError::Descriptor(format!("invalid XML: {e}"))),
            }
        }

        let missing: Vec<&str> = [
            ("host", &descriptor.host),
            ("path", &descriptor.path),
            ("ts", &descriptor.ts),
            ("s", &descriptor.s),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ExportError::Descriptor(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        Ok(descriptor)
    }

    /// `https://{host}/get-mp3/{s}/{ts}/{path}`
    pub fn media_url(&self) -> String {
        format!(
            "https://{}/get-mp3/{}/{}/{}",
            self.host,
            self.s,
            self.ts,
            self.path.trim_start_matches('/')
        )
    }
}
