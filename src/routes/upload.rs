use crate::config::UploadSettings;
use crate::core::UploadedFile;
use crate::error::ConsoleError;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::BTreeMap;
use tracing::warn;

/// A multipart form read into memory
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: BTreeMap<String, UploadedFile>,
    pub fields: BTreeMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Drain a multipart payload
///
/// Only parts named in `accepted` are kept: those carrying a filename as
/// files, the rest as text. Other parts are read through and dropped. A kept
/// part larger than `limits.max_bytes` fails the whole form.
pub async fn read_form(
    mut payload: Multipart,
    accepted: &[&str],
    limits: UploadSettings,
) -> Result<UploadForm, ConsoleError> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let (name, file_name) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(|n| n.to_string()),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (None, None),
        };
        let Some(name) = name.filter(|n| accepted.contains(&n.as_str())) else {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > limits.max_bytes {
                warn!("Multipart part `{}` exceeds {} bytes", name, limits.max_bytes);
                return Err(ConsoleError::Multipart(format!(
                    "part `{}` exceeds the {} byte upload limit",
                    name, limits.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match file_name {
            Some(file_name) => {
                form.files.insert(name, UploadedFile { file_name, bytes });
            }
            None => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| ConsoleError::Multipart(format!("field `{}` is not UTF-8", name)))?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}
