use std::collections::HashMap;

use axum::extract::Multipart;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ServiceError;

/// One uploaded file from a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Collected multipart form: text fields by name plus uploaded files.
/// Checkbox semantics follow HTML forms: present means checked.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn require(&self, name: &str) -> Result<&str, ServiceError> {
        self.field(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ServiceError::ValidationError(format!("Missing required field '{name}'")))
    }

    /// Checkbox field: present (any value) means true.
    pub fn checkbox(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn decimal(&self, name: &str) -> Result<Decimal, ServiceError> {
        let raw = self.require(name)?;
        raw.trim()
            .parse::<Decimal>()
            .map_err(|_| ServiceError::ValidationError(format!("Field '{name}' must be a number")))
    }

    pub fn integer(&self, name: &str) -> Result<i32, ServiceError> {
        let raw = self.require(name)?;
        raw.trim()
            .parse::<i32>()
            .map_err(|_| ServiceError::ValidationError(format!("Field '{name}' must be an integer")))
    }

    /// Optional `YYYY-MM-DD` date field; empty counts as absent.
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>, ServiceError> {
        match self.field(name) {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    ServiceError::ValidationError(format!(
                        "Field '{name}' must be a date in YYYY-MM-DD format"
                    ))
                }),
        }
    }

    pub fn require_date(&self, name: &str) -> Result<NaiveDate, ServiceError> {
        self.date(name)?
            .ok_or_else(|| ServiceError::ValidationError(format!("Missing required field '{name}'")))
    }

    /// Uploaded file for `name`, when one with a non-empty filename and
    /// body was submitted.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

/// Drains a multipart stream into memory. Admin forms carry at most one
/// small image, so buffering is fine here.
pub async fn collect_multipart(mut multipart: Multipart) -> Result<FormData, ServiceError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Malformed multipart body: {e}")))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        let filename = field.file_name().map(|f| f.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::ValidationError(format!("Malformed multipart body: {e}")))?;

        match filename {
            Some(filename) if !filename.is_empty() => {
                if !data.is_empty() {
                    form.files.insert(
                        name,
                        UploadedFile {
                            filename,
                            data: data.to_vec(),
                        },
                    );
                }
            }
            _ => {
                let value = String::from_utf8_lossy(&data).to_string();
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with(fields: &[(&str, &str)]) -> FormData {
        let mut form = FormData::default();
        for (k, v) in fields {
            form.fields.insert((*k).to_string(), (*v).to_string());
        }
        form
    }

    #[test]
    fn require_rejects_blank_values() {
        let form = form_with(&[("name", "  ")]);
        assert!(form.require("name").is_err());
        assert!(form.require("missing").is_err());
    }

    #[test]
    fn checkbox_presence_means_checked() {
        let form = form_with(&[("customizable", "on")]);
        assert!(form.checkbox("customizable"));
        assert!(!form.checkbox("available"));
    }

    #[test]
    fn date_parsing_accepts_iso_and_blank() {
        let form = form_with(&[("start_date", "2026-03-01"), ("end_date", "")]);
        assert_eq!(
            form.date("start_date").unwrap(),
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
        );
        assert_eq!(form.date("end_date").unwrap(), None);
        assert!(form_with(&[("d", "01/03/2026")]).date("d").is_err());
    }

    #[test]
    fn decimal_parsing_trims_whitespace() {
        let form = form_with(&[("price", " 24.50 ")]);
        assert_eq!(form.decimal("price").unwrap().to_string(), "24.50");
    }
}
