use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Unsupported {field}: {value}")]
    UnknownVariant { field: &'static str, value: String },
    #[error("Malformed URL in {field}: {value}")]
    MalformedUrl { field: &'static str, value: String },
    #[error("Unsupported URL scheme in {field}: {scheme}")]
    UnsupportedScheme { field: &'static str, scheme: String },
    #[error("At least one news article is required")]
    NoArticles,
}

/// Trim a required text field, rejecting absent or blank input
pub fn require_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Trim an optional text field; blank input counts as absent
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Accept only absolute http(s) URLs, returned in normalized form
pub fn validate_http_url(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let url = Url::parse(value.trim()).map_err(|_| ValidationError::MalformedUrl {
        field,
        value: value.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ValidationError::UnsupportedScheme {
                field,
                scheme: scheme.to_string(),
            });
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MalformedUrl {
            field,
            value: value.to_string(),
        });
    }

    Ok(url.to_string())
}
