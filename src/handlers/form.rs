// handlers/form.rs - Request body parsing shared by the resource handlers
//
// Create and update endpoints accept either a JSON object or a multipart
// form. Multipart file parts named "image" become uploads; a plain "image"
// value in either encoding is an asset reference returned by /upload.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::assets::ImageUpload;
use crate::error::ApiError;
use crate::services::{ImageInput, MovieInput, ProductInput};

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct ResourceForm {
    fields: HashMap<String, String>,
    image: Option<ImageInput>,
}

impl ResourceForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn owned(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn into_product(self) -> ProductInput {
        ProductInput {
            name: self.owned("name"),
            description: self.owned("description"),
            price: self.owned("price"),
            category_id: self.owned("categoryId"),
            image: self.image,
        }
    }

    pub fn into_movie(self) -> MovieInput {
        MovieInput {
            name: self.owned("name"),
            genre: self.owned("genre"),
            description: self.owned("description"),
            scheduled_at: self.owned("scheduledAt"),
            image: self.image,
        }
    }

    /// Takes the uploaded file, if any; references are not accepted here.
    pub fn into_upload(self) -> Option<ImageUpload> {
        match self.image {
            Some(ImageInput::Upload(upload)) => Some(upload),
            _ => None,
        }
    }

    fn from_json(value: Value) -> Result<Self, ApiError> {
        let Value::Object(map) = value else {
            return Err(ApiError::invalid_json("Se esperaba un objeto JSON"));
        };

        let mut form = ResourceForm::default();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::validation_error(format!("Campo no válido: {}", key)))
                }
            };
            if key == IMAGE_FIELD {
                form.image = Some(ImageInput::Reference(text));
            } else {
                form.fields.insert(key, text);
            }
        }
        Ok(form)
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = ResourceForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                if let Some(file_name) = field.file_name().map(str::to_string) {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part when no file was chosen
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.image = Some(ImageInput::Upload(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    }));
                    continue;
                }
                let reference = field.text().await.map_err(multipart_error)?;
                form.image = Some(ImageInput::Reference(reference));
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("La petición es demasiado grande")
    } else {
        ApiError::validation_error(err.body_text())
    }
}

#[async_trait]
impl<S> FromRequest<S> for ResourceForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation_error(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        let Json(value) = Json::<Value>::from_request(req, state).await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("La petición es demasiado grande")
            } else {
                ApiError::invalid_json(e.body_text())
            }
        })?;
        Self::from_json(value)
    }
}

/// Path ids that do not parse cannot name a record, so they read as missing.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
