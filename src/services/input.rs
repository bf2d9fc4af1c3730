//! Raw resource fields as they arrive from a form or JSON body, and their
//! conversion into validated inserts and partial updates.
//!
//! On update an empty value for a text field, or an empty or zero price, is
//! treated as "not supplied" and leaves the stored value alone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::assets::ImageUpload;
use crate::database::models::{MovieChanges, ProductChanges};
use crate::services::error::{ServiceError, ServiceResult};

/// Image accompanying a create or update call
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Fresh upload that still has to be stored
    Upload(ImageUpload),
    /// Reference to an asset already stored through `/upload`
    Reference(String),
}

#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category_id: Option<String>,
    pub image: Option<ImageInput>,
}

#[derive(Debug, Clone, Default)]
pub struct MovieInput {
    pub name: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<String>,
    pub image: Option<ImageInput>,
}

/// Validated product fields ready for insertion, minus the image
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDraft {
    pub name: String,
    pub genre: String,
    pub description: String,
    pub scheduled_at: DateTime<Utc>,
}

/// Trimmed value, or `None` when absent or blank
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(value: Option<&str>, message: &str) -> ServiceResult<String> {
    non_empty(value).ok_or_else(|| ServiceError::validation(message))
}

pub fn parse_price(raw: &str) -> ServiceResult<f64> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(ServiceError::validation("El precio debe ser un número positivo")),
    }
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DD[T| ]HH:MM[:SS]` / `YYYY-MM-DD`
/// value which is taken as UTC.
pub fn parse_schedule(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Category reference on a product: blank or `null` means uncategorized.
fn parse_category(raw: &str) -> ServiceResult<Option<Uuid>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| ServiceError::validation("Categoría no válida"))
}

impl ProductInput {
    pub fn draft(&self) -> ServiceResult<ProductDraft> {
        let name = required(self.name.as_deref(), "El nombre es obligatorio")?;
        let description = required(self.description.as_deref(), "La descripción es obligatoria")?;
        let price = required(self.price.as_deref(), "El precio es obligatorio")?;
        let category_id = match self.category_id.as_deref() {
            Some(raw) => parse_category(raw)?,
            None => None,
        };

        Ok(ProductDraft {
            name,
            description,
            price: parse_price(&price)?,
            category_id,
        })
    }

    /// Image is left out; the caller fills it in once the asset is stored.
    pub fn changes(&self) -> ServiceResult<ProductChanges> {
        let price = match non_empty(self.price.as_deref()) {
            Some(raw) => Some(parse_price(&raw)?).filter(|p| *p != 0.0),
            None => None,
        };
        let category_id = match self.category_id.as_deref() {
            Some(raw) => Some(parse_category(raw)?),
            None => None,
        };

        Ok(ProductChanges {
            name: non_empty(self.name.as_deref()),
            description: non_empty(self.description.as_deref()),
            price,
            image: None,
            category_id,
        })
    }
}

impl MovieInput {
    pub fn draft(&self) -> ServiceResult<MovieDraft> {
        let name = required(self.name.as_deref(), "El nombre es obligatorio")?;
        let genre = required(self.genre.as_deref(), "El género es obligatorio")?;
        let description = required(self.description.as_deref(), "La descripción es obligatoria")?;
        let scheduled = required(self.scheduled_at.as_deref(), "La fecha es obligatoria")?;
        let scheduled_at = parse_schedule(&scheduled)
            .ok_or_else(|| ServiceError::validation("La fecha no es válida"))?;

        Ok(MovieDraft {
            name,
            genre,
            description,
            scheduled_at,
        })
    }

    pub fn changes(&self) -> ServiceResult<MovieChanges> {
        let scheduled_at = match non_empty(self.scheduled_at.as_deref()) {
            Some(raw) => Some(
                parse_schedule(&raw).ok_or_else(|| ServiceError::validation("La fecha no es válida"))?,
            ),
            None => None,
        };

        Ok(MovieChanges {
            name: non_empty(self.name.as_deref()),
            image: None,
            genre: non_empty(self.genre.as_deref()),
            description: non_empty(self.description.as_deref()),
            scheduled_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(name: &str, description: &str, price: &str) -> ProductInput {
        ProductInput {
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            price: Some(price.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_product_draft_requires_fields() {
        assert!(product("Tea", "Green", "3.5").draft().is_ok());
        for input in [product("", "Green", "3.5"), product("Tea", " ", "3.5"), product("Tea", "Green", "")] {
            assert!(matches!(input.draft(), Err(ServiceError::Validation(_))));
        }
    }

    #[test]
    fn test_product_draft_rejects_bad_price() {
        for price in ["abc", "-1", "NaN", "inf"] {
            assert!(
                matches!(product("Tea", "Green", price).draft(), Err(ServiceError::Validation(_))),
                "price {} should be rejected",
                price
            );
        }
        assert_eq!(product("Tea", "Green", "0").draft().unwrap().price, 0.0);
    }

    #[test]
    fn test_product_draft_category() {
        let id = Uuid::new_v4();
        let mut input = product("Tea", "Green", "1");
        input.category_id = Some(id.to_string());
        assert_eq!(input.draft().unwrap().category_id, Some(id));

        input.category_id = Some(String::new());
        assert_eq!(input.draft().unwrap().category_id, None);

        input.category_id = Some("not-a-uuid".to_string());
        assert!(matches!(input.draft(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_product_changes_ignore_falsy_values() {
        let changes = product("", "", "0").changes().unwrap();
        assert!(changes.name.is_none());
        assert!(changes.description.is_none());
        assert!(changes.price.is_none());
        assert!(changes.category_id.is_none());
        assert!(changes.image.is_none());

        let changes = product(" Chai ", "", "4.25").changes().unwrap();
        assert_eq!(changes.name.as_deref(), Some("Chai"));
        assert_eq!(changes.price, Some(4.25));
    }

    #[test]
    fn test_product_changes_can_clear_category() {
        let input = ProductInput {
            category_id: Some("null".to_string()),
            ..Default::default()
        };
        assert_eq!(input.changes().unwrap().category_id, Some(None));
    }

    #[test]
    fn test_parse_schedule_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 14, 20, 30, 0).unwrap();
        assert_eq!(parse_schedule("2025-03-14T20:30:00Z"), Some(expected));
        assert_eq!(parse_schedule("2025-03-14T21:30:00+01:00"), Some(expected));
        assert_eq!(parse_schedule("2025-03-14T20:30"), Some(expected));
        assert_eq!(parse_schedule("2025-03-14 20:30:00"), Some(expected));
        assert_eq!(
            parse_schedule("2025-03-14"),
            Some(Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_schedule("next friday"), None);
    }

    #[test]
    fn test_movie_draft_requires_parseable_date() {
        let mut input = MovieInput {
            name: Some("Alien".to_string()),
            genre: Some("Sci-fi".to_string()),
            description: Some("In space".to_string()),
            scheduled_at: Some("2025-03-14T20:30".to_string()),
            image: None,
        };
        assert!(input.draft().is_ok());

        input.scheduled_at = Some("tomorrow".to_string());
        assert!(matches!(input.draft(), Err(ServiceError::Validation(_))));

        input.scheduled_at = None;
        assert!(matches!(input.draft(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_movie_changes_skip_blank_date() {
        let input = MovieInput {
            scheduled_at: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(input.changes().unwrap().scheduled_at.is_none());
    }
}
