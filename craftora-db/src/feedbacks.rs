use crate::{
    enums::Role,
    error::{CraftoraDbError, CraftoraDbResult as Result},
    products::ProductFinder,
    store::{Slot, Store},
    users::{Artisans, Session},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const FEEDBACKS: Slot<Vec<Feedback>> = Slot::new("productFeedbacks");

/// One customer comment on a product. Append-only: there is no edit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    id: String,
    product_id: String,
    author_id: String,
    author_name: String,
    text: String,
    date: DateTime<Utc>,
}

impl Feedback {
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_product_id(&self) -> &str {
        &self.product_id
    }

    pub fn get_author_id(&self) -> &str {
        &self.author_id
    }

    pub fn get_author_name(&self) -> &str {
        &self.author_name
    }

    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn get_date(&self) -> &DateTime<Utc> {
        &self.date
    }
}

/// A feedback entry joined with its product and artisan for the admin view.
/// Dangling ids resolve to placeholders instead of failing.
#[derive(Debug, Clone)]
pub struct FeedbackView {
    pub feedback: Feedback,
    pub product_name: String,
    pub product_image: String,
    pub artisan_name: String,
}

/// A pseudo struct used to manage the `productFeedbacks` slot
pub struct Feedbacks;

impl Feedbacks {
    /// Attach a comment to a product. Anyone may do this; without a session
    /// the author is recorded as a guest.
    pub fn post(
        store: &Store,
        session: Option<&Session>,
        product_id: impl ToString,
        text: &str,
    ) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CraftoraDbError::EmptyFeedback);
        }
        let (author_id, author_name) = match session {
            Some(s) => (s.id.clone(), s.username.clone()),
            None => ("guest".to_string(), "Guest".to_string()),
        };
        let entry = Feedback {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            author_id,
            author_name,
            text: text.to_string(),
            date: Utc::now(),
        };
        let id = entry.id.clone();
        let mut feedbacks = store.read(&FEEDBACKS)?;
        feedbacks.insert(0, entry);
        store.write(&FEEDBACKS, &feedbacks)?;
        Ok(id)
    }

    pub fn list(store: &Store) -> Result<Vec<Feedback>> {
        store.read(&FEEDBACKS)
    }

    pub fn for_product(store: &Store, product_id: &str) -> Result<Vec<Feedback>> {
        Ok(store
            .read(&FEEDBACKS)?
            .into_iter()
            .filter(|f| f.product_id == product_id)
            .collect())
    }

    // Admin only, and unconditional
    pub fn delete_by_id(store: &Store, session: &Session, id: &str) -> Result<()> {
        if session.role != Role::Admin {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut feedbacks = store.read(&FEEDBACKS)?;
        let before = feedbacks.len();
        feedbacks.retain(|f| f.id != id);
        if feedbacks.len() == before {
            return Err(CraftoraDbError::FeedbackNotFound);
        }
        store.write(&FEEDBACKS, &feedbacks)
    }

    /// The admin listing: every feedback with its product and artisan
    /// resolved by linear scan over the product and artisan slots.
    pub fn admin_view(store: &Store) -> Result<Vec<FeedbackView>> {
        let products = ProductFinder::all(store)?.search();
        let artisans = Artisans::list(store)?;

        let views = store
            .read(&FEEDBACKS)?
            .into_iter()
            .map(|feedback| {
                let product = products.iter().find(|p| p.get_id() == feedback.product_id);
                let (product_name, product_image, artisan_id) = match product {
                    Some(p) => (
                        p.get_name().to_string(),
                        p.get_image_url().to_string(),
                        Some(p.get_artisan_id().to_string()),
                    ),
                    None => (format!("Product {}", feedback.product_id), String::new(), None),
                };
                let artisan_name = artisan_id
                    .map(|aid| {
                        artisans
                            .iter()
                            .find(|a| a.get_id() == aid)
                            .map(|a| a.get_username().to_string())
                            .unwrap_or(aid)
                    })
                    .unwrap_or_else(|| "Unknown Artisan".to_string());
                FeedbackView {
                    feedback,
                    product_name,
                    product_image,
                    artisan_name,
                }
            })
            .collect();
        Ok(views)
    }
}
