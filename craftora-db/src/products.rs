use crate::{
    enums::{ProductStatus, Role, Status},
    error::{CraftoraDbError, CraftoraDbResult as Result},
    store::{Slot, Store},
    users::Session,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const PENDING_PRODUCTS: Slot<Vec<Product>> = Slot::new("pendingProducts");
pub(crate) const PUBLISHED_PRODUCTS: Slot<Vec<Product>> = Slot::new("adminProducts");
pub(crate) const REJECTED_PRODUCTS: Slot<Vec<RejectedProduct>> = Slot::new("rejectedProducts");

/// A product submission with every required field present. Construction is
/// the validation step: an empty field aborts before anything is written.
#[derive(Debug, Clone)]
pub struct IncompleteProduct {
    name: String,
    price: Decimal,
    image_url: String,
    description: String,
}

impl IncompleteProduct {
    pub fn new(
        name: impl ToString,
        price: Decimal,
        image_url: impl ToString,
        description: impl ToString,
    ) -> Result<Self> {
        let name = name.to_string();
        let image_url = image_url.to_string();
        let description = description.to_string();
        if name.trim().is_empty() {
            return Err(CraftoraDbError::MissingField("name"));
        }
        if image_url.trim().is_empty() {
            return Err(CraftoraDbError::MissingField("imageUrl"));
        }
        if description.trim().is_empty() {
            return Err(CraftoraDbError::MissingField("description"));
        }
        Ok(Self {
            name,
            price,
            image_url,
            description,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

/// A single product, living either in the pending queue or in the published
/// catalog depending on its status.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    name: String,
    price: Decimal,
    image_url: String,
    description: String,
    artisan_id: String,
    status: ProductStatus,
}

impl Product {
    fn apply(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name
        }
        if let Some(price) = update.price {
            self.price = price
        }
        if let Some(image_url) = update.image_url {
            self.image_url = image_url
        }
        if let Some(desc) = update.description {
            self.description = desc
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_price(&self) -> Decimal {
        self.price
    }

    pub fn get_image_url(&self) -> &str {
        &self.image_url
    }

    pub fn get_description(&self) -> &str {
        &self.description
    }

    pub fn get_artisan_id(&self) -> &str {
        &self.artisan_id
    }

    pub fn get_status(&self) -> &ProductStatus {
        &self.status
    }
}

/// A rejected product kept for auditing, together with the consultant's
/// reason and the time of rejection.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectedProduct {
    #[serde(flatten)]
    product: Product,
    rejected_at: DateTime<Utc>,
    reason: String,
}

impl RejectedProduct {
    pub fn get_product(&self) -> &Product {
        &self.product
    }

    pub fn get_rejected_at(&self) -> &DateTime<Utc> {
        &self.rejected_at
    }

    pub fn get_reason(&self) -> &str {
        &self.reason
    }
}

/// A pseudo struct used to manage the product slots
pub struct Products;

impl Products {
    /// Artisan submission: lands in the pending queue with a generated id
    /// and the submitting session as owner.
    pub fn submit(store: &Store, session: &Session, incomplete: IncompleteProduct) -> Result<String> {
        if session.role != Role::Artisan {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: incomplete.name,
            price: incomplete.price,
            image_url: incomplete.image_url,
            description: incomplete.description,
            artisan_id: session.id.clone(),
            status: ProductStatus::Pending,
        };
        let id = product.id.clone();
        let mut pending = store.read(&PENDING_PRODUCTS)?;
        pending.insert(0, product);
        store.write(&PENDING_PRODUCTS, &pending)?;
        Ok(id)
    }

    /// Consultant approval: moves the entry from the pending queue to the
    /// published catalog with the status flipped, all other fields unchanged.
    pub fn approve(store: &Store, session: &Session, id: &str) -> Result<()> {
        if session.role != Role::Consultant {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut pending = store.read(&PENDING_PRODUCTS)?;
        let pos = pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(CraftoraDbError::ProductNotFound)?;
        let mut product = pending.remove(pos);
        product.status = product.status.up();

        let mut published = store.read(&PUBLISHED_PRODUCTS)?;
        published.insert(0, product);
        store.write(&PUBLISHED_PRODUCTS, &published)?;
        store.write(&PENDING_PRODUCTS, &pending)
    }

    /// Consultant rejection: the entry leaves the pending queue for the
    /// audit log; the published catalog is untouched.
    pub fn reject(store: &Store, session: &Session, id: &str, reason: impl ToString) -> Result<()> {
        if session.role != Role::Consultant {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut pending = store.read(&PENDING_PRODUCTS)?;
        let pos = pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(CraftoraDbError::ProductNotFound)?;
        let product = pending.remove(pos);

        let mut rejected = store.read(&REJECTED_PRODUCTS)?;
        rejected.insert(
            0,
            RejectedProduct {
                product,
                rejected_at: Utc::now(),
                reason: reason.to_string(),
            },
        );
        store.write(&REJECTED_PRODUCTS, &rejected)?;
        store.write(&PENDING_PRODUCTS, &pending)
    }

    /// Owner edit. The target is resolved by id plus its current status so
    /// the write lands back in the slot the product currently lives in;
    /// editing never moves a product between queues.
    pub fn update(store: &Store, session: &Session, id: &str, update: UpdateProduct) -> Result<()> {
        let (slot, mut products, pos) = Self::locate(store, id)?;
        if products[pos].artisan_id != session.id {
            return Err(CraftoraDbError::PermissionDenied);
        }
        products[pos].apply(update);
        store.write(&slot, &products)
    }

    /// Owner delete, from whichever slot currently holds the product.
    pub fn delete(store: &Store, session: &Session, id: &str) -> Result<()> {
        let (slot, mut products, pos) = Self::locate(store, id)?;
        if products[pos].artisan_id != session.id {
            return Err(CraftoraDbError::PermissionDenied);
        }
        products.remove(pos);
        store.write(&slot, &products)
    }

    fn locate(store: &Store, id: &str) -> Result<(Slot<Vec<Product>>, Vec<Product>, usize)> {
        let pending = store.read(&PENDING_PRODUCTS)?;
        if let Some(pos) = pending.iter().position(|p| p.id == id) {
            return Ok((PENDING_PRODUCTS, pending, pos));
        }
        let published = store.read(&PUBLISHED_PRODUCTS)?;
        if let Some(pos) = published.iter().position(|p| p.id == id) {
            return Ok((PUBLISHED_PRODUCTS, published, pos));
        }
        Err(CraftoraDbError::ProductNotFound)
    }

    pub fn rejected(store: &Store) -> Result<Vec<RejectedProduct>> {
        store.read(&REJECTED_PRODUCTS)
    }
}

/// A search query helper (builder) over one of the product slots. All
/// filtering is a linear scan over the loaded slot.
pub struct ProductFinder {
    products: Vec<Product>,
}

impl ProductFinder {
    /// The catalog visible to customers.
    pub fn published(store: &Store) -> Result<Self> {
        Ok(Self {
            products: store.read(&PUBLISHED_PRODUCTS)?,
        })
    }

    /// The queue awaiting consultant review.
    pub fn pending(store: &Store) -> Result<Self> {
        Ok(Self {
            products: store.read(&PENDING_PRODUCTS)?,
        })
    }

    /// Published catalog followed by the pending queue, the way the artisan
    /// and admin views combine them.
    pub fn all(store: &Store) -> Result<Self> {
        let mut products = store.read(&PUBLISHED_PRODUCTS)?;
        products.extend(store.read(&PENDING_PRODUCTS)?);
        Ok(Self { products })
    }

    pub fn id(mut self, id_provided: &str) -> Self {
        self.products.retain(|p| p.id == id_provided);
        self
    }

    pub fn artisan(mut self, artisan_id: &str) -> Self {
        self.products.retain(|p| p.artisan_id == artisan_id);
        self
    }

    /// The search-box semantics: case-insensitive name substring, or id
    /// substring.
    pub fn name_or_id_contains(mut self, term: &str) -> Self {
        let needle = term.to_lowercase();
        self.products
            .retain(|p| p.name.to_lowercase().contains(&needle) || p.id.contains(term));
        self
    }

    pub fn search(self) -> Vec<Product> {
        self.products
    }

    pub fn first(mut self) -> Result<Product> {
        if self.products.is_empty() {
            Err(CraftoraDbError::ProductNotFound)
        } else {
            Ok(self.products.remove(0))
        }
    }
}

#[cfg(test)]
mod tests;
