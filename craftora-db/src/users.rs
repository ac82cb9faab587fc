use crate::{
    enums::Role,
    error::{CraftoraDbError, CraftoraDbResult as Result},
    orders::CART,
    store::{Slot, Store},
};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) const CUSTOMERS: Slot<Vec<Customer>> = Slot::new("customers");
pub(crate) const ARTISANS: Slot<Vec<Artisan>> = Slot::new("artisans");
pub(crate) const ARTISAN_REQUESTS: Slot<Vec<ArtisanRequest>> = Slot::new("artisanRequests");
pub(crate) const REJECTED_ARTISANS: Slot<Vec<RejectedArtisan>> = Slot::new("rejectedArtisans");
pub(crate) const SESSION: Slot<Option<Session>> = Slot::new("user");

/// The session record written on login and read by every screen to route.
/// There is no expiry and no token; it is purely a client trust flag.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn current(store: &Store) -> Result<Option<Session>> {
        store.read(&SESSION)
    }

    pub fn set(store: &Store, session: &Session) -> Result<()> {
        store.write(&SESSION, &Some(session.clone()))
    }

    pub fn clear(store: &Store) -> Result<()> {
        store.clear(&SESSION)
    }
}

// The four demo accounts carried over from the original deployment. They
// authenticate exactly like stored users: all three fields must match.
struct LegacyAccount {
    id: &'static str,
    username: &'static str,
    phone: &'static str,
    password: &'static str,
    role: Role,
}

static LEGACY_ACCOUNTS: Lazy<[LegacyAccount; 4]> = Lazy::new(|| {
    [
        LegacyAccount {
            id: "customer1",
            username: "Manikanta",
            phone: "9032646737",
            password: "manikanta123",
            role: Role::Customer,
        },
        LegacyAccount {
            id: "artisan",
            username: "artisan",
            phone: "123",
            password: "artisan123",
            role: Role::Artisan,
        },
        LegacyAccount {
            id: "admin",
            username: "admin",
            phone: "1234",
            password: "admin123",
            role: Role::Admin,
        },
        LegacyAccount {
            id: "consultant",
            username: "consultant",
            phone: "12345",
            password: "consultant123",
            role: Role::Consultant,
        },
    ]
});

/// A single customer, corresponding to an entry in the `customers` slot
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Customer {
    id: String,
    username: String,
    phone: String,
    // bcrypt hash, never the raw password
    password: String,
}

impl Customer {
    // Note that the passwd here is unhashed
    fn new(
        username: impl ToString,
        phone: impl ToString,
        passwd: impl AsRef<[u8]>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            phone: phone.to_string(),
            password: bcrypt::hash(passwd, bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_phone(&self) -> &str {
        &self.phone
    }

    pub fn verify_passwd(&self, passwd: impl AsRef<[u8]>) -> Result<bool> {
        Ok(bcrypt::verify(passwd, &self.password)?)
    }
}

/// A pseudo struct used to manage the `customers` slot
pub struct Customers;

impl Customers {
    pub fn list(store: &Store) -> Result<Vec<Customer>> {
        store.read(&CUSTOMERS)
    }

    /// Customer signup. Rejects a username already present in the slot,
    /// otherwise prepends the new record and returns its id.
    pub fn register(
        store: &Store,
        username: impl AsRef<str> + ToString,
        phone: impl ToString,
        passwd: impl AsRef<[u8]>,
    ) -> Result<String> {
        let mut customers = store.read(&CUSTOMERS)?;
        if customers.iter().any(|c| c.username == username.as_ref()) {
            return Err(CraftoraDbError::UserRegistered);
        }
        let customer = Customer::new(username, phone, passwd)?;
        let id = customer.id.clone();
        customers.insert(0, customer);
        store.write(&CUSTOMERS, &customers)?;
        Ok(id)
    }

    // Admin only
    pub fn delete_by_id(store: &Store, session: &Session, id: &str) -> Result<()> {
        if session.role != Role::Admin {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut customers = store.read(&CUSTOMERS)?;
        let before = customers.len();
        customers.retain(|c| c.id != id);
        if customers.len() == before {
            return Err(CraftoraDbError::UserNotFound);
        }
        store.write(&CUSTOMERS, &customers)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// An artisan signup request, held in the pending queue until a consultant
/// approves or rejects it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanRequest {
    id: String,
    username: String,
    phone: String,
    password: String,
    status: RequestStatus,
    requested_at: DateTime<Utc>,
}

impl ArtisanRequest {
    fn new(
        username: impl ToString,
        phone: impl ToString,
        passwd: impl AsRef<[u8]>,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            phone: phone.to_string(),
            password: bcrypt::hash(passwd, bcrypt::DEFAULT_COST)?,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
        })
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_phone(&self) -> &str {
        &self.phone
    }

    pub fn get_requested_at(&self) -> &DateTime<Utc> {
        &self.requested_at
    }
}

/// A rejected signup request kept for auditing.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RejectedArtisan {
    #[serde(flatten)]
    request: ArtisanRequest,
    rejected_at: DateTime<Utc>,
    reason: String,
}

impl RejectedArtisan {
    pub fn get_request(&self) -> &ArtisanRequest {
        &self.request
    }

    pub fn get_rejected_at(&self) -> &DateTime<Utc> {
        &self.rejected_at
    }

    pub fn get_reason(&self) -> &str {
        &self.reason
    }
}

/// A pseudo struct used to manage the `artisanRequests` slot
pub struct ArtisanRequests;

impl ArtisanRequests {
    pub fn list(store: &Store) -> Result<Vec<ArtisanRequest>> {
        store.read(&ARTISAN_REQUESTS)
    }

    /// Artisan signup. Does not create an artisan; it queues a request for
    /// consultant review. One pending request per username.
    pub fn submit(
        store: &Store,
        username: impl AsRef<str> + ToString,
        phone: impl ToString,
        passwd: impl AsRef<[u8]>,
    ) -> Result<String> {
        let mut requests = store.read(&ARTISAN_REQUESTS)?;
        if requests.iter().any(|r| r.username == username.as_ref()) {
            return Err(CraftoraDbError::RequestPending);
        }
        let request = ArtisanRequest::new(username, phone, passwd)?;
        let id = request.id.clone();
        requests.insert(0, request);
        store.write(&ARTISAN_REQUESTS, &requests)?;
        Ok(id)
    }

    /// Consultant approval: consumes the request and mints a new artisan
    /// account. The artisan id is freshly generated, never the request id.
    pub fn approve(store: &Store, session: &Session, id: &str) -> Result<String> {
        if session.role != Role::Consultant {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut requests = store.read(&ARTISAN_REQUESTS)?;
        let pos = requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(CraftoraDbError::RequestNotFound)?;
        let request = requests.remove(pos);

        let artisan = Artisan {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            phone: request.phone,
            password: request.password,
            approved_at: Utc::now(),
        };
        let artisan_id = artisan.id.clone();

        let mut artisans = store.read(&ARTISANS)?;
        artisans.insert(0, artisan);
        store.write(&ARTISANS, &artisans)?;
        store.write(&ARTISAN_REQUESTS, &requests)?;
        Ok(artisan_id)
    }

    /// Consultant rejection: moves the request to the audit log.
    pub fn reject(
        store: &Store,
        session: &Session,
        id: &str,
        reason: impl ToString,
    ) -> Result<()> {
        if session.role != Role::Consultant {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut requests = store.read(&ARTISAN_REQUESTS)?;
        let pos = requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(CraftoraDbError::RequestNotFound)?;
        let request = requests.remove(pos);

        let mut rejected = store.read(&REJECTED_ARTISANS)?;
        rejected.insert(
            0,
            RejectedArtisan {
                request,
                rejected_at: Utc::now(),
                reason: reason.to_string(),
            },
        );
        store.write(&REJECTED_ARTISANS, &rejected)?;
        store.write(&ARTISAN_REQUESTS, &requests)
    }

    pub fn rejected(store: &Store) -> Result<Vec<RejectedArtisan>> {
        store.read(&REJECTED_ARTISANS)
    }
}

/// An approved artisan, created only through consultant approval.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Artisan {
    id: String,
    username: String,
    phone: String,
    password: String,
    approved_at: DateTime<Utc>,
}

impl Artisan {
    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_phone(&self) -> &str {
        &self.phone
    }

    pub fn get_approved_at(&self) -> &DateTime<Utc> {
        &self.approved_at
    }

    pub fn verify_passwd(&self, passwd: impl AsRef<[u8]>) -> Result<bool> {
        Ok(bcrypt::verify(passwd, &self.password)?)
    }
}

/// A pseudo struct used to manage the `artisans` slot
pub struct Artisans;

impl Artisans {
    pub fn list(store: &Store) -> Result<Vec<Artisan>> {
        store.read(&ARTISANS)
    }

    pub fn find_by_id(store: &Store, id: &str) -> Result<Artisan> {
        store
            .read(&ARTISANS)?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or(CraftoraDbError::UserNotFound)
    }

    // Admin only
    pub fn delete_by_id(store: &Store, session: &Session, id: &str) -> Result<()> {
        if session.role != Role::Admin {
            return Err(CraftoraDbError::PermissionDenied);
        }
        let mut artisans = store.read(&ARTISANS)?;
        let before = artisans.len();
        artisans.retain(|a| a.id != id);
        if artisans.len() == before {
            return Err(CraftoraDbError::UserNotFound);
        }
        store.write(&ARTISANS, &artisans)
    }
}

/// A pseudo struct bundling authentication and session handling
pub struct Auth;

impl Auth {
    /// Resolve a submitted (username, phone, password) triple to a session.
    /// Resolution order: stored customers, then stored artisans, then the
    /// built-in demo accounts. Every path verifies the full triple; there is
    /// no username-only match for any role.
    pub fn authenticate(
        store: &Store,
        username: &str,
        phone: &str,
        passwd: &str,
    ) -> Result<Session> {
        let customers = store.read(&CUSTOMERS)?;
        for c in &customers {
            if c.username == username && c.phone == phone && c.verify_passwd(passwd)? {
                return Ok(Session {
                    id: c.id.clone(),
                    username: c.username.clone(),
                    role: Role::Customer,
                });
            }
        }

        let artisans = store.read(&ARTISANS)?;
        for a in &artisans {
            if a.username == username && a.phone == phone && a.verify_passwd(passwd)? {
                return Ok(Session {
                    id: a.id.clone(),
                    username: a.username.clone(),
                    role: Role::Artisan,
                });
            }
        }

        for acct in LEGACY_ACCOUNTS.iter() {
            if acct.username == username && acct.phone == phone && acct.password == passwd {
                return Ok(Session {
                    id: acct.id.to_string(),
                    username: acct.username.to_string(),
                    role: acct.role,
                });
            }
        }

        Err(CraftoraDbError::InvalidCredentials)
    }

    /// Authenticate and write the session record.
    pub fn login(store: &Store, username: &str, phone: &str, passwd: &str) -> Result<Session> {
        let session = Self::authenticate(store, username, phone, passwd)?;
        Session::set(store, &session)?;
        Ok(session)
    }

    /// Drops the session and abandons the cart, as the original logout did.
    pub fn logout(store: &Store) -> Result<()> {
        Session::clear(store)?;
        store.clear(&CART)
    }
}
