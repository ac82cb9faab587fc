use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// A trait that defines the status of a product / order, this can only progress
pub trait Status: Default {
    // Upgrade to the next status (no wrapping)
    fn up(&self) -> Self;
}

/// The role a session acts under. Resolved once at login and trusted by
/// every screen afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Artisan,
    Admin,
    Consultant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Artisan => write!(f, "artisan"),
            Self::Admin => write!(f, "admin"),
            Self::Consultant => write!(f, "consultant"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "artisan" => Ok(Self::Artisan),
            "admin" => Ok(Self::Admin),
            "consultant" => Ok(Self::Consultant),
            _ => Err(format!("invalid role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    // Submitted by an artisan, waiting for consultant review
    Pending,
    // Reviewed and published to the catalog
    Approved,
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Status for ProductStatus {
    fn up(&self) -> Self {
        match *self {
            Self::Pending => Self::Approved,
            Self::Approved => Self::Approved,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    // The order has been placed at checkout
    Placed,
    // The artisan is working on it
    Processing,
    // Handed over to the customer
    Delivered,
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Placed
    }
}

impl Status for OrderStatus {
    fn up(&self) -> Self {
        match *self {
            Self::Placed => Self::Processing,
            Self::Processing => Self::Delivered,
            Self::Delivered => Self::Delivered,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placed => write!(f, "placed"),
            Self::Processing => write!(f, "processing"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "placed" => Ok(Self::Placed),
            "processing" => Ok(Self::Processing),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {}", s)),
        }
    }
}
