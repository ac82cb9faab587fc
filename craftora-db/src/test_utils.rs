use crate::{enums::Role, store::Store, users::Session};

// A helper function to create an in-memory store in order to test. The store is discarded after the test
pub fn establish_store() -> Store {
    Store::in_memory()
}

pub fn artisan_session(id: &str) -> Session {
    Session {
        id: id.to_string(),
        username: id.to_string(),
        role: Role::Artisan,
    }
}

pub fn consultant_session() -> Session {
    Session {
        id: "consultant".to_string(),
        username: "consultant".to_string(),
        role: Role::Consultant,
    }
}

pub fn admin_session() -> Session {
    Session {
        id: "admin".to_string(),
        username: "admin".to_string(),
        role: Role::Admin,
    }
}
