use bcrypt::BcryptError;
use thiserror::Error;

pub type CraftoraDbResult<T> = Result<T, CraftoraDbError>;

#[derive(Error, Debug)]
pub enum CraftoraDbError {
    #[error("errored on hashing using bcrypt: {0}")]
    HashError(#[from] BcryptError),

    #[error("failed to encode slot value: {0}")]
    EncodeError(#[from] serde_json::Error),

    #[error("storage backend failed with: {0}")]
    BackendError(#[from] std::io::Error),

    #[error("username has already been registered")]
    UserRegistered,

    #[error("a signup request with this username is already pending")]
    RequestPending,

    #[error("no user found given the information")]
    UserNotFound,

    #[error("invalid username, phone number or password")]
    InvalidCredentials,

    #[error("required field `{0}` was empty")]
    MissingField(&'static str),

    #[error("product doesn't exist")]
    ProductNotFound,

    #[error("signup request doesn't exist")]
    RequestNotFound,

    #[error("order doesn't exist")]
    OrderNotFound,

    #[error("feedback doesn't exist")]
    FeedbackNotFound,

    #[error("the cart is empty")]
    EmptyCart,

    #[error("feedback text was empty")]
    EmptyFeedback,

    #[error("the operation is not permitted for this user")]
    PermissionDenied,

    #[error("order status can only advance one step forward")]
    InvalidStatusTransition,
}
