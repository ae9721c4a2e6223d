//! User context structure for handling the acting identity of a request

use actix_web::HttpRequest;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Header and cookie carrying the numeric user id
pub const USER_ID_KEY: &str = "UserId";

/// Identity used when a request carries no user id
pub const ANONYMOUS_USER: i32 = 0;

/// User context passed explicitly to every catalog operation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserContext {
    /// Integer identity compared against a movie's OwnerId
    pub user_id: i32,
}

impl UserContext {
    pub fn new(user_id: i32) -> Self {
        Self { user_id }
    }

    /// Resolve the acting user: `UserId` header first, then the `UserId`
    /// cookie. A missing id is the anonymous user; a malformed one is rejected.
    pub fn from_request(req: &HttpRequest) -> CatalogResult<Self> {
        let raw = match req.headers().get(USER_ID_KEY) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| CatalogError::Validation("Invalid UserId header value".to_string()))?
                    .to_string(),
            ),
            None => req.cookie(USER_ID_KEY).map(|c| c.value().to_string()),
        };

        let context = match raw {
            Some(raw) => {
                let user_id = raw.trim().parse::<i32>().map_err(|_| {
                    CatalogError::Validation(format!("UserId must be an integer, got {:?}", raw))
                })?;
                Self::new(user_id)
            }
            None => {
                debug!("No UserId on request, acting as anonymous user");
                Self::default()
            }
        };

        log_mdc::insert("user", context.user_id.to_string());
        Ok(context)
    }

    /// Whether this user may change or delete a movie owned by `owner_id`
    pub fn owns(&self, owner_id: i32) -> bool {
        self.user_id == owner_id
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new(ANONYMOUS_USER)
    }
}
