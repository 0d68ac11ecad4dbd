use std::sync::Arc;
use std::time::Duration;

use crate::domain::model::User;
use crate::domain::repository::UserLister;
use crate::service::{with_deadline, AppError};

pub struct UserService {
    user_lister: Arc<dyn UserLister>,
    deadline: Duration,
}

impl UserService {
    pub fn new(user_lister: Arc<dyn UserLister>, deadline: Duration) -> UserService {
        UserService {
            user_lister,
            deadline,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        with_deadline(self.deadline, async {
            self.user_lister
                .get_all()
                .await
                .map_err(|err| AppError::storage(err, "user_lister.get_all"))
        })
        .await
    }
}
